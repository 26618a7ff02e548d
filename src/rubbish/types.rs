//! Node and rubbish-bin types.

use crate::storage::StoreError;
use crate::utils::{new_id, now};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Folder,
    Datasheet,
    Form,
    Dashboard,
    Mirror,
}

impl NodeType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::Datasheet => "datasheet",
            Self::Form => "form",
            Self::Dashboard => "dashboard",
            Self::Mirror => "mirror",
        }
    }
}

/// A document or folder in a space's tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub node_id: String,
    pub space_id: String,
    /// `None` only for the space root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub name: String,
    pub node_type: NodeType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set while the node sits in the rubbish bin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
    /// Member who moved the node to the bin
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_by: Option<String>,
}

impl Node {
    #[must_use]
    pub fn new(space_id: &str, parent_id: Option<&str>, name: &str, node_type: NodeType) -> Self {
        let ts = now();
        Self {
            node_id: new_id(),
            space_id: space_id.to_string(),
            parent_id: parent_id.map(ToString::to_string),
            name: name.to_string(),
            node_type,
            created_at: ts,
            updated_at: ts,
            deleted_at: None,
            deleted_by: None,
        }
    }

    #[must_use]
    pub fn is_in_rubbish(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// A rubbish-bin listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RubbishNode {
    pub node_id: String,
    pub name: String,
    pub node_type: NodeType,
    pub deleted_at: DateTime<Utc>,
    pub deleted_by: Option<String>,
    /// Deleted longer ago than the retention window
    pub over_limit: bool,
}

/// Permissions checked against a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodePermission {
    /// See, recover, or purge the node while it is in the bin
    ManageRubbish,
    /// Create children under the node
    CreateNode,
}

/// A validated rubbish listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RubbishListQuery {
    pub size: usize,
    pub is_over_limit: bool,
    /// Cursor: the page starts after this node
    pub last_node_id: Option<String>,
}

/// A validated recovery request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoverTarget {
    pub node_id: String,
    /// Where to put the node back; the space root when `None`
    pub parent_id: Option<String>,
}

/// Rubbish-bin errors
#[derive(Error, Debug)]
pub enum RubbishError {
    #[error("Space '{0}' not found")]
    SpaceNotFound(String),

    #[error("Node '{0}' is not in the rubbish bin")]
    NodeNotFound(String),

    #[error("Parent node '{0}' not found")]
    ParentNotFound(String),

    #[error("Member '{member_id}' may not perform this operation on node '{node_id}'")]
    PermissionDenied { member_id: String, node_id: String },

    /// The listing cursor no longer points into the bin.
    #[error("Node '{0}' is no longer in the rubbish bin; reload from the first page")]
    LocateFailed(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),
}
