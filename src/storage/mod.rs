//! JSON-file backed store implementing every collaborator trait.
//!
//! State lives in memory behind a `tokio` mutex. Each mutation is applied to a
//! copy, persisted with an atomic write, and only then swapped in, so a failed
//! write leaves both the file and memory at the previous state.

mod error;
mod members;
mod nodes;

pub use error::StoreError;

use crate::member::{Email, Membership, Space, User};
use crate::rubbish::{Node, NodeType};
use crate::utils::{atomic_write, new_id, now};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Current on-disk schema version
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

/// The state file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreState {
    pub schema_version: u32,
    #[serde(default)]
    pub spaces: Vec<Space>,
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub members: Vec<Membership>,
    #[serde(default)]
    pub nodes: Vec<Node>,
    pub updated_at: DateTime<Utc>,
}

impl Default for StoreState {
    fn default() -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            spaces: Vec::new(),
            users: Vec::new(),
            members: Vec::new(),
            nodes: Vec::new(),
            updated_at: now(),
        }
    }
}

impl StoreState {
    /// Reject files whose rows break the membership invariants.
    fn check(&self) -> Result<(), StoreError> {
        if self.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(StoreError::Corrupt(format!(
                "schema version {} is newer than supported {CURRENT_SCHEMA_VERSION}",
                self.schema_version
            )));
        }
        for member in &self.members {
            if !member.is_consistent() {
                return Err(StoreError::Corrupt(format!(
                    "member '{}' has status {} but isActive={}",
                    member.member_id,
                    member.status().as_str(),
                    member.is_active()
                )));
            }
        }
        let mut live: Vec<(&str, &str)> = self
            .members
            .iter()
            .filter(|m| !m.is_deleted())
            .map(|m| (m.space_id.as_str(), m.email.as_str()))
            .collect();
        live.sort_unstable();
        if let Some(pair) = live.windows(2).find(|w| w.first() == w.last()) {
            let (space_id, email) = pair.first().copied().unwrap_or_default();
            return Err(StoreError::Corrupt(format!(
                "more than one live membership for '{email}' in space '{space_id}'"
            )));
        }
        Ok(())
    }
}

pub struct JsonStore {
    path: Option<PathBuf>,
    state: Mutex<StoreState>,
}

impl JsonStore {
    /// A store that never touches disk.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: Mutex::new(StoreState::default()),
        }
    }

    /// Open the state file at `path`, starting empty if it doesn't exist.
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let state = if path.exists() {
            let content = fs::read_to_string(path).await?;
            let state: StoreState = serde_json::from_str(&content)?;
            state.check()?;
            info!(
                path = %path.display(),
                members = state.members.len(),
                nodes = state.nodes.len(),
                "Loaded state file"
            );
            state
        } else {
            debug!(path = %path.display(), "State file not found; starting empty");
            StoreState::default()
        };
        Ok(Self {
            path: Some(path.to_path_buf()),
            state: Mutex::new(state),
        })
    }

    /// Backing file, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Copy of the current state.
    pub async fn snapshot(&self) -> StoreState {
        self.state.lock().await.clone()
    }

    pub(crate) async fn read<T>(&self, f: impl FnOnce(&StoreState) -> T) -> T {
        let state = self.state.lock().await;
        f(&state)
    }

    /// Apply `f` to a copy of the state, persist it, then swap it in.
    pub(crate) async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut StoreState) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut state = self.state.lock().await;
        let mut next = state.clone();
        let value = f(&mut next)?;
        next.updated_at = now();
        if let Some(path) = &self.path {
            let content = serde_json::to_string_pretty(&next)?;
            atomic_write(path, &content).await?;
        }
        *state = next;
        Ok(value)
    }

    /// Create a space together with its root folder.
    pub async fn create_space(&self, name: &str) -> Result<Space, StoreError> {
        let space_id = new_id();
        let root = Node::new(&space_id, None, "Root", NodeType::Folder);
        let space = Space {
            space_id,
            name: name.to_string(),
            root_node_id: root.node_id.clone(),
        };
        let created = space.clone();
        self.mutate(move |state| {
            state.nodes.push(root);
            state.spaces.push(space);
            Ok(())
        })
        .await?;
        info!(space_id = %created.space_id, "Created space");
        Ok(created)
    }

    /// Register an account. Addresses are unique across accounts.
    pub async fn create_user(&self, email: Email, name: &str) -> Result<User, StoreError> {
        let user = User::new(email, name);
        let created = user.clone();
        self.mutate(move |state| {
            if state.users.iter().any(|u| u.email == user.email) {
                return Err(StoreError::DuplicateId(user.email.to_string()));
            }
            state.users.push(user);
            Ok(())
        })
        .await?;
        Ok(created)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[path = "storage_tests.rs"]
mod tests;
