use super::{JsonStore, StoreError, StoreState};
use crate::rubbish::{Node, NodePermission, NodeRepository, NodeType, PermissionChecker};
use crate::utils::now;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

impl JsonStore {
    /// Add a node under a live parent of the same space.
    pub async fn add_node(
        &self,
        space_id: &str,
        parent_id: &str,
        name: &str,
        node_type: NodeType,
    ) -> Result<Node, StoreError> {
        let node = Node::new(space_id, Some(parent_id), name, node_type);
        let created = node.clone();
        self.mutate(move |state| {
            let parent_ok = state.nodes.iter().any(|n| {
                n.node_id == parent_id && n.space_id == space_id && !n.is_in_rubbish()
            });
            if !parent_ok {
                return Err(StoreError::NotFound(parent_id.to_string()));
            }
            state.nodes.push(node);
            Ok(())
        })
        .await?;
        Ok(created)
    }

    /// Move a node into the rubbish bin now.
    pub async fn move_to_rubbish(&self, node_id: &str, member_id: &str) -> Result<Node, StoreError> {
        self.move_to_rubbish_at(node_id, member_id, now()).await
    }

    /// Move a node into the rubbish bin with an explicit deletion time.
    pub async fn move_to_rubbish_at(
        &self,
        node_id: &str,
        member_id: &str,
        deleted_at: DateTime<Utc>,
    ) -> Result<Node, StoreError> {
        self.mutate(|state| {
            let node = state
                .nodes
                .iter_mut()
                .find(|n| n.node_id == node_id)
                .ok_or_else(|| StoreError::NotFound(node_id.to_string()))?;
            if node.parent_id.is_none() {
                return Err(StoreError::Corrupt(format!(
                    "root node '{node_id}' cannot be deleted"
                )));
            }
            node.deleted_at = Some(deleted_at);
            node.deleted_by = Some(member_id.to_string());
            node.updated_at = now();
            Ok(node.clone())
        })
        .await
    }
}

/// `node_id` plus everything below it.
fn subtree_ids(state: &StoreState, node_id: &str) -> HashSet<String> {
    let mut ids = HashSet::from([node_id.to_string()]);
    loop {
        let before = ids.len();
        for node in &state.nodes {
            if node.parent_id.as_ref().is_some_and(|p| ids.contains(p)) {
                ids.insert(node.node_id.clone());
            }
        }
        if ids.len() == before {
            return ids;
        }
    }
}

#[async_trait]
impl NodeRepository for JsonStore {
    async fn find_node(&self, node_id: &str) -> Result<Option<Node>, StoreError> {
        Ok(self
            .read(|state| state.nodes.iter().find(|n| n.node_id == node_id).cloned())
            .await)
    }

    async fn list_rubbish(&self, space_id: &str) -> Result<Vec<Node>, StoreError> {
        Ok(self
            .read(|state| {
                state
                    .nodes
                    .iter()
                    .filter(|n| n.space_id == space_id && n.is_in_rubbish())
                    .cloned()
                    .collect()
            })
            .await)
    }

    async fn recover_node(&self, node_id: &str, parent_id: &str) -> Result<Node, StoreError> {
        self.mutate(|state| {
            let node = state
                .nodes
                .iter_mut()
                .find(|n| n.node_id == node_id)
                .ok_or_else(|| StoreError::NotFound(node_id.to_string()))?;
            node.deleted_at = None;
            node.deleted_by = None;
            node.parent_id = Some(parent_id.to_string());
            node.updated_at = now();
            Ok(node.clone())
        })
        .await
    }

    async fn purge_node(&self, node_id: &str) -> Result<bool, StoreError> {
        self.mutate(|state| {
            if !state.nodes.iter().any(|n| n.node_id == node_id) {
                return Ok(false);
            }
            let doomed = subtree_ids(state, node_id);
            state.nodes.retain(|n| !doomed.contains(&n.node_id));
            Ok(true)
        })
        .await
    }
}

/// Granted iff the member is live, confirmed, and in the node's space.
#[async_trait]
impl PermissionChecker for JsonStore {
    async fn check_node_permission(
        &self,
        member_id: &str,
        node_id: &str,
        _permission: NodePermission,
    ) -> Result<bool, StoreError> {
        Ok(self
            .read(|state| {
                let Some(node) = state.nodes.iter().find(|n| n.node_id == node_id) else {
                    return false;
                };
                state.members.iter().any(|m| {
                    m.member_id == member_id
                        && m.space_id == node.space_id
                        && m.is_active()
                        && !m.is_deleted()
                })
            })
            .await)
    }
}
