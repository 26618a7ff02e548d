use super::types::{Node, NodePermission};
use crate::storage::StoreError;
use async_trait::async_trait;

/// Node persistence as seen by the rubbish bin.
#[async_trait]
pub trait NodeRepository: Send + Sync {
    /// Any node by id, binned or not.
    async fn find_node(&self, node_id: &str) -> Result<Option<Node>, StoreError>;

    /// Every binned node of a space, in no particular order.
    async fn list_rubbish(&self, space_id: &str) -> Result<Vec<Node>, StoreError>;

    /// Take a node out of the bin and attach it under `parent_id`.
    async fn recover_node(&self, node_id: &str, parent_id: &str) -> Result<Node, StoreError>;

    /// Remove a node for good. Returns false if it was already gone.
    async fn purge_node(&self, node_id: &str) -> Result<bool, StoreError>;
}

/// Delegated permission check.
#[async_trait]
pub trait PermissionChecker: Send + Sync {
    async fn check_node_permission(
        &self,
        member_id: &str,
        node_id: &str,
        permission: NodePermission,
    ) -> Result<bool, StoreError>;
}
