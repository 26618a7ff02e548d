//! Rubbish-bin operations: list, recover, delete.

use super::repository::{NodeRepository, PermissionChecker};
use super::types::{
    Node, NodePermission, RecoverTarget, RubbishError, RubbishListQuery, RubbishNode,
};
use crate::config::RubbishConfig;
use crate::events::{AuditAction, AuditEvent, DomainEvent, EventPublisher};
use crate::member::{Space, SpaceDirectory};
use crate::utils::now;
use chrono::Duration;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub struct RubbishBin {
    nodes: Arc<dyn NodeRepository>,
    spaces: Arc<dyn SpaceDirectory>,
    permissions: Arc<dyn PermissionChecker>,
    events: Arc<dyn EventPublisher>,
    settings: RubbishConfig,
}

impl RubbishBin {
    #[must_use]
    pub fn new(
        nodes: Arc<dyn NodeRepository>,
        spaces: Arc<dyn SpaceDirectory>,
        permissions: Arc<dyn PermissionChecker>,
        events: Arc<dyn EventPublisher>,
        settings: RubbishConfig,
    ) -> Self {
        Self {
            nodes,
            spaces,
            permissions,
            events,
            settings,
        }
    }

    /// Page size used when a request carries none.
    #[must_use]
    pub fn default_page_size(&self) -> u32 {
        self.settings.default_page_size
    }

    /// Binned nodes the member may manage, most recently deleted first.
    ///
    /// Nodes past the retention window only show up with `is_over_limit`.
    #[instrument(skip(self, query), fields(size = query.size))]
    pub async fn list(
        &self,
        space_id: &str,
        member_id: &str,
        query: &RubbishListQuery,
    ) -> Result<Vec<RubbishNode>, RubbishError> {
        self.space(space_id).await?;

        // a window too large for the calendar means nothing is over limit
        let cutoff = Duration::try_days(i64::from(self.settings.retention_days))
            .and_then(|window| now().checked_sub_signed(window));
        let mut binned = self.nodes.list_rubbish(space_id).await?;
        binned.sort_by(|a, b| {
            b.deleted_at
                .cmp(&a.deleted_at)
                .then_with(|| a.node_id.cmp(&b.node_id))
        });

        let mut visible = Vec::new();
        for node in binned {
            let Some(deleted_at) = node.deleted_at else {
                continue;
            };
            let over_limit = cutoff.is_some_and(|cutoff| deleted_at < cutoff);
            if over_limit && !query.is_over_limit {
                continue;
            }
            if !self
                .permissions
                .check_node_permission(member_id, &node.node_id, NodePermission::ManageRubbish)
                .await?
            {
                continue;
            }
            visible.push(RubbishNode {
                node_id: node.node_id,
                name: node.name,
                node_type: node.node_type,
                deleted_at,
                deleted_by: node.deleted_by,
                over_limit,
            });
        }

        let start = match &query.last_node_id {
            Some(last) => visible
                .iter()
                .position(|n| &n.node_id == last)
                .map(|i| i.saturating_add(1))
                .ok_or_else(|| RubbishError::LocateFailed(last.clone()))?,
            None => 0,
        };
        Ok(visible.into_iter().skip(start).take(query.size).collect())
    }

    /// Put a binned node back, under `parent_id` or the space root.
    #[instrument(skip(self, target), fields(node_id = %target.node_id))]
    pub async fn recover(
        &self,
        space_id: &str,
        member_id: &str,
        user_id: &str,
        target: &RecoverTarget,
    ) -> Result<Node, RubbishError> {
        let space = self.space(space_id).await?;
        self.check_rubbish_node(space_id, member_id, &target.node_id)
            .await?;

        let parent_id = match &target.parent_id {
            Some(parent_id) => {
                let parent = self
                    .live_parent(space_id, parent_id, &target.node_id)
                    .await?;
                self.require(member_id, &parent.node_id, NodePermission::CreateNode)
                    .await?;
                parent.node_id
            }
            None => space.root_node_id,
        };

        let node = self.nodes.recover_node(&target.node_id, &parent_id).await?;
        info!(%parent_id, "Recovered rubbish node");
        self.after_change(space_id, user_id, &node.node_id, AuditAction::RecoverRubbishNode);
        Ok(node)
    }

    /// Remove a binned node for good.
    #[instrument(skip(self))]
    pub async fn delete(
        &self,
        space_id: &str,
        member_id: &str,
        user_id: &str,
        node_id: &str,
    ) -> Result<(), RubbishError> {
        self.space(space_id).await?;
        self.check_rubbish_node(space_id, member_id, node_id).await?;
        self.nodes.purge_node(node_id).await?;
        info!("Deleted rubbish node");
        self.after_change(space_id, user_id, node_id, AuditAction::DeleteRubbishNode);
        Ok(())
    }

    async fn space(&self, space_id: &str) -> Result<Space, RubbishError> {
        self.spaces
            .find_space(space_id)
            .await?
            .ok_or_else(|| RubbishError::SpaceNotFound(space_id.to_string()))
    }

    /// A recovery parent must sit in this space on a path to the root that
    /// neither passes through `node_id` nor any binned node.
    async fn live_parent(
        &self,
        space_id: &str,
        parent_id: &str,
        node_id: &str,
    ) -> Result<Node, RubbishError> {
        let not_found = || RubbishError::ParentNotFound(parent_id.to_string());
        let parent = self
            .nodes
            .find_node(parent_id)
            .await?
            .filter(|p| p.space_id == space_id)
            .ok_or_else(not_found)?;

        let mut seen = HashSet::new();
        let mut current = Some(parent.clone());
        while let Some(node) = current {
            if node.node_id == node_id || node.is_in_rubbish() || !seen.insert(node.node_id.clone())
            {
                return Err(not_found());
            }
            current = match &node.parent_id {
                Some(up) => Some(self.nodes.find_node(up).await?.ok_or_else(not_found)?),
                None => None,
            };
        }
        Ok(parent)
    }

    /// The node must be in this space's bin and manageable by the member.
    async fn check_rubbish_node(
        &self,
        space_id: &str,
        member_id: &str,
        node_id: &str,
    ) -> Result<Node, RubbishError> {
        let node = self
            .nodes
            .find_node(node_id)
            .await?
            .filter(|n| n.space_id == space_id && n.is_in_rubbish())
            .ok_or_else(|| RubbishError::NodeNotFound(node_id.to_string()))?;
        self.require(member_id, node_id, NodePermission::ManageRubbish)
            .await?;
        Ok(node)
    }

    async fn require(
        &self,
        member_id: &str,
        node_id: &str,
        permission: NodePermission,
    ) -> Result<(), RubbishError> {
        if self
            .permissions
            .check_node_permission(member_id, node_id, permission)
            .await?
        {
            Ok(())
        } else {
            Err(RubbishError::PermissionDenied {
                member_id: member_id.to_string(),
                node_id: node_id.to_string(),
            })
        }
    }

    fn after_change(&self, space_id: &str, user_id: &str, node_id: &str, action: AuditAction) {
        let events = [
            DomainEvent::SpaceCapacityInvalidated {
                space_id: space_id.to_string(),
            },
            DomainEvent::Audit(AuditEvent {
                space_id: space_id.to_string(),
                user_id: user_id.to_string(),
                action,
                node_id: node_id.to_string(),
            }),
        ];
        for event in events {
            let kind = event.kind();
            if let Err(e) = self.events.publish(event) {
                warn!(event.kind = %kind, "Event not published: {e}");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[path = "service_tests.rs"]
mod tests;
