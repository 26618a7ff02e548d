//! Outbound domain events.
//!
//! Services hand events to an [`EventPublisher`]; what consumes them (audit
//! log shipping, mail delivery, cache invalidation) lives outside this crate.

mod channel;

pub use channel::{spawn_log_consumer, ChannelPublisher};

use serde::Serialize;
use thiserror::Error;

/// Audited space actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    RecoverRubbishNode,
    DeleteRubbishNode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub space_id: String,
    pub user_id: String,
    pub action: AuditAction,
    pub node_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    /// An invitation notice should go out to `email`.
    InvitationSent {
        space_id: String,
        inviter_user_id: String,
        email: String,
        member_id: String,
    },
    /// Cached space capacity figures are stale.
    SpaceCapacityInvalidated { space_id: String },
    Audit(AuditEvent),
}

impl DomainEvent {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvitationSent { .. } => "invitation_sent",
            Self::SpaceCapacityInvalidated { .. } => "space_capacity_invalidated",
            Self::Audit(_) => "audit",
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EventError {
    #[error("Event channel is closed")]
    ChannelClosed,
}

/// Fire-and-forget event emission.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: DomainEvent) -> Result<(), EventError>;
}

#[cfg(test)]
#[path = "../events_tests.rs"]
mod events_tests;
