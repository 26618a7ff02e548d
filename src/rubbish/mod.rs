//! Rubbish bin for soft-deleted nodes.
//!
//! Listing, recovery and permanent deletion, with permission checks
//! delegated to a [`PermissionChecker`] and audit events handed to the
//! outbound [`EventPublisher`](crate::events::EventPublisher).

mod repository;
mod service;
mod types;

pub use repository::{NodeRepository, PermissionChecker};
pub use service::RubbishBin;
pub use types::{
    Node, NodePermission, NodeType, RecoverTarget, RubbishError, RubbishListQuery, RubbishNode,
};
