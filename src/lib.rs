pub mod app;
pub mod config;
pub mod cors;
pub mod dto;
pub mod events;
pub mod grpc_logging;
pub mod logging;
pub mod member;
pub mod metrics;
pub mod rubbish;
pub mod server;
pub mod storage;
pub mod utils;

// Re-export commonly used types
pub use config::{DaemonConfig, InvitationConfig, RubbishConfig};
pub use events::{ChannelPublisher, DomainEvent, EventPublisher};
pub use member::{
    Email, InvitationOutcome, InvitationReport, MemberError, MemberStatus, Membership,
    MembershipLifecycleManager,
};
pub use rubbish::{Node, NodeType, RubbishBin, RubbishError};
pub use server::MembershipDaemonService;
pub use storage::{JsonStore, StoreError};
