//! gRPC surface of the daemon.

mod convert;
pub mod error_mapping;
mod handlers;
pub mod routes;
pub mod structured_error;
mod trait_impl;

use crate::member::MembershipLifecycleManager;
use crate::rubbish::RubbishBin;
use routes::RouteTable;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

// Import generated protobuf types
pub mod proto {
    #![allow(clippy::pedantic)]
    #![allow(clippy::all)]
    tonic::include_proto!("membership.v1");
}

/// Signal type for daemon shutdown
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShutdownSignal {
    None,
    Shutdown,
}

pub struct MembershipDaemonService {
    members: Arc<MembershipLifecycleManager>,
    rubbish: Arc<RubbishBin>,
    routes: Arc<RouteTable>,
    shutdown_tx: Arc<watch::Sender<ShutdownSignal>>,
    data_file: Option<PathBuf>,
    max_emails: usize,
}

impl MembershipDaemonService {
    #[must_use]
    pub fn new(
        members: Arc<MembershipLifecycleManager>,
        rubbish: Arc<RubbishBin>,
        routes: Arc<RouteTable>,
        shutdown_tx: Arc<watch::Sender<ShutdownSignal>>,
    ) -> Self {
        Self {
            members,
            rubbish,
            routes,
            shutdown_tx,
            data_file: None,
            max_emails: crate::config::InvitationConfig::default().max_emails_per_request,
        }
    }

    /// Report `path` as the backing state file in daemon info.
    #[must_use]
    pub fn with_data_file(mut self, path: Option<PathBuf>) -> Self {
        self.data_file = path;
        self
    }

    /// Reject invitation requests with more addresses than this.
    #[must_use]
    pub fn with_max_emails(mut self, max_emails: usize) -> Self {
        self.max_emails = max_emails;
        self
    }
}
