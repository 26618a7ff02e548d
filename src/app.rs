use crate::config::DaemonConfig;
use crate::events::EventPublisher;
use crate::member::MembershipLifecycleManager;
use crate::rubbish::RubbishBin;
use crate::server::routes::RouteTable;
use crate::server::{MembershipDaemonService, ShutdownSignal};
use crate::storage::JsonStore;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

pub const FILE_DESCRIPTOR_SET: &[u8] =
    tonic::include_file_descriptor_set!("membership_descriptor");
pub const DEFAULT_ADDR: &str = "127.0.0.1:50061";

/// Membership daemon - space invitations, member lifecycle and rubbish bin
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Address to bind the server to
    #[arg(short, long, env = "MEMBERSHIP_DAEMON_ADDR", default_value = DEFAULT_ADDR)]
    pub addr: String,
    /// Comma-separated list of allowed CORS origins.
    /// Use "*" to allow all origins (not recommended for production).
    #[arg(
        long,
        env = "MEMBERSHIP_CORS_ORIGINS",
        default_value = crate::cors::DEFAULT_CORS_ORIGINS,
        value_delimiter = ','
    )]
    pub cors_origins: Vec<String>,
    /// Enable JSON log format (for production/log aggregation)
    #[arg(long, env = "MEMBERSHIP_LOG_JSON", default_value = "false")]
    pub log_json: bool,
    /// Log rotation period: daily, hourly, or never
    #[arg(long, env = "MEMBERSHIP_LOG_ROTATION", default_value = "daily")]
    pub log_rotation: String,
    /// Custom log directory (default: ~/.membership/logs)
    #[arg(long, env = "MEMBERSHIP_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
    /// State file; overrides `[storage] data_file` from config.toml
    #[arg(long, env = "MEMBERSHIP_DATA_FILE")]
    pub data_file: Option<PathBuf>,
    /// Config file (default: ~/.membership/config.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Wire the store, services and route table into the gRPC service.
#[must_use]
pub fn build_service(
    store: Arc<JsonStore>,
    events: Arc<dyn EventPublisher>,
    config: &DaemonConfig,
    routes: Arc<RouteTable>,
    shutdown_tx: Arc<watch::Sender<ShutdownSignal>>,
) -> MembershipDaemonService {
    let members = MembershipLifecycleManager::new(
        store.clone(),
        store.clone(),
        store.clone(),
        events.clone(),
        config.invitation.clone(),
    );
    let rubbish = RubbishBin::new(
        store.clone(),
        store.clone(),
        store.clone(),
        events,
        config.rubbish.clone(),
    );
    MembershipDaemonService::new(Arc::new(members), Arc::new(rubbish), routes, shutdown_tx)
        .with_data_file(store.path().map(std::path::Path::to_path_buf))
        .with_max_emails(config.invitation.max_emails_per_request)
}

pub fn report_server_error(
    addr: std::net::SocketAddr,
    log_file: &std::path::Path,
    e: &tonic::transport::Error,
) {
    let err_string = format!("{e:?}");
    if err_string.contains("AddrInUse") {
        eprintln!();
        eprintln!("Error: Failed to start server - address {addr} is already in use");
        eprintln!();
        eprintln!("Another instance of membership-daemon may already be running.");
        eprintln!("Use a different port: membership-daemon --addr 127.0.0.1:{}", addr.port().saturating_add(1));
        eprintln!();
    }
    eprintln!();
    eprintln!("Error: Failed to start server: {e}");
    eprintln!();
    eprintln!("Logs: {}", log_file.display());
    eprintln!();
}
