use std::path::Path;
use std::sync::Arc;

use crate::server::proto::{DaemonInfo, ShutdownResponse};
use crate::server::routes::RouteTable;
use crate::server::ShutdownSignal;
use crate::utils::DAEMON_VERSION;
use tokio::sync::watch;
use tonic::{Response, Status};
use tracing::info;

#[allow(
    renamed_and_removed_lints,
    unknown_lints,
    unused_async,
    clippy::unused_async
)]
pub async fn get_daemon_info(
    routes: &RouteTable,
    data_file: Option<&Path>,
) -> Result<Response<DaemonInfo>, Status> {
    Ok(Response::new(DaemonInfo {
        version: DAEMON_VERSION.to_string(),
        data_file: data_file
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
        routes: routes.service_paths(),
    }))
}

#[allow(
    renamed_and_removed_lints,
    unknown_lints,
    unused_async,
    clippy::unused_async
)]
pub async fn shutdown(
    shutdown_tx: &Arc<watch::Sender<ShutdownSignal>>,
) -> Result<Response<ShutdownResponse>, Status> {
    info!("Shutdown requested");

    // Let the RPC response go out before the server stops
    let shutdown_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        let _ = shutdown_tx.send(ShutdownSignal::Shutdown);
    });

    Ok(Response::new(ShutdownResponse {
        success: true,
        message: "Daemon shutting down".to_string(),
    }))
}
