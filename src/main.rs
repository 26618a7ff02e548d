#![allow(unknown_lints, renamed_and_removed_lints)]

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use membership_daemon::app::{build_service, report_server_error, Args, FILE_DESCRIPTOR_SET};
use membership_daemon::config::{load_config, load_config_from};
use membership_daemon::cors::{build_cors_layer, normalize_origins};
use membership_daemon::events::{spawn_log_consumer, ChannelPublisher};
use membership_daemon::grpc_logging::GrpcLoggingLayer;
use membership_daemon::logging::{
    self, default_log_dir, init_logging, parse_rotation, LogConfig, LOG_FILENAME,
};
use membership_daemon::server::proto::membership_service_server::MembershipServiceServer;
use membership_daemon::server::routes::RouteTable;
use membership_daemon::server::ShutdownSignal;
use membership_daemon::storage::JsonStore;
use std::sync::Arc;
use tokio::sync::watch;
use tonic::transport::Server;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    // Parse CLI arguments first (before logging, so we can use log config)
    let args = Args::parse();

    let log_dir = args.log_dir.clone().unwrap_or_else(default_log_dir);
    let log_file = log_dir.join(LOG_FILENAME);
    logging::set_log_file_path(log_file.to_string_lossy().to_string());

    let log_config = LogConfig {
        log_dir,
        json_format: args.log_json,
        rotation: parse_rotation(&args.log_rotation),
        ..Default::default()
    };
    if let Err(e) = init_logging(log_config) {
        eprintln!();
        eprintln!("Error: Failed to initialize logging: {e}");
        eprintln!("Logs: {}", log_file.display());
        eprintln!();
        return Err(e);
    }

    let config = match &args.config {
        Some(path) => load_config_from(path)
            .wrap_err_with(|| format!("Failed to load config from {}", path.display()))?,
        None => load_config().unwrap_or_else(|e| {
            warn!("Failed to load config, using defaults: {e}");
            Default::default()
        }),
    };

    let data_file = args.data_file.clone().unwrap_or_else(|| config.data_file());
    let store = Arc::new(
        JsonStore::open(&data_file)
            .await
            .wrap_err_with(|| format!("Failed to open state file {}", data_file.display()))?,
    );

    let (publisher, events_rx) = ChannelPublisher::new();
    let consumer = spawn_log_consumer(events_rx);

    let addr = args.addr.parse()?;

    let cors_origins = normalize_origins(&args.cors_origins);
    info!("CORS origins: {}", cors_origins.join(", "));
    let cors = build_cors_layer(cors_origins);

    let (shutdown_tx, mut shutdown_rx) = watch::channel(ShutdownSignal::None);
    let shutdown_tx = Arc::new(shutdown_tx);

    let routes = Arc::new(RouteTable::membership());
    let service = build_service(
        store,
        Arc::new(publisher),
        &config,
        routes.clone(),
        shutdown_tx.clone(),
    );

    let reflection_service = tonic_reflection::server::Builder::configure()
        .register_encoded_file_descriptor_set(FILE_DESCRIPTOR_SET)
        .build_v1()?;

    info!(
        data_file = %data_file.display(),
        routes = routes.len(),
        "Starting membership daemon on {} (gRPC + gRPC-Web)",
        addr
    );

    let server_result = Server::builder()
        .accept_http1(true) // Required for gRPC-Web
        .layer(cors)
        .layer(GrpcLoggingLayer::new(routes))
        .layer(tonic_web::GrpcWebLayer::new())
        .add_service(reflection_service)
        .add_service(MembershipServiceServer::new(service))
        .serve_with_shutdown(addr, async move {
            loop {
                if shutdown_rx.changed().await.is_err() {
                    break;
                }
                if *shutdown_rx.borrow() == ShutdownSignal::Shutdown {
                    info!("Received shutdown signal, stopping server...");
                    break;
                }
            }
        })
        .await;

    if let Err(e) = server_result {
        report_server_error(addr, &log_file, &e);
        return Err(e.into());
    }

    // The service (and its publishers) is gone; the consumer drains and exits
    match consumer.await {
        Ok(count) => info!(events = count, "Event consumer finished"),
        Err(e) => warn!("Event consumer task failed: {e}"),
    }

    info!("Membership daemon stopped");
    Ok(())
}
