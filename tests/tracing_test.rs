#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Kept in its own binary: it installs a thread-local subscriber, and a
//! single test per process keeps callsite interest stable.

mod common;

use common::{create_test_dir, state_file};
use membership_daemon::app::build_service;
use membership_daemon::config::DaemonConfig;
use membership_daemon::events::ChannelPublisher;
use membership_daemon::server::proto::membership_service_server::MembershipService;
use membership_daemon::server::proto::{GetDaemonInfoRequest, GetMemberRequest};
use membership_daemon::server::routes::RouteTable;
use membership_daemon::server::ShutdownSignal;
use membership_daemon::storage::JsonStore;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tonic::Request;

/// Shared buffer that a fmt subscriber writes into.
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl CapturedLogs {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

#[tokio::test]
async fn test_read_rpcs_are_traced_and_timed() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let dir = create_test_dir();
    let store = Arc::new(JsonStore::open(&state_file(dir.path())).await.unwrap());
    let (publisher, _events) = ChannelPublisher::new();
    let (shutdown_tx, _shutdown_rx) = watch::channel(ShutdownSignal::None);
    let service = build_service(
        store,
        Arc::new(publisher),
        &DaemonConfig::default(),
        Arc::new(RouteTable::membership()),
        Arc::new(shutdown_tx),
    );

    service
        .get_member(Request::new(GetMemberRequest {
            member_id: "nobody".into(),
        }))
        .await
        .unwrap();
    service
        .get_daemon_info(Request::new(GetDaemonInfoRequest {}))
        .await
        .unwrap();

    let text = logs.text();
    for operation in ["get_member", "get_daemon_info"] {
        assert!(
            text.contains(&format!("grpc.{operation}{{request_id=")),
            "no request span for {operation}:\n{text}"
        );
        assert!(
            text.contains(&format!("operation={operation}")),
            "no timing for {operation}:\n{text}"
        );
    }
}
