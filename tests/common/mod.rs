//! Common test utilities

use membership_daemon::config::{InvitationConfig, RubbishConfig};
use membership_daemon::events::{ChannelPublisher, DomainEvent};
use membership_daemon::member::{MembershipLifecycleManager, Space};
use membership_daemon::rubbish::RubbishBin;
use membership_daemon::storage::JsonStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc::UnboundedReceiver;

/// Create a temporary directory for testing
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// State file inside a test directory
#[allow(dead_code)]
pub fn state_file(dir: &Path) -> PathBuf {
    dir.join("state.json")
}

/// Services wired over one file-backed store, plus a seeded space.
#[allow(dead_code)] // not every test binary uses every field
pub struct Harness {
    pub store: Arc<JsonStore>,
    pub members: MembershipLifecycleManager,
    pub rubbish: RubbishBin,
    pub space: Space,
    pub events: UnboundedReceiver<DomainEvent>,
}

#[allow(dead_code)]
impl Harness {
    /// Drain every event published so far.
    pub fn take_events(&mut self) -> Vec<DomainEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

/// Open (or create) the store at `path` and seed one space named "S1".
pub async fn harness(path: &Path) -> Harness {
    let store = Arc::new(JsonStore::open(path).await.expect("Failed to open store"));
    let space = store.create_space("S1").await.expect("Failed to create space");
    wire(store, space)
}

/// Wire services over an existing store and space.
#[allow(dead_code)]
pub fn wire(store: Arc<JsonStore>, space: Space) -> Harness {
    let (publisher, events) = ChannelPublisher::new();
    let publisher = Arc::new(publisher);
    let members = MembershipLifecycleManager::new(
        store.clone(),
        store.clone(),
        store.clone(),
        publisher.clone(),
        InvitationConfig::default(),
    );
    let rubbish = RubbishBin::new(
        store.clone(),
        store.clone(),
        store.clone(),
        publisher,
        RubbishConfig::default(),
    );
    Harness {
        store,
        members,
        rubbish,
        space,
        events,
    }
}
