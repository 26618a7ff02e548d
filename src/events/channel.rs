use super::{DomainEvent, EventError, EventPublisher};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Publishes onto an unbounded `tokio` channel.
#[derive(Clone)]
pub struct ChannelPublisher {
    tx: UnboundedSender<DomainEvent>,
}

impl ChannelPublisher {
    /// Create a publisher and the receiving end for the consumer.
    #[must_use]
    pub fn new() -> (Self, UnboundedReceiver<DomainEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl EventPublisher for ChannelPublisher {
    fn publish(&self, event: DomainEvent) -> Result<(), EventError> {
        self.tx.send(event).map_err(|_| EventError::ChannelClosed)
    }
}

/// Drain the channel into the log until every publisher is dropped.
///
/// Resolves to the number of events consumed.
pub fn spawn_log_consumer(mut rx: UnboundedReceiver<DomainEvent>) -> JoinHandle<usize> {
    tokio::spawn(async move {
        let mut consumed: usize = 0;
        while let Some(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(payload) => info!(event.kind = %event.kind(), %payload, "Domain event"),
                Err(e) => warn!(event.kind = %event.kind(), "Failed to serialize event: {e}"),
            }
            consumed = consumed.saturating_add(1);
        }
        consumed
    })
}
