use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Operations slower than this are logged at warn level.
pub const SLOW_OPERATION: Duration = Duration::from_millis(500);

/// Logs how long an operation took when dropped: debug normally, warn once
/// it passes [`SLOW_OPERATION`].
///
/// ```ignore
/// async fn invite_members(&self, request: Request<InviteMembersRequest>) -> ... {
///     let _timer = OperationTimer::new("invite_members");
///     // ...
/// }
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
}

impl OperationTimer {
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    /// Time since the timer was started.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let elapsed = self.elapsed();
        if elapsed >= SLOW_OPERATION {
            warn!(
                operation = %self.name,
                duration_ms = %elapsed.as_millis(),
                "Slow operation"
            );
        } else {
            debug!(
                operation = %self.name,
                duration_ms = %elapsed.as_millis(),
                "Operation completed"
            );
        }
    }
}

/// Generate a short request ID for log correlation.
#[must_use]
pub fn generate_request_id() -> String {
    let uuid_str = uuid::Uuid::new_v4().simple().to_string();
    uuid_str.get(..8).unwrap_or(&uuid_str).to_string()
}

#[cfg(test)]
#[path = "metrics_tests.rs"]
mod metrics_tests;
