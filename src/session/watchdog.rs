use std::time::{Duration, Instant};

/// Tracks the last peer activity and decides when a silent link counts as lost.
///
/// A watchdog that has never seen activity never expires, so a session that
/// never connected is not downgraded.
#[derive(Debug, Clone)]
pub struct LivenessWatchdog {
    timeout: Duration,
    last_activity: Option<Instant>,
}

impl LivenessWatchdog {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            last_activity: None,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn record_activity(&mut self, now: Instant) {
        self.last_activity = Some(now);
    }

    /// Forget all activity ("never seen").
    pub fn reset(&mut self) {
        self.last_activity = None;
    }

    pub fn last_activity(&self) -> Option<Instant> {
        self.last_activity
    }

    /// True once strictly more than `timeout` has passed since the last activity.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.last_activity
            .is_some_and(|last| now.saturating_duration_since(last) > self.timeout)
    }
}
