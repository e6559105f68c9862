//! Quiet-period debouncing for mutation bursts.

use std::time::Duration;

use tokio::time::Instant;

/// How long a burst must stay silent before the rescan fires.
pub(super) const DEBOUNCE_MS: u64 = 200;

/// Trailing-edge debouncer: idle, or pending until a deadline, with
/// cancel-and-reschedule on every event. No leading edge and no
/// maximum-wait fallback; continuous activity defers the callback
/// indefinitely.
///
/// Pure timing state. No knowledge of documents or transformers.
pub(super) struct Debouncer {
    deadline: Option<Instant>,
}

impl Debouncer {
    pub(super) fn new() -> Self {
        Self { deadline: None }
    }

    /// An event arrived: drop any pending deadline and re-arm.
    pub(super) fn record(&mut self) {
        self.deadline = Some(Instant::now() + Duration::from_millis(DEBOUNCE_MS));
    }

    /// Consume the pending state if the quiet period has elapsed.
    /// Returns whether the debounced callback should run now.
    pub(super) fn take_if_ready(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub(super) fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Precise sleep until the deadline, or effectively forever when
    /// idle.
    pub(super) fn sleep_duration(&self) -> Duration {
        match self.deadline {
            Some(deadline) => deadline
                .saturating_duration_since(Instant::now())
                .max(Duration::from_millis(1)),
            None => Duration::from_secs(86400),
        }
    }
}
