//! # Requeue backoff
//!
//! Failed reconciles are retried on a Fibonacci schedule counted in minutes:
//! 1m, 1m, 2m, 3m, 5m, 8m, then 10m for as long as the failure persists.
//! Each `Variable` keeps its own position in the sequence, keyed by
//! `namespace/name`, and goes back to the start after a successful reconcile.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::warn;

/// Requeue interval after a successful reconcile (drift detection)
pub const RESYNC_INTERVAL: Duration = Duration::from_secs(10 * 60);

const MIN_BACKOFF_MINUTES: u64 = 1;
const MAX_BACKOFF_MINUTES: u64 = 10;

/// Fibonacci backoff calculator, in minutes
#[derive(Debug, Clone)]
pub struct FibonacciBackoff {
    min_minutes: u64,
    prev_minutes: u64,
    current_minutes: u64,
    max_minutes: u64,
}

impl FibonacciBackoff {
    #[must_use]
    pub fn new(min_minutes: u64, max_minutes: u64) -> Self {
        Self {
            min_minutes,
            prev_minutes: 0,
            current_minutes: min_minutes,
            max_minutes,
        }
    }

    /// Current step, then advance the sequence (capped at `max_minutes`)
    pub fn next_backoff(&mut self) -> Duration {
        let step = Duration::from_secs(self.current_minutes * 60);

        let next_minutes = self.prev_minutes + self.current_minutes;
        self.prev_minutes = self.current_minutes;
        self.current_minutes = next_minutes.min(self.max_minutes);

        step
    }

    pub fn reset(&mut self) {
        self.prev_minutes = 0;
        self.current_minutes = self.min_minutes;
    }
}

impl Default for FibonacciBackoff {
    fn default() -> Self {
        Self::new(MIN_BACKOFF_MINUTES, MAX_BACKOFF_MINUTES)
    }
}

#[derive(Debug, Default)]
struct BackoffState {
    backoff: FibonacciBackoff,
    error_count: u32,
}

/// Per-resource backoff bookkeeping shared by all reconciles
#[derive(Debug, Default)]
pub struct BackoffTracker {
    states: Mutex<HashMap<String, BackoffState>>,
}

impl BackoffTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a failure for `resource_key` and return how long to wait before
    /// retrying, along with the number of consecutive failures so far.
    pub fn record_failure(&self, resource_key: &str) -> (Duration, u32) {
        match self.states.lock() {
            Ok(mut states) => {
                let state = states.entry(resource_key.to_string()).or_default();
                state.error_count += 1;
                (state.backoff.next_backoff(), state.error_count)
            }
            Err(e) => {
                warn!("Failed to lock backoff states: {}, using default backoff", e);
                (Duration::from_secs(MIN_BACKOFF_MINUTES * 60), 0)
            }
        }
    }

    /// Forget the failure history of `resource_key`
    pub fn reset(&self, resource_key: &str) {
        if let Ok(mut states) = self.states.lock() {
            states.remove(resource_key);
        }
    }

    #[cfg(test)]
    pub fn error_count(&self, resource_key: &str) -> u32 {
        self.states
            .lock()
            .map(|states| states.get(resource_key).map_or(0, |s| s.error_count))
            .unwrap_or(0)
    }
}
