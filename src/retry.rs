//! Busy-Retry Policy
//!
//! Re-runs an operation that failed with lock contention.
//!
//! ## Rules
//! - `AtlasError::Busy`: sleep a fixed delay, run the whole operation again
//! - anything else (success included): returned unchanged
//! - no attempt limit, no backoff growth, no jitter
//!
//! The wrapped operation must be safe to re-execute from scratch. Every
//! caller in this crate passes a closure that runs one self-contained
//! transaction, which has already rolled back by the time it returns `Busy`.

use std::thread;
use std::time::Duration;

use crate::config::DEFAULT_BUSY_RETRY_DELAY;
use crate::error::Result;

/// Attempts between escalated (warn-level) log lines
const WARN_EVERY: u64 = 20;

/// Fixed-delay, unbounded retry on lock contention
#[derive(Debug, Clone, Copy)]
pub struct BusyRetry {
    delay: Duration,
}

impl BusyRetry {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `op` until it returns anything other than `AtlasError::Busy`
    pub fn run<T, F>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut attempt: u64 = 0;
        loop {
            match op() {
                Err(e) if e.is_busy() => {
                    attempt += 1;
                    if attempt % WARN_EVERY == 0 {
                        tracing::warn!(
                            "Write still blocked after {} attempts: {}",
                            attempt,
                            e
                        );
                    } else {
                        tracing::debug!(
                            "Database busy (attempt {}), retrying in {:?}",
                            attempt,
                            self.delay
                        );
                    }
                    thread::sleep(self.delay);
                }
                other => return other,
            }
        }
    }
}

impl Default for BusyRetry {
    fn default() -> Self {
        Self::new(DEFAULT_BUSY_RETRY_DELAY)
    }
}
