//! Concrete observer implementations.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crossbeam_channel::Sender;
use tracing::{debug, info};

use crate::constants::PROGRESS_REPORT_THRESHOLD;
use crate::observer::ProgressObserver;
use crate::progress::ProgressUpdate;

/// Observer that sends updates through a channel (non-blocking).
///
/// Updates are throttled to `PROGRESS_REPORT_THRESHOLD` steps; the final
/// update is always attempted.
pub struct ChannelObserver {
    sender: Sender<ProgressUpdate>,
    last_reported: AtomicU64,
}

impl ChannelObserver {
    /// Create a new channel observer.
    #[must_use]
    pub fn new(sender: Sender<ProgressUpdate>) -> Self {
        Self {
            sender,
            last_reported: AtomicU64::new(0f64.to_bits()),
        }
    }
}

impl ProgressObserver for ChannelObserver {
    fn on_progress(&self, update: &ProgressUpdate) {
        let last = f64::from_bits(self.last_reported.load(Ordering::Relaxed));
        let fraction = update.fraction();
        if update.is_complete() || (fraction - last) >= PROGRESS_REPORT_THRESHOLD {
            // A full channel drops the update rather than stalling a worker.
            let _ = self.sender.try_send(*update);
            self.last_reported.store(fraction.to_bits(), Ordering::Relaxed);
        }
    }
}

/// Observer that logs progress updates with temporal throttling.
pub struct LoggingObserver {
    last_reported: AtomicU64,
    min_interval_ms: u64,
    last_time: AtomicU64,
}

impl LoggingObserver {
    /// Create a new logging observer with the given minimum interval.
    #[must_use]
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            last_reported: AtomicU64::new(0f64.to_bits()),
            min_interval_ms,
            last_time: AtomicU64::new(0),
        }
    }
}

impl ProgressObserver for LoggingObserver {
    #[allow(clippy::cast_possible_truncation)]
    fn on_progress(&self, update: &ProgressUpdate) {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let complete = update.is_complete();
        let last_time = self.last_time.load(Ordering::Relaxed);
        if now.saturating_sub(last_time) < self.min_interval_ms && !complete {
            return;
        }

        let last = f64::from_bits(self.last_reported.load(Ordering::Relaxed));
        let fraction = update.fraction();
        if complete || (fraction - last) >= PROGRESS_REPORT_THRESHOLD {
            if complete {
                info!(terms = update.total, "Series reduction complete");
            } else {
                debug!(
                    progress = format!("{:.1}%", fraction * 100.0),
                    done = update.done,
                    total = update.total,
                    "Progress update"
                );
            }
            self.last_reported.store(fraction.to_bits(), Ordering::Relaxed);
            self.last_time.store(now, Ordering::Relaxed);
        }
    }
}

/// Null object pattern: discards every update.
pub struct NoOpObserver;

impl NoOpObserver {
    /// Create a new no-op observer that discards all progress updates.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoOpObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for NoOpObserver {
    fn on_progress(&self, _update: &ProgressUpdate) {}
}
