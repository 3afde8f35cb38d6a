//! Observer trait for progress tracking.

use crate::progress::ProgressUpdate;

/// Receives progress updates from a [`ProgressSink`](crate::progress::ProgressSink).
///
/// Called from worker threads while the sink serializes delivery, so
/// implementations should return quickly. Reading the sink's `done` or
/// `total` from inside `on_progress` is fine; calling `tick` deadlocks.
pub trait ProgressObserver: Send + Sync {
    /// Receive a progress update.
    fn on_progress(&self, update: &ProgressUpdate);
}

impl<F> ProgressObserver for F
where
    F: Fn(&ProgressUpdate) + Send + Sync,
{
    fn on_progress(&self, update: &ProgressUpdate) {
        self(update);
    }
}
