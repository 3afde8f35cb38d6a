//! Progress tracking types.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::warn;

use crate::observer::ProgressObserver;

/// Progress update delivered to observers after every leaf evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressUpdate {
    /// Leaves evaluated so far.
    pub done: u64,
    /// Leaves in the whole reduction.
    pub total: u64,
}

impl ProgressUpdate {
    /// Create a new progress update.
    #[must_use]
    pub fn new(done: u64, total: u64) -> Self {
        Self { done, total }
    }

    /// Completed fraction in `[0.0, 1.0]`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.done as f64 / self.total as f64).min(1.0)
    }

    /// Whether every leaf has been evaluated.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.done >= self.total
    }
}

/// Shared leaf counter with a notification hook.
///
/// Safe to tick from several worker threads at once. Increments and
/// notifications are serialized, so observers see `done` strictly increasing.
/// [`done`](Self::done) and [`total`](Self::total) never block, so an observer
/// may read them; it must not call [`tick`](Self::tick) itself.
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use picalc_core::observers::NoOpObserver;
/// use picalc_core::progress::ProgressSink;
///
/// let sink = ProgressSink::new(Arc::new(NoOpObserver::new()));
/// sink.set_total(2);
/// sink.tick();
/// assert_eq!(sink.done(), 1);
/// ```
pub struct ProgressSink {
    total: AtomicU64,
    done: AtomicU64,
    delivery: Mutex<()>,
    observer: Arc<dyn ProgressObserver>,
}

impl ProgressSink {
    /// Create a sink reporting to `observer`.
    #[must_use]
    pub fn new(observer: Arc<dyn ProgressObserver>) -> Self {
        Self {
            total: AtomicU64::new(0),
            done: AtomicU64::new(0),
            delivery: Mutex::new(()),
            observer,
        }
    }

    /// Set the number of leaves of the upcoming reduction and restart the count.
    pub fn set_total(&self, total: u64) {
        let _delivery = self.delivery.lock();
        self.done.store(0, Ordering::Release);
        self.total.store(total, Ordering::Release);
    }

    /// Number of leaves of the current reduction.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total.load(Ordering::Acquire)
    }

    /// Leaves evaluated so far.
    #[must_use]
    pub fn done(&self) -> u64 {
        self.done.load(Ordering::Acquire)
    }

    /// Start counting from `done` leaves, as when resuming a partial reduction.
    pub fn resume_from(&self, done: u64) {
        let _delivery = self.delivery.lock();
        self.done.store(done, Ordering::Release);
    }

    /// Record one evaluated leaf and notify the observer.
    ///
    /// A panicking observer is logged and otherwise ignored.
    pub fn tick(&self) {
        let _delivery = self.delivery.lock();
        let done = self.done.fetch_add(1, Ordering::AcqRel) + 1;
        let update = ProgressUpdate::new(done, self.total());
        let observer = &self.observer;
        if catch_unwind(AssertUnwindSafe(|| observer.on_progress(&update))).is_err() {
            warn!(
                done = update.done,
                total = update.total,
                "progress observer panicked, update discarded"
            );
        }
    }
}

impl std::fmt::Debug for ProgressSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressSink")
            .field("total", &self.total())
            .field("done", &self.done())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{OnceLock, Weak};
    use std::thread;

    #[test]
    fn progress_update_fraction() {
        let update = ProgressUpdate::new(25, 100);
        assert!((update.fraction() - 0.25).abs() < f64::EPSILON);
        assert!(!update.is_complete());
        assert!(ProgressUpdate::new(100, 100).is_complete());
    }

    #[test]
    fn empty_total_counts_as_complete() {
        let update = ProgressUpdate::new(0, 0);
        assert!((update.fraction() - 1.0).abs() < f64::EPSILON);
        assert!(update.is_complete());
    }

    #[test]
    fn tick_notifies_with_done_and_total() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let sink = ProgressSink::new(Arc::new(move |update: &ProgressUpdate| {
            sink_seen.lock().push(*update);
        }));
        sink.set_total(3);
        for _ in 0..3 {
            sink.tick();
        }
        assert_eq!(
            *seen.lock(),
            vec![
                ProgressUpdate::new(1, 3),
                ProgressUpdate::new(2, 3),
                ProgressUpdate::new(3, 3)
            ]
        );
    }

    #[test]
    fn concurrent_ticks_stay_strictly_increasing() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let sink = Arc::new(ProgressSink::new(Arc::new(
            move |update: &ProgressUpdate| sink_seen.lock().push(update.done),
        )));
        sink.set_total(400);

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sink = Arc::clone(&sink);
                thread::spawn(move || {
                    for _ in 0..100 {
                        sink.tick();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let seen = seen.lock();
        assert_eq!(seen.len(), 400);
        assert!(seen.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(sink.done(), 400);
    }

    #[test]
    fn panicking_observer_does_not_stop_counting() {
        let sink = ProgressSink::new(Arc::new(|_: &ProgressUpdate| panic!("observer failure")));
        sink.set_total(2);
        sink.tick();
        sink.tick();
        assert_eq!(sink.done(), 2);
    }

    #[test]
    fn resume_from_offsets_counter() {
        let sink = ProgressSink::new(Arc::new(|_: &ProgressUpdate| {}));
        sink.set_total(10);
        sink.resume_from(7);
        sink.tick();
        assert_eq!(sink.done(), 8);
    }

    #[test]
    fn set_total_restarts_the_count() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let sink = ProgressSink::new(Arc::new(move |update: &ProgressUpdate| {
            sink_seen.lock().push(*update);
        }));
        sink.set_total(2);
        sink.tick();
        sink.tick();
        sink.set_total(2);
        assert_eq!(sink.done(), 0);
        sink.tick();
        assert_eq!(seen.lock().last(), Some(&ProgressUpdate::new(1, 2)));
    }

    #[test]
    fn observer_can_read_the_sink() {
        let slot: Arc<OnceLock<Weak<ProgressSink>>> = Arc::new(OnceLock::new());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (observer_slot, observer_seen) = (Arc::clone(&slot), Arc::clone(&seen));
        let sink = Arc::new(ProgressSink::new(Arc::new(move |update: &ProgressUpdate| {
            if let Some(sink) = observer_slot.get().and_then(Weak::upgrade) {
                observer_seen.lock().push((update.done, sink.done(), sink.total()));
            }
        })));
        slot.set(Arc::downgrade(&sink)).unwrap();

        sink.set_total(3);
        for _ in 0..3 {
            sink.tick();
        }
        assert_eq!(*seen.lock(), vec![(1, 1, 3), (2, 2, 3), (3, 3, 3)]);
    }
}
