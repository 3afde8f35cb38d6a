//! Fixed-size worker pool.
//!
//! Tasks go into a FIFO queue guarded by a mutex and a condition variable.
//! Each task reports its result through its own one-shot channel, so callers
//! can wait on handles in any order. Shutdown lets the workers drain every
//! queued task before joining them.

use std::collections::VecDeque;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver};
use parking_lot::{Condvar, Mutex};
use tracing::{debug, trace, warn};

use picalc_core::calculator::PiError;

type Job = Box<dyn FnOnce() + Send + 'static>;

struct Queue {
    jobs: VecDeque<Job>,
    stopped: bool,
}

struct Shared {
    queue: Mutex<Queue>,
    available: Condvar,
}

/// Fixed number of named worker threads fed from one task queue.
///
/// # Example
/// ```
/// use picalc_orchestration::pool::WorkerPool;
///
/// let pool = WorkerPool::new(2).unwrap();
/// let handle = pool.submit(|| 6 * 7).unwrap();
/// assert_eq!(handle.join().unwrap(), 42);
/// pool.shutdown();
/// assert!(pool.submit(|| 0).is_err());
/// ```
pub struct WorkerPool {
    shared: Arc<Shared>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    size: usize,
}

/// Pending result of a submitted task.
#[must_use = "a task result is lost unless the handle is joined"]
pub struct TaskHandle<T> {
    receiver: Receiver<Result<T, PiError>>,
}

impl<T> TaskHandle<T> {
    /// Block until the task has run and return its value.
    ///
    /// # Errors
    /// Returns [`PiError::TaskFailed`] when the task panicked or was dropped
    /// without running.
    pub fn join(self) -> Result<T, PiError> {
        self.receiver
            .recv()
            .map_err(|_| PiError::TaskFailed("task was dropped before completing".into()))?
    }
}

impl WorkerPool {
    /// Start `num_threads` workers.
    ///
    /// # Errors
    /// Returns [`PiError::Config`] for zero threads or when a worker thread
    /// cannot be spawned.
    pub fn new(num_threads: usize) -> Result<Self, PiError> {
        if num_threads == 0 {
            return Err(PiError::Config("worker pool needs at least one thread".into()));
        }

        let pool = Self {
            shared: Arc::new(Shared {
                queue: Mutex::new(Queue {
                    jobs: VecDeque::new(),
                    stopped: false,
                }),
                available: Condvar::new(),
            }),
            workers: Mutex::new(Vec::with_capacity(num_threads)),
            size: num_threads,
        };

        for index in 0..num_threads {
            let shared = Arc::clone(&pool.shared);
            let handle = thread::Builder::new()
                .name(format!("picalc-worker-{index}"))
                .spawn(move || worker_loop(&shared))
                .map_err(|err| PiError::Config(format!("failed to spawn worker thread: {err}")))?;
            pool.workers.lock().push(handle);
        }

        debug!(threads = num_threads, "Worker pool started");
        Ok(pool)
    }

    /// Queue `task` for execution.
    ///
    /// # Errors
    /// Returns [`PiError::PoolStopped`] after [`shutdown`](Self::shutdown).
    pub fn submit<F, T>(&self, task: F) -> Result<TaskHandle<T>, PiError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let (sender, receiver) = bounded(1);
        let job: Job = Box::new(move || {
            let outcome = catch_unwind(AssertUnwindSafe(task))
                .map_err(|payload| PiError::TaskFailed(panic_message(payload.as_ref())));
            // The caller may have dropped the handle.
            let _ = sender.send(outcome);
        });

        let mut queue = self.shared.queue.lock();
        if queue.stopped {
            return Err(PiError::PoolStopped);
        }
        queue.jobs.push_back(job);
        drop(queue);
        self.shared.available.notify_one();
        Ok(TaskHandle { receiver })
    }

    /// Stop accepting tasks, run everything already queued, and join the workers.
    ///
    /// Calling it again is a no-op.
    pub fn shutdown(&self) {
        {
            let mut queue = self.shared.queue.lock();
            if queue.stopped && self.workers.lock().is_empty() {
                return;
            }
            queue.stopped = true;
        }
        self.shared.available.notify_all();

        let workers = std::mem::take(&mut *self.workers.lock());
        let current = thread::current().id();
        for handle in workers {
            if handle.thread().id() == current {
                continue;
            }
            if handle.join().is_err() {
                warn!("worker thread terminated abnormally");
            }
        }
        debug!(threads = self.size, "Worker pool stopped");
    }

    /// Whether [`shutdown`](Self::shutdown) has been requested.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.shared.queue.lock().stopped
    }

    /// Number of worker threads.
    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Tasks queued but not yet picked up by a worker.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.shared.queue.lock().jobs.len()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.size)
            .field("pending", &self.pending())
            .field("stopped", &self.is_stopped())
            .finish()
    }
}

fn worker_loop(shared: &Shared) {
    loop {
        let job = {
            let mut queue = shared.queue.lock();
            loop {
                if let Some(job) = queue.jobs.pop_front() {
                    break Some(job);
                }
                if queue.stopped {
                    break None;
                }
                shared.available.wait(&mut queue);
            }
        };

        match job {
            Some(job) => {
                trace!(worker = thread::current().name().unwrap_or("worker"), "Running task");
                job();
            }
            None => return,
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "task panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn zero_threads_rejected() {
        assert!(matches!(WorkerPool::new(0), Err(PiError::Config(_))));
    }

    #[test]
    fn runs_submitted_tasks() {
        let pool = WorkerPool::new(3).unwrap();
        assert_eq!(pool.size(), 3);
        let handles: Vec<_> = (0..20u64).map(|i| pool.submit(move || i * i).unwrap()).collect();
        let results: Vec<u64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results, (0..20u64).map(|i| i * i).collect::<Vec<_>>());
    }

    #[test]
    fn handles_can_be_joined_out_of_order() {
        let pool = WorkerPool::new(2).unwrap();
        let slow = pool
            .submit(|| {
                thread::sleep(Duration::from_millis(20));
                "slow"
            })
            .unwrap();
        let fast = pool.submit(|| "fast").unwrap();
        assert_eq!(fast.join().unwrap(), "fast");
        assert_eq!(slow.join().unwrap(), "slow");
    }

    #[test]
    fn submit_after_shutdown_is_an_error() {
        let pool = WorkerPool::new(2).unwrap();
        pool.shutdown();
        assert!(pool.is_stopped());
        assert!(matches!(pool.submit(|| 1), Err(PiError::PoolStopped)));
        // State is still consistent
        assert_eq!(pool.pending(), 0);
        assert!(matches!(pool.submit(|| 2), Err(PiError::PoolStopped)));
    }

    #[test]
    fn shutdown_drains_pending_tasks() {
        let pool = WorkerPool::new(1).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..10)
            .map(|_| {
                let counter = Arc::clone(&counter);
                pool.submit(move || {
                    thread::sleep(Duration::from_millis(2));
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap()
            })
            .collect();

        pool.shutdown();
        assert_eq!(counter.load(Ordering::SeqCst), 10);
        for handle in handles {
            assert!(handle.join().is_ok());
        }
    }

    #[test]
    fn shutdown_is_idempotent() {
        let pool = WorkerPool::new(2).unwrap();
        pool.shutdown();
        pool.shutdown();
        assert!(pool.is_stopped());
    }

    #[test]
    fn panicking_task_reports_failure() {
        let pool = WorkerPool::new(1).unwrap();
        let handle = pool.submit(|| -> u32 { panic!("boom") }).unwrap();
        match handle.join() {
            Err(PiError::TaskFailed(message)) => assert!(message.contains("boom")),
            other => panic!("unexpected result: {other:?}"),
        }
        // The worker survives the panic
        assert_eq!(pool.submit(|| 5).unwrap().join().unwrap(), 5);
    }

    #[test]
    fn dropping_pool_joins_workers() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let pool = WorkerPool::new(2).unwrap();
            for _ in 0..4 {
                let counter = Arc::clone(&counter);
                let _ = pool.submit(move || counter.fetch_add(1, Ordering::SeqCst));
            }
        }
        assert_eq!(counter.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn pool_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<WorkerPool>();
    }
}
