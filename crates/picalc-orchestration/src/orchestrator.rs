//! Threaded entry points and timed execution.

use std::sync::Arc;
use std::time::Instant;

use tracing::info;

use picalc_core::calculator::{PiCalculator, PiError};
use picalc_core::checkpoint::Checkpoint;
use picalc_core::options::Options;
use picalc_core::precision::Radix;
use picalc_core::progress::ProgressSink;
use picalc_core::selftest::{self_test_with, SelfTestReport};

use crate::calculator_selection::{reducer_by_name, select_reducer};
use crate::interfaces::CalculationResult;
use crate::pool::WorkerPool;
use crate::scheduler::ParallelScheduler;

/// Compute pi to `digits` digits in base 10 or 16 on `num_threads` threads.
///
/// Zero threads means the available parallelism; one thread runs on the
/// calling thread without a pool. The pool lives for this call only.
///
/// # Example
/// ```
/// use picalc_orchestration::compute_pi_base_threaded;
///
/// let pi = compute_pi_base_threaded(20, 10, 4).unwrap();
/// assert_eq!(pi, "3.14159265358979323846");
/// ```
pub fn compute_pi_base_threaded(
    digits: u64,
    base: u32,
    num_threads: usize,
) -> Result<String, PiError> {
    compute_pi_with_options(
        digits,
        Radix::from_base(base)?,
        &Options::with_threads(num_threads),
        None,
    )
}

/// Compute pi with explicit options and an optional progress sink.
pub fn compute_pi_with_options(
    digits: u64,
    radix: Radix,
    options: &Options,
    progress: Option<&Arc<ProgressSink>>,
) -> Result<String, PiError> {
    let reducer = select_reducer(options)?;
    PiCalculator::new(reducer).compute(digits, radix, progress)
}

/// Compute pi on a caller-owned pool. The pool stays running afterwards.
pub fn compute_pi_on_pool(
    digits: u64,
    radix: Radix,
    pool: &Arc<WorkerPool>,
    chunk_size: u64,
    progress: Option<&Arc<ProgressSink>>,
) -> Result<String, PiError> {
    let scheduler = ParallelScheduler::new(Arc::clone(pool)).with_chunk_size(chunk_size);
    PiCalculator::new(Arc::new(scheduler)).compute(digits, radix, progress)
}

/// Run one timed calculation and capture its outcome.
#[must_use]
pub fn execute_calculation(
    digits: u64,
    radix: Radix,
    options: &Options,
    progress: Option<&Arc<ProgressSink>>,
) -> CalculationResult {
    let options = options.normalize();
    let start = Instant::now();
    let (algorithm, outcome) = match select_reducer(&options) {
        Ok(reducer) => {
            let name = reducer.name().to_string();
            (name, PiCalculator::new(reducer).compute(digits, radix, progress))
        }
        Err(err) => (String::from("unavailable"), Err(err)),
    };
    let duration = start.elapsed();

    info!(
        algorithm = %algorithm,
        digits,
        threads = options.num_threads,
        elapsed = ?duration,
        ok = outcome.is_ok(),
        "Calculation finished"
    );
    CalculationResult {
        algorithm,
        digits,
        radix,
        num_threads: options.num_threads,
        outcome,
        duration,
    }
}

/// Run the self-test with the reducer selected for `options`.
pub fn run_self_test(digits: u64, options: &Options) -> Result<SelfTestReport, PiError> {
    self_test_with(select_reducer(options)?, digits)
}

/// Finish a checkpointed computation with the reducer it names.
pub fn resume_threaded(
    checkpoint: &Checkpoint,
    options: &Options,
    progress: Option<&Arc<ProgressSink>>,
) -> Result<String, PiError> {
    let reducer = reducer_by_name(&checkpoint.algorithm, options)?;
    checkpoint.resume(reducer.as_ref(), progress)
}
