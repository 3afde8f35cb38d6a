//! Reducer selection logic.

use std::sync::Arc;

use tracing::debug;

use picalc_core::bsplit::BinarySplitter;
use picalc_core::calculator::{PiError, SeriesReducer};
use picalc_core::options::Options;

use crate::pool::WorkerPool;
use crate::scheduler::ParallelScheduler;

/// Name of the sequential reducer.
pub const SEQUENTIAL: &str = "chudnovsky";

/// Name of the pool-backed reducer.
pub const PARALLEL: &str = "chudnovsky-parallel";

/// Pick a reducer for `options`.
///
/// One thread (after normalization) selects the sequential splitter and
/// bypasses the pool. More threads start a pool owned by the returned
/// reducer; it shuts down when the reducer is dropped.
pub fn select_reducer(options: &Options) -> Result<Arc<dyn SeriesReducer>, PiError> {
    let options = options.normalize();
    options.validate()?;
    if options.num_threads <= 1 {
        debug!(reducer = SEQUENTIAL, "Selected reducer");
        return Ok(Arc::new(BinarySplitter::new()));
    }

    let pool = Arc::new(WorkerPool::new(options.num_threads)?);
    debug!(
        reducer = PARALLEL,
        threads = options.num_threads,
        chunk_size = options.chunk_size,
        "Selected reducer"
    );
    Ok(Arc::new(
        ParallelScheduler::new(pool).with_chunk_size(options.chunk_size),
    ))
}

/// Look up a reducer by the name recorded in a checkpoint.
pub fn reducer_by_name(name: &str, options: &Options) -> Result<Arc<dyn SeriesReducer>, PiError> {
    match name {
        SEQUENTIAL => Ok(Arc::new(BinarySplitter::new())),
        PARALLEL => {
            let mut options = options.normalize();
            options.num_threads = options.num_threads.max(2);
            select_reducer(&options)
        }
        other => Err(PiError::Config(format!("unknown reducer: {other}"))),
    }
}
