//! Chunked parallel reduction on a worker pool.
//!
//! The index range is cut into contiguous chunks in ascending order; each
//! chunk is reduced as an independent task. Results are folded into one
//! accumulator strictly by chunk index, never by completion order, because
//! combine is not commutative.

use std::ops::Range;
use std::sync::Arc;

use tracing::{debug, trace};

use picalc_core::bsplit::{BinarySplitter, Triple};
use picalc_core::calculator::{PiError, SeriesReducer};
use picalc_core::options::Options;
use picalc_core::progress::ProgressSink;

use crate::pool::{TaskHandle, WorkerPool};

/// Reducer that spreads chunks of the series over a [`WorkerPool`].
pub struct ParallelScheduler {
    pool: Arc<WorkerPool>,
    splitter: BinarySplitter,
    chunk_size: u64,
}

impl ParallelScheduler {
    /// Schedule on `pool` with a chunk size derived from the pool size.
    #[must_use]
    pub fn new(pool: Arc<WorkerPool>) -> Self {
        Self {
            pool,
            splitter: BinarySplitter::new(),
            chunk_size: 0,
        }
    }

    /// Use a fixed chunk size (0 restores the automatic size).
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: u64) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// The pool tasks are submitted to.
    #[must_use]
    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    /// Chunk size used for a range of `len` terms.
    #[must_use]
    pub fn chunk_size_for(&self, len: u64) -> u64 {
        Options {
            num_threads: self.pool.size(),
            chunk_size: self.chunk_size,
        }
        .chunk_size_for(len)
    }
}

impl SeriesReducer for ParallelScheduler {
    fn reduce(
        &self,
        range: Range<u64>,
        progress: Option<&Arc<ProgressSink>>,
    ) -> Result<Triple, PiError> {
        if range.is_empty() {
            return Ok(Triple::identity());
        }

        let chunk_size = self.chunk_size_for(range.end - range.start);
        let chunks = chunk_ranges(range.clone(), chunk_size);
        debug!(
            start = range.start,
            end = range.end,
            chunk_size,
            chunks = chunks.len(),
            threads = self.pool.size(),
            "Dispatching chunks"
        );

        let handles = chunks
            .into_iter()
            .map(|chunk| {
                let splitter = self.splitter;
                let sink = progress.cloned();
                self.pool.submit(move || {
                    trace!(start = chunk.start, end = chunk.end, "Reducing chunk");
                    match sink {
                        Some(sink) => splitter.reduce_with_progress(chunk.start, chunk.end, &sink),
                        None => splitter.reduce(chunk.start, chunk.end),
                    }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        fold_in_order(handles.into_iter().map(TaskHandle::join))
    }

    fn name(&self) -> &'static str {
        "chudnovsky-parallel"
    }
}

/// Cut `range` into consecutive chunks of at most `chunk_size` terms.
///
/// A zero chunk size is treated as one.
#[must_use]
pub fn chunk_ranges(range: Range<u64>, chunk_size: u64) -> Vec<Range<u64>> {
    let step = chunk_size.max(1);
    let mut chunks = Vec::new();
    let mut start = range.start;
    while start < range.end {
        let end = start.saturating_add(step).min(range.end);
        chunks.push(start..end);
        start = end;
    }
    chunks
}

/// Fold chunk results left to right, waiting on each in turn.
///
/// A later chunk that finished early stays buffered in its channel until
/// every chunk before it has been combined.
fn fold_in_order<I>(partials: I) -> Result<Triple, PiError>
where
    I: IntoIterator<Item = Result<Triple, PiError>>,
{
    let mut partials = partials.into_iter();
    let Some(first) = partials.next() else {
        return Ok(Triple::identity());
    };
    let mut acc = first?;
    for next in partials {
        acc = acc.combine(&next?);
    }
    Ok(acc)
}
