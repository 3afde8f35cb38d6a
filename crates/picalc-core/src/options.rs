//! Calculation options and configuration.

use crate::calculator::PiError;
use crate::constants::{CHUNKS_PER_THREAD, MAX_THREADS};

/// Options for threaded pi calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    /// Worker threads (0 = available parallelism, 1 = sequential).
    pub num_threads: usize,
    /// Terms per scheduled chunk (0 = derived from the term count).
    pub chunk_size: u64,
}

impl Options {
    /// Options with a fixed thread count and automatic chunking.
    #[must_use]
    pub fn with_threads(num_threads: usize) -> Self {
        Self {
            num_threads,
            ..Self::default()
        }
    }

    /// Normalize options, applying defaults where values are zero.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        if self.num_threads == 0 {
            self.num_threads = default_threads();
        }
        self
    }

    /// Reject thread counts outside `1..=MAX_THREADS` after normalization.
    pub fn validate(&self) -> Result<(), PiError> {
        if self.num_threads > MAX_THREADS {
            return Err(PiError::Config(format!(
                "thread count {} exceeds the maximum of {MAX_THREADS}",
                self.num_threads
            )));
        }
        Ok(())
    }

    /// Chunk size for a reduction over `term_count` terms.
    ///
    /// An explicit `chunk_size` wins; otherwise the range is split into
    /// `CHUNKS_PER_THREAD` chunks per thread. Never returns zero.
    #[must_use]
    pub fn chunk_size_for(&self, term_count: u64) -> u64 {
        if self.chunk_size > 0 {
            return self.chunk_size;
        }
        let chunks = (self.num_threads.max(1) as u64).saturating_mul(CHUNKS_PER_THREAD);
        term_count.div_ceil(chunks).max(1)
    }
}

fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(1)
}
