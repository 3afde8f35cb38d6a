//! Calculator traits and the `PiCalculator` decorator.
//!
//! `SeriesReducer` is the internal trait implemented by the sequential splitter
//! and by the pool-backed scheduler in orchestration.
//! `PiCalculator` wraps a reducer with precision planning, assembly and rendering.

use std::ops::Range;
use std::sync::Arc;

use tracing::debug;

use crate::assembler::assemble;
use crate::bsplit::Triple;
use crate::precision::{PrecisionPlan, Radix};
use crate::progress::ProgressSink;
use crate::render::render_fixed;

/// Error type for pi computations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PiError {
    /// Invalid user-facing configuration (digit count, base, threads).
    #[error("configuration error: {0}")]
    Config(String),

    /// The high-precision value could not be turned into digits.
    #[error("render error: {0}")]
    Render(String),

    /// An arithmetic invariant of the assembly stage was violated.
    #[error("arithmetic error: {0}")]
    Arithmetic(String),

    /// Work was submitted to a pool that has been shut down.
    #[error("worker pool is stopped")]
    PoolStopped,

    /// A worker task panicked or its result was lost.
    #[error("worker task failed: {0}")]
    TaskFailed(String),

    /// A resume tuple is malformed or does not match the requested computation.
    #[error("checkpoint error: {0}")]
    Checkpoint(String),
}

/// Computes the binary-splitting triple of the Chudnovsky series over an index range.
pub trait SeriesReducer: Send + Sync {
    /// Reduce `range` to a single triple, ticking `progress` once per leaf when present.
    fn reduce(
        &self,
        range: Range<u64>,
        progress: Option<&Arc<ProgressSink>>,
    ) -> Result<Triple, PiError>;

    /// Name of the reduction strategy.
    fn name(&self) -> &'static str;
}

/// Decorator turning a `SeriesReducer` into a full digits-to-string pipeline.
pub struct PiCalculator {
    inner: Arc<dyn SeriesReducer>,
}

impl PiCalculator {
    /// Create a new `PiCalculator` wrapping the given reducer.
    #[must_use]
    pub fn new(inner: Arc<dyn SeriesReducer>) -> Self {
        Self { inner }
    }

    /// Compute pi to `digits` digits in `radix`.
    ///
    /// When `progress` is given its total is set to the term count before the
    /// reduction starts.
    pub fn compute(
        &self,
        digits: u64,
        radix: Radix,
        progress: Option<&Arc<ProgressSink>>,
    ) -> Result<String, PiError> {
        let plan = PrecisionPlan::new(digits, radix)?;
        debug!(
            digits = plan.digits,
            bits = plan.bits,
            terms = plan.term_count,
            reducer = self.inner.name(),
            "Computing pi"
        );

        if let Some(sink) = progress {
            sink.set_total(plan.term_count);
        }
        let triple = self.inner.reduce(0..plan.term_count, progress)?;
        finish(&triple, &plan)
    }

    /// Get the name of the wrapped reducer.
    pub fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Assemble and render the triple for `[0, plan.term_count)`.
pub(crate) fn finish(triple: &Triple, plan: &PrecisionPlan) -> Result<String, PiError> {
    let pi = assemble(triple, plan.bits)?;
    let digits = usize::try_from(plan.digits)
        .map_err(|_| PiError::Config(format!("digit count {} is too large", plan.digits)))?;
    render_fixed(&pi, plan.radix, digits)
}
