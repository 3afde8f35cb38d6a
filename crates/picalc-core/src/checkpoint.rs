//! Resume tuple for interrupted reductions.
//!
//! A checkpoint carries the exact triple of a completed prefix `[0, k)` of
//! the series. Resuming reduces `[k, N)` and combines the two halves in index
//! order, which yields the same triple as an uninterrupted run. Persisting the
//! tuple is left to the caller.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bsplit::Triple;
use crate::calculator::{finish, PiError, SeriesReducer};
use crate::precision::{PrecisionPlan, Radix};
use crate::progress::ProgressSink;

/// Everything needed to re-enter a reduction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Requested digits after the radix point.
    pub digits: u64,
    /// Output base (10 or 16).
    pub base: u32,
    /// Worker threads of the interrupted run.
    pub num_threads: usize,
    /// Terms already folded into `partial_result`.
    pub completed_terms: u64,
    /// Terms of the whole reduction.
    pub total_terms: u64,
    /// Triple of `[0, completed_terms)` as produced by [`Triple::encode`].
    pub partial_result: String,
    /// Name of the reducer that produced the partial result.
    pub algorithm: String,
}

impl Checkpoint {
    /// Reduce the first `completed_terms` terms with `reducer` and capture them.
    pub fn capture(
        reducer: &dyn SeriesReducer,
        digits: u64,
        radix: Radix,
        num_threads: usize,
        completed_terms: u64,
    ) -> Result<Self, PiError> {
        let plan = PrecisionPlan::new(digits, radix)?;
        if completed_terms > plan.term_count {
            return Err(PiError::Checkpoint(format!(
                "completed terms {completed_terms} exceed total {}",
                plan.term_count
            )));
        }

        let partial = reducer.reduce(0..completed_terms, None)?;
        debug!(
            digits,
            completed = completed_terms,
            total = plan.term_count,
            algorithm = reducer.name(),
            "Captured checkpoint"
        );
        Ok(Self {
            digits,
            base: radix.base(),
            num_threads,
            completed_terms,
            total_terms: plan.term_count,
            partial_result: partial.encode(),
            algorithm: reducer.name().to_string(),
        })
    }

    /// Plan of the checkpointed computation, checked against the stored counts.
    pub fn plan(&self) -> Result<PrecisionPlan, PiError> {
        let radix = Radix::from_base(self.base)
            .map_err(|err| PiError::Checkpoint(err.to_string()))?;
        let plan = PrecisionPlan::new(self.digits, radix)
            .map_err(|err| PiError::Checkpoint(err.to_string()))?;
        if plan.term_count != self.total_terms {
            return Err(PiError::Checkpoint(format!(
                "total terms {} do not match the {} terms planned for {} digits",
                self.total_terms, plan.term_count, self.digits
            )));
        }
        if self.completed_terms > self.total_terms {
            return Err(PiError::Checkpoint(format!(
                "completed terms {} exceed total {}",
                self.completed_terms, self.total_terms
            )));
        }
        Ok(plan)
    }

    /// Decode the stored partial triple.
    pub fn partial_triple(&self) -> Result<Triple, PiError> {
        Triple::decode(&self.partial_result)
    }

    /// Finish the computation with `reducer`.
    ///
    /// When `progress` is given it counts from `completed_terms`.
    pub fn resume(
        &self,
        reducer: &dyn SeriesReducer,
        progress: Option<&Arc<ProgressSink>>,
    ) -> Result<String, PiError> {
        let plan = self.plan()?;
        let prefix = self.partial_triple()?;
        if reducer.name() != self.algorithm {
            debug!(
                stored = %self.algorithm,
                current = reducer.name(),
                "Resuming with a different reducer"
            );
        }

        if let Some(sink) = progress {
            sink.set_total(plan.term_count);
            sink.resume_from(self.completed_terms);
        }
        let rest = reducer.reduce(self.completed_terms..plan.term_count, progress)?;
        finish(&prefix.combine(&rest), &plan)
    }
}
