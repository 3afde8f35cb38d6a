//! Orchestration interfaces.

use std::time::Duration;

use picalc_core::calculator::PiError;
use picalc_core::precision::Radix;
use picalc_core::progress::ProgressUpdate;
use picalc_core::selftest::SelfTestReport;

/// Trait for reporting progress to the user.
pub trait ProgressReporter: Send + Sync {
    /// Report a progress update.
    fn report(&self, update: &ProgressUpdate);

    /// Report completion.
    fn complete(&self);
}

/// Trait for presenting results to the user.
pub trait ResultPresenter: Send + Sync {
    /// Present a finished calculation.
    fn present_result(&self, result: &CalculationResult);

    /// Present a self-test outcome.
    fn present_self_test(&self, report: &SelfTestReport, duration: Duration);

    /// Present an error.
    fn present_error(&self, error: &str);
}

/// Result of a single calculation.
#[derive(Debug, Clone)]
pub struct CalculationResult {
    /// Reducer name.
    pub algorithm: String,
    /// Requested digits after the radix point.
    pub digits: u64,
    /// Output radix.
    pub radix: Radix,
    /// Worker threads used.
    pub num_threads: usize,
    /// The rendered digits or a structured error.
    pub outcome: Result<String, PiError>,
    /// Computation duration.
    pub duration: Duration,
}

impl CalculationResult {
    /// Rendered value, if the calculation succeeded.
    #[must_use]
    pub fn value(&self) -> Option<&str> {
        self.outcome.as_deref().ok()
    }
}
