//! # picalc-core
//!
//! Core library of the picalc pi calculator: exact Chudnovsky binary
//! splitting, precision planning, high-precision assembly and fixed-digit
//! rendering in base 10 or 16.

pub mod assembler;
pub mod bigfloat;
pub mod bsplit;
pub mod calculator;
pub mod checkpoint;
pub mod constants;
pub mod observer;
pub mod observers;
pub mod options;
pub mod precision;
pub mod progress;
pub mod render;
pub mod selftest;
pub mod term;

// Re-exports
pub use bsplit::{BinarySplitter, Triple};
pub use calculator::{PiCalculator, PiError, SeriesReducer};
pub use checkpoint::Checkpoint;
pub use constants::{exit_codes, PROGRESS_REPORT_THRESHOLD};
pub use observer::ProgressObserver;
pub use options::Options;
pub use precision::{PrecisionPlan, Radix};
pub use progress::{ProgressSink, ProgressUpdate};
pub use selftest::{self_test, SelfTestReport};

use std::sync::Arc;

fn sequential() -> PiCalculator {
    PiCalculator::new(Arc::new(BinarySplitter::new()))
}

/// Compute pi to `digits` decimals on the calling thread.
///
/// # Example
/// ```
/// assert_eq!(picalc_core::compute_pi(10).unwrap(), "3.1415926535");
/// assert!(picalc_core::compute_pi(0).is_err());
/// ```
pub fn compute_pi(digits: u64) -> Result<String, PiError> {
    sequential().compute(digits, Radix::Decimal, None)
}

/// Compute pi to `digits` decimals, ticking `progress` once per series term.
pub fn compute_pi_with_progress(
    digits: u64,
    progress: &Arc<ProgressSink>,
) -> Result<String, PiError> {
    sequential().compute(digits, Radix::Decimal, Some(progress))
}

/// Compute pi to `digits` digits in base 10 or 16.
///
/// # Example
/// ```
/// assert_eq!(picalc_core::compute_pi_base(8, 16).unwrap(), "3.243f6a88");
/// assert!(picalc_core::compute_pi_base(8, 2).is_err());
/// ```
pub fn compute_pi_base(digits: u64, base: u32) -> Result<String, PiError> {
    sequential().compute(digits, Radix::from_base(base)?, None)
}

/// Capture the first `completed_terms` terms of a `digits`-digit computation.
pub fn capture_checkpoint(
    digits: u64,
    base: u32,
    completed_terms: u64,
) -> Result<Checkpoint, PiError> {
    Checkpoint::capture(
        &BinarySplitter::new(),
        digits,
        Radix::from_base(base)?,
        1,
        completed_terms,
    )
}

/// Finish a captured computation on the calling thread.
pub fn resume(checkpoint: &Checkpoint) -> Result<String, PiError> {
    checkpoint.resume(&BinarySplitter::new(), None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observers::NoOpObserver;

    #[test]
    fn compute_pi_prefix() {
        assert_eq!(compute_pi(1).unwrap(), "3.1");
        assert_eq!(compute_pi(2).unwrap(), "3.14");
        assert_eq!(
            compute_pi(50).unwrap(),
            "3.14159265358979323846264338327950288419716939937510"
        );
    }

    #[test]
    fn compute_pi_length() {
        for digits in [1, 7, 64, 333] {
            let pi = compute_pi(digits).unwrap();
            assert_eq!(pi.len(), 2 + digits as usize);
            assert!(pi.starts_with("3."));
        }
    }

    #[test]
    fn compute_pi_base_hex() {
        let pi = compute_pi_base(32, 16).unwrap();
        assert_eq!(pi, "3.243f6a8885a308d313198a2e03707344");
    }

    #[test]
    fn compute_pi_base_ten_matches_compute_pi() {
        assert_eq!(compute_pi_base(100, 10).unwrap(), compute_pi(100).unwrap());
    }

    #[test]
    fn compute_pi_base_rejects_other_bases() {
        assert!(matches!(compute_pi_base(10, 8), Err(PiError::Config(_))));
    }

    #[test]
    fn compute_pi_with_progress_counts_every_term() {
        let sink = Arc::new(ProgressSink::new(Arc::new(NoOpObserver::new())));
        let pi = compute_pi_with_progress(1000, &sink).unwrap();
        assert_eq!(pi, compute_pi(1000).unwrap());
        assert_eq!(sink.total(), 72);
        assert_eq!(sink.done(), 72);
    }

    #[test]
    fn reused_sink_restarts_each_run() {
        let overshoot = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let seen = Arc::clone(&overshoot);
        let sink = Arc::new(ProgressSink::new(Arc::new(
            move |update: &progress::ProgressUpdate| {
                if update.done > update.total {
                    seen.lock().push(*update);
                }
            },
        )));
        for _ in 0..2 {
            compute_pi_with_progress(100, &sink).unwrap();
            assert_eq!(sink.total(), 9);
            assert_eq!(sink.done(), 9);
        }
        assert!(overshoot.lock().is_empty(), "{:?}", overshoot.lock());
    }

    #[test]
    fn checkpoint_round_trip() {
        let checkpoint = capture_checkpoint(500, 10, 17).unwrap();
        assert_eq!(checkpoint.algorithm, "chudnovsky");
        assert_eq!(resume(&checkpoint).unwrap(), compute_pi(500).unwrap());
    }
}
