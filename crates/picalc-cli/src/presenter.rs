//! CLI result presenter.
//!
//! The digits go to stdout; everything else goes to stderr so the output can
//! be piped.

use std::time::Duration;

use picalc_core::precision::PrecisionPlan;
use picalc_core::selftest::SelfTestReport;
use picalc_orchestration::interfaces::{CalculationResult, ResultPresenter};

use crate::output::{format_duration, format_number, format_result};
use crate::ui::{print_error, print_status, print_success};

/// CLI result presenter.
pub struct CLIResultPresenter {
    verbose: bool,
    quiet: bool,
    print_value: bool,
}

impl CLIResultPresenter {
    #[must_use]
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            print_value: true,
        }
    }

    /// Whether the digits are printed to stdout (off when written to a file).
    #[must_use]
    pub fn with_value_output(mut self, print_value: bool) -> Self {
        self.print_value = print_value;
        self
    }

    /// Summary lines describing a finished calculation.
    #[must_use]
    pub fn summary(&self, result: &CalculationResult) -> Vec<String> {
        let mut lines = vec![
            format!("Algorithm: {}", result.algorithm),
            format!(
                "Digits: {} (base {})",
                format_number(result.digits),
                result.radix.base()
            ),
            format!("Threads: {}", result.num_threads),
            format!("Duration: {}", format_duration(result.duration)),
        ];

        if self.verbose {
            if let Ok(plan) = PrecisionPlan::new(result.digits, result.radix) {
                lines.push(format!("Working precision: {} bits", format_number(plan.bits)));
                lines.push(format!("Series terms: {}", format_number(plan.term_count)));
            }
        }

        if let Some(value) = result.value() {
            if !self.print_value {
                lines.push(format!("pi = {}", format_result(value, false)));
            }
        }
        lines
    }
}

impl ResultPresenter for CLIResultPresenter {
    fn present_result(&self, result: &CalculationResult) {
        let value = match &result.outcome {
            Ok(value) => value,
            Err(err) => {
                self.present_error(&err.to_string());
                return;
            }
        };

        if !self.quiet {
            for line in self.summary(result) {
                print_status(&line);
            }
        }
        if self.print_value {
            println!("{value}");
        }
    }

    fn present_self_test(&self, report: &SelfTestReport, duration: Duration) {
        if report.passed() {
            if !self.quiet {
                print_success(&format!("{report} in {}", format_duration(duration)));
            }
        } else {
            print_error(&report.to_string());
        }
    }

    fn present_error(&self, error: &str) {
        print_error(error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use picalc_core::calculator::PiError;
    use picalc_core::precision::Radix;

    fn result(outcome: Result<String, PiError>) -> CalculationResult {
        CalculationResult {
            algorithm: "chudnovsky".into(),
            digits: 1000,
            radix: Radix::Decimal,
            num_threads: 1,
            outcome,
            duration: Duration::from_millis(5),
        }
    }

    #[test]
    fn presenter_modes() {
        let presenter = CLIResultPresenter::new(true, false);
        assert!(presenter.verbose);
        assert!(!presenter.quiet);
        assert!(presenter.print_value);
        assert!(!presenter.with_value_output(false).print_value);
    }

    #[test]
    fn summary_lists_run_details() {
        let presenter = CLIResultPresenter::new(false, false);
        let lines = presenter.summary(&result(Ok("3.14".into())));
        assert!(lines.contains(&"Algorithm: chudnovsky".to_string()));
        assert!(lines.contains(&"Digits: 1,000 (base 10)".to_string()));
        assert!(!lines.iter().any(|line| line.starts_with("Series terms")));
    }

    #[test]
    fn verbose_summary_includes_plan() {
        let presenter = CLIResultPresenter::new(true, false);
        let lines = presenter.summary(&result(Ok("3.14".into())));
        assert!(lines.contains(&"Working precision: 3,386 bits".to_string()));
        assert!(lines.contains(&"Series terms: 72".to_string()));
    }

    #[test]
    fn summary_previews_value_written_elsewhere() {
        let presenter = CLIResultPresenter::new(false, false).with_value_output(false);
        let lines = presenter.summary(&result(Ok("3.14".into())));
        assert!(lines.contains(&"pi = 3.14".to_string()));
    }

    #[test]
    fn present_result_and_errors_do_not_panic() {
        let presenter = CLIResultPresenter::new(false, true);
        presenter.present_result(&result(Ok("3.14".into())));
        presenter.present_result(&result(Err(PiError::PoolStopped)));
        presenter.present_error("");
    }

    #[test]
    fn present_self_test_reports() {
        let presenter = CLIResultPresenter::new(false, false);
        let passed = SelfTestReport {
            digits: 10,
            reducer: "chudnovsky",
            mismatch: None,
        };
        presenter.present_self_test(&passed, Duration::from_millis(1));
        let failed = SelfTestReport {
            mismatch: Some(4),
            ..passed
        };
        presenter.present_self_test(&failed, Duration::from_millis(1));
    }
}
