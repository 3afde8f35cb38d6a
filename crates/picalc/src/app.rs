//! Application entry point and dispatch.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use tracing::debug;

use picalc_cli::output::{format_number, write_to_file};
use picalc_cli::presenter::CLIResultPresenter;
use picalc_cli::progress::{ProgressDisplay, ProgressPipeline};
use picalc_cli::ui::{print_header, print_status};
use picalc_core::observers::LoggingObserver;
use picalc_core::progress::ProgressSink;
use picalc_orchestration::interfaces::ResultPresenter;
use picalc_orchestration::orchestrator::{execute_calculation, run_self_test};

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::version::full_version;

/// Minimum time between progress log lines in verbose mode.
const LOG_INTERVAL_MS: u64 = 500;

/// Run the application.
pub fn run(config: &AppConfig) -> Result<()> {
    // Handle shell completion
    if let Some(shell) = config.completion {
        let mut cmd = <AppConfig as clap::CommandFactory>::command();
        picalc_cli::completion::generate_completion(&mut cmd, shell, &mut std::io::stdout());
        return Ok(());
    }

    if config.self_test {
        return run_self_check(config);
    }

    run_cli(config)
}

fn run_cli(config: &AppConfig) -> Result<()> {
    let radix = config.radix()?;
    let options = config.options().normalize();
    options.validate()?;
    debug!(?options, digits = config.digits, base = radix.base(), "Configuration");

    if !config.quiet {
        print_header(&full_version());
        print_status(&format!(
            "Computing {} digits of pi in base {} on {} thread(s)",
            format_number(config.digits),
            radix.base(),
            options.num_threads
        ));
    }

    let result = if config.progress && !config.quiet {
        let pipeline =
            ProgressPipeline::start(ProgressDisplay::new()).context("starting progress display")?;
        let result = execute_calculation(config.digits, radix, &options, Some(pipeline.sink()));
        pipeline.finish();
        result
    } else if config.verbose {
        let sink = Arc::new(ProgressSink::new(Arc::new(LoggingObserver::new(
            LOG_INTERVAL_MS,
        ))));
        execute_calculation(config.digits, radix, &options, Some(&sink))
    } else {
        execute_calculation(config.digits, radix, &options, None)
    };

    let value = result.outcome.clone()?;
    if let Some(path) = &config.output {
        write_to_file(path, &value)
            .with_context(|| format!("writing digits to {}", path.display()))?;
    }

    CLIResultPresenter::new(config.verbose, config.quiet)
        .with_value_output(config.output.is_none())
        .present_result(&result);
    Ok(())
}

fn run_self_check(config: &AppConfig) -> Result<()> {
    let options = config.options().normalize();
    options.validate()?;

    let start = Instant::now();
    let report = run_self_test(config.digits, &options)?;
    CLIResultPresenter::new(config.verbose, config.quiet)
        .present_self_test(&report, start.elapsed());

    match report.mismatch {
        None => Ok(()),
        Some(index) => Err(AppError::SelfTestFailed {
            digits: report.digits,
            index,
        }
        .into()),
    }
}
