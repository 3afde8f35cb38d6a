//! Terminal progress bar fed from a progress channel.
//!
//! Workers report through a [`ChannelObserver`]; a dedicated thread drains the
//! channel and drives the bar, so terminal I/O never runs on a worker.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::warn;

use picalc_core::observers::ChannelObserver;
use picalc_core::progress::{ProgressSink, ProgressUpdate};
use picalc_orchestration::interfaces::ProgressReporter;

/// Capacity of the progress channel; updates beyond it are dropped.
const CHANNEL_CAPACITY: usize = 64;

const TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} terms ({eta})";

/// Progress bar counting evaluated series terms.
pub struct ProgressDisplay {
    bar: ProgressBar,
}

impl ProgressDisplay {
    /// Create a bar drawing to stderr.
    #[must_use]
    pub fn new() -> Self {
        Self::with_target(ProgressDrawTarget::stderr())
    }

    /// Create a bar that draws nothing.
    #[must_use]
    pub fn hidden() -> Self {
        Self::with_target(ProgressDrawTarget::hidden())
    }

    fn with_target(target: ProgressDrawTarget) -> Self {
        let bar = ProgressBar::with_draw_target(Some(0), target);
        let style = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> ");
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(120));
        Self { bar }
    }

    /// Current position of the bar.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Current length of the bar.
    #[must_use]
    pub fn length(&self) -> Option<u64> {
        self.bar.length()
    }
}

impl Default for ProgressDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for ProgressDisplay {
    fn report(&self, update: &ProgressUpdate) {
        if self.bar.length() != Some(update.total) {
            self.bar.set_length(update.total);
        }
        self.bar.set_position(update.done);
    }

    fn complete(&self) {
        self.bar.finish_and_clear();
    }
}

/// Forward every update from `receiver` to `reporter` until the channel closes.
pub fn drive(reporter: &dyn ProgressReporter, receiver: &Receiver<ProgressUpdate>) {
    for update in receiver {
        reporter.report(&update);
    }
    reporter.complete();
}

/// Progress sink wired to a reporter running on its own thread.
pub struct ProgressPipeline {
    sink: Arc<ProgressSink>,
    handle: JoinHandle<()>,
}

impl ProgressPipeline {
    /// Start a reporting thread for `reporter`.
    pub fn start<R>(reporter: R) -> std::io::Result<Self>
    where
        R: ProgressReporter + 'static,
    {
        let (sender, receiver) = bounded(CHANNEL_CAPACITY);
        let sink = Arc::new(ProgressSink::new(Arc::new(ChannelObserver::new(sender))));
        let handle = thread::Builder::new()
            .name("picalc-progress".to_string())
            .spawn(move || drive(&reporter, &receiver))?;
        Ok(Self { sink, handle })
    }

    /// Sink to pass to the computation.
    #[must_use]
    pub fn sink(&self) -> &Arc<ProgressSink> {
        &self.sink
    }

    /// Close the channel and wait for the reporter to finish.
    ///
    /// Every other clone of the sink must be dropped first.
    pub fn finish(self) {
        drop(self.sink);
        if self.handle.join().is_err() {
            warn!("progress display thread panicked");
        }
    }
}
