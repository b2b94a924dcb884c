//! Progress reporting capability.
//!
//! Resolved once at startup to either a real terminal progress bar or a
//! no-op, so the orchestrator never has to care which one it got.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::IsTerminal;

pub trait ProgressReporter: Send + Sync {
    fn begin(&self, total: usize);
    fn advance(&self);
    fn finish(&self);
}

/// Used for dry runs and non-interactive sessions.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn begin(&self, _total: usize) {}
    fn advance(&self) {}
    fn finish(&self) {}
}

/// Terminal progress bar, one tick per completed batch.
pub struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    pub fn new() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }
}

impl Default for BarReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for BarReporter {
    fn begin(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.set_style(
            ProgressStyle::with_template("Compressing {bar:40} {pos}/{len} batches")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
    }

    fn advance(&self) {
        self.bar.inc(1);
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

/// Pick the progress implementation for this run.
pub fn resolve(dry_run: bool) -> Box<dyn ProgressReporter> {
    if dry_run || !std::io::stderr().is_terminal() {
        Box::new(NoopReporter)
    } else {
        Box::new(BarReporter::new())
    }
}
