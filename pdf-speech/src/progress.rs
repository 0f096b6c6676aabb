//! Terminal progress bar.

use indicatif::{ProgressBar, ProgressStyle};
use speech_core::{PageState, ProgressSink, RunSummary};

/// Shows conversion progress as a page-count bar.
pub struct BarSink {
    bar: ProgressBar,
}

impl BarSink {
    pub fn new() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Leave the bar where it is after a failure.
    pub fn abandon(&self) {
        self.bar.abandon();
    }
}

impl ProgressSink for BarSink {
    fn on_start(&mut self, total_pages: usize, already_done: usize) {
        let bar = ProgressBar::new(total_pages as u64);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} pages ({eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        if already_done > 0 {
            bar.println(format!(
                "Resuming: {}/{} page(s) already converted",
                already_done, total_pages
            ));
        }
        self.bar = bar;
    }

    fn on_page(&mut self, page: usize, state: PageState) {
        if state.is_terminal() && state != PageState::Failed {
            self.bar.inc(1);
        }
        self.bar.set_message(format!("page {}: {}", page, state));
    }

    fn on_chunk(&mut self, page: usize, chunk: usize, total_chunks: usize) {
        if total_chunks > 1 {
            self.bar
                .set_message(format!("page {}: part {}/{}", page, chunk, total_chunks));
        }
    }

    fn on_finish(&mut self, summary: &RunSummary) {
        self.bar.finish_with_message(format!(
            "{} rendered, {} skipped, {} empty",
            summary.rendered, summary.skipped, summary.empty
        ));
    }
}
