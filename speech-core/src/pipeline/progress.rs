//! Progress reporting for front-ends.

use super::{PageState, RunSummary};
use log::info;

/// Receives progress events from a conversion run.
///
/// Every method has a no-op default so front-ends only implement what they
/// display.
pub trait ProgressSink {
    /// Called once before the first page, with the number of pages already
    /// completed by earlier runs.
    fn on_start(&mut self, _total_pages: usize, _already_done: usize) {}

    /// Called when a page changes state.
    fn on_page(&mut self, _page: usize, _state: PageState) {}

    /// Called before each chunk of a page is rendered. `chunk` is 1-based.
    fn on_chunk(&mut self, _page: usize, _chunk: usize, _total_chunks: usize) {}

    /// Called once after the last page.
    fn on_finish(&mut self, _summary: &RunSummary) {}
}

/// Sink that ignores every event.
#[derive(Debug, Default)]
pub struct NullSink;

impl ProgressSink for NullSink {}

/// Sink that reports progress through the `log` facade.
#[derive(Debug, Default)]
pub struct LogSink {
    total_pages: usize,
    finished: usize,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn percent(&self) -> f64 {
        if self.total_pages == 0 {
            0.0
        } else {
            self.finished as f64 / self.total_pages as f64 * 100.0
        }
    }
}

impl ProgressSink for LogSink {
    fn on_start(&mut self, total_pages: usize, already_done: usize) {
        self.total_pages = total_pages;
        self.finished = 0;
        if already_done > 0 {
            info!(
                "Resuming: {}/{} page(s) already converted",
                already_done, total_pages
            );
        } else {
            info!("Converting {} page(s)...", total_pages);
        }
    }

    fn on_page(&mut self, page: usize, state: PageState) {
        if state.is_terminal() {
            self.finished += 1;
        }
        info!(
            "Page {}/{}: {} ({:.0}%)",
            page,
            self.total_pages,
            state,
            self.percent()
        );
    }

    fn on_finish(&mut self, summary: &RunSummary) {
        info!(
            "Conversion complete: {} rendered, {} skipped, {} empty",
            summary.rendered, summary.skipped, summary.empty
        );
    }
}
