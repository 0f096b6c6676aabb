//! Page-by-page conversion with checkpoint/resume support.

mod progress;

pub use progress::{LogSink, NullSink, ProgressSink};

use crate::audio;
use crate::checkpoint::{self, CheckpointRecord, CHECKPOINT_FILE};
use crate::error::{ConvertError, Result};
use crate::text::{chunk_page, TextChunk, DEFAULT_MAX_CHARS};
use crate::tts::SynthesisClient;
use log::{debug, error, info, warn};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Lifecycle of a single page within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    /// Not yet converted
    Pending,
    /// Already completed by an earlier run
    Skipped,
    /// No speakable text; completed without synthesis
    Empty,
    /// Chunks are being rendered
    Rendering,
    /// Audio written and checkpointed
    Done,
    /// Conversion failed; the page stays pending for the next run
    Failed,
}

impl PageState {
    /// Whether the page has reached a final state for this run.
    pub fn is_terminal(self) -> bool {
        !matches!(self, PageState::Pending | PageState::Rendering)
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PageState::Pending => "pending",
            PageState::Skipped => "skipped",
            PageState::Empty => "empty",
            PageState::Rendering => "rendering",
            PageState::Done => "done",
            PageState::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Counts of what a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub total_pages: usize,
    /// Pages rendered to audio in this run
    pub rendered: usize,
    /// Pages completed by earlier runs
    pub skipped: usize,
    /// Pages without speakable text
    pub empty: usize,
}

/// Where and how a document is converted.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Output folder for WAV files and the checkpoint
    pub output_dir: PathBuf,
    /// File name prefix for page outputs
    pub page_prefix: String,
    /// Max characters per TTS chunk
    pub max_chars: usize,
    /// Checkpoint file name inside `output_dir`
    pub checkpoint_file: String,
}

impl PipelineConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            page_prefix: "page".to_string(),
            max_chars: DEFAULT_MAX_CHARS,
            checkpoint_file: CHECKPOINT_FILE.to_string(),
        }
    }

    pub fn with_page_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.page_prefix = prefix.into();
        self
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars.max(1);
        self
    }

    /// Path of the checkpoint file.
    pub fn checkpoint_path(&self) -> PathBuf {
        self.output_dir.join(&self.checkpoint_file)
    }

    /// Output path for a page, e.g. `page_0007.wav`.
    pub fn page_output_path(&self, page: usize) -> PathBuf {
        self.output_dir
            .join(format!("{}_{:04}.wav", self.page_prefix, page))
    }

    /// Transient path for one chunk of a page, e.g. `page_0007_part_02.wav`.
    pub fn chunk_path(&self, page: usize, chunk: usize) -> PathBuf {
        self.output_dir
            .join(format!("{}_{:04}_part_{:02}.wav", self.page_prefix, page, chunk))
    }
}

/// Drives a document through chunking, synthesis and assembly, one page at a
/// time, persisting progress after every page.
pub struct ConversionPipeline {
    config: PipelineConfig,
    client: SynthesisClient,
}

impl ConversionPipeline {
    pub fn new(config: PipelineConfig, client: SynthesisClient) -> Self {
        Self { config, client }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Per-page state according to the checkpoint, without converting.
    pub fn status(&self, pages: &[String]) -> Vec<PageState> {
        page_status(&self.config, pages)
    }

    /// Convert every page not yet recorded in the checkpoint.
    ///
    /// Pages are processed strictly in order. The first failing page stops
    /// the run; its error names the page, and the checkpoint keeps whatever
    /// was completed before it.
    pub async fn run(
        &mut self,
        pages: &[String],
        sink: &mut dyn ProgressSink,
    ) -> Result<RunSummary> {
        if pages.is_empty() {
            error!("No extractable text found in document.");
            return Err(ConvertError::ExtractionEmpty);
        }

        fs::create_dir_all(&self.config.output_dir)?;
        let checkpoint_path = self.config.checkpoint_path();
        let mut record = load_record(&self.config, pages);

        let already_done = (1..=pages.len()).filter(|p| record.contains(*p)).count();
        sink.on_start(pages.len(), already_done);

        let mut summary = RunSummary {
            total_pages: pages.len(),
            ..RunSummary::default()
        };

        for (i, raw) in pages.iter().enumerate() {
            let page = i + 1;

            if record.contains(page) {
                info!("Skipping page {} (already completed).", page);
                summary.skipped += 1;
                sink.on_page(page, PageState::Skipped);
                continue;
            }

            let outcome = match self.process_page(page, raw, sink).await {
                Ok(state) => {
                    record.mark_completed(page);
                    checkpoint::save(&checkpoint_path, &record).map(|()| state)
                }
                Err(e) => Err(e),
            };

            match outcome {
                Ok(state) => {
                    match state {
                        PageState::Empty => summary.empty += 1,
                        _ => summary.rendered += 1,
                    }
                    sink.on_page(page, state);
                }
                Err(e) => {
                    error!("Page {} failed: {}", page, e);
                    sink.on_page(page, PageState::Failed);
                    return Err(ConvertError::Page {
                        page,
                        source: Box::new(e),
                    });
                }
            }
        }

        info!(
            "All done! WAV files saved in: {}",
            self.config.output_dir.display()
        );
        sink.on_finish(&summary);
        Ok(summary)
    }

    /// Render one page to its output file.
    ///
    /// Returns `Empty` when the page has nothing to say, `Done` once the page
    /// output is in place.
    async fn process_page(
        &mut self,
        page: usize,
        raw: &str,
        sink: &mut dyn ProgressSink,
    ) -> Result<PageState> {
        let chunks = chunk_page(page, raw, self.config.max_chars);
        if chunks.is_empty() {
            info!("Page {} has no speakable text; marking done.", page);
            return Ok(PageState::Empty);
        }

        info!("Page {}: {} chunk(s).", page, chunks.len());
        sink.on_page(page, PageState::Rendering);

        let mut parts = Vec::with_capacity(chunks.len());
        let result = self.render_page(&chunks, &mut parts, sink).await;

        // Chunk files are transient whether or not the page succeeded
        for part in &parts {
            if part.exists() {
                if let Err(e) = fs::remove_file(part) {
                    warn!("Could not remove {}: {}", part.display(), e);
                }
            }
        }

        result.map(|()| PageState::Done)
    }

    async fn render_page(
        &mut self,
        chunks: &[TextChunk],
        parts: &mut Vec<PathBuf>,
        sink: &mut dyn ProgressSink,
    ) -> Result<()> {
        let page = chunks[0].page;
        let page_path = self.config.page_output_path(page);

        for chunk in chunks {
            let part = self.config.chunk_path(chunk.page, chunk.index);
            parts.push(part.clone());
            sink.on_chunk(chunk.page, chunk.index, chunks.len());
            debug!(
                "Rendering page {} part {}/{} ({} chars)",
                chunk.page,
                chunk.index,
                chunks.len(),
                chunk.text.chars().count()
            );
            self.client.render_to_file(&chunk.text, &part).await?;
        }

        if parts.len() == 1 {
            info!("Rendering page {} -> {}", page, file_name(&page_path));
            fs::rename(&parts[0], &page_path)?;
        } else {
            info!(
                "Merging {} parts of page {} -> {}",
                parts.len(),
                page,
                file_name(&page_path)
            );
            let refs: Vec<&Path> = parts.iter().map(PathBuf::as_path).collect();
            audio::concatenate(&refs, &page_path)?;
        }

        Ok(())
    }
}

/// Load the checkpoint for `pages`, discarding one written for another
/// document.
fn load_record(config: &PipelineConfig, pages: &[String]) -> CheckpointRecord {
    let document = checkpoint::compute_document_hash(pages);
    let mut record = checkpoint::load(&config.checkpoint_path());

    if !record.matches_document(&document) {
        warn!(
            "Checkpoint {} belongs to a different document; starting fresh.",
            config.checkpoint_path().display()
        );
        return CheckpointRecord::new(document);
    }

    record.document = Some(document);
    record
}

/// Per-page state of a document according to its checkpoint.
///
/// Completed pages report `Done`, everything else `Pending`.
pub fn page_status(config: &PipelineConfig, pages: &[String]) -> Vec<PageState> {
    let record = load_record(config, pages);
    (1..=pages.len())
        .map(|page| {
            if record.contains(page) {
                PageState::Done
            } else {
                PageState::Pending
            }
        })
        .collect()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
