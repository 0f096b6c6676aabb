//! Resumable page-to-speech conversion.
//!
//! Turns a document's page texts into one WAV file per page:
//! - Text normalization and sentence-aware chunking
//! - Synthesis with bounded retries and engine re-initialization
//! - Lossless WAV concatenation of per-chunk audio
//! - A checkpoint file so interrupted runs resume where they stopped

pub mod audio;
pub mod checkpoint;
pub mod error;
pub mod pipeline;
pub mod text;
pub mod tts;

pub use audio::{AudioFormat, AudioSegment};
pub use checkpoint::CheckpointRecord;
pub use error::{ConvertError, Result};
pub use pipeline::{
    ConversionPipeline, LogSink, NullSink, PageState, PipelineConfig, ProgressSink, RunSummary,
};
pub use tts::{BackendFactory, RetryPolicy, SynthesisClient, TtsBackend, Voice, VoiceSettings};
