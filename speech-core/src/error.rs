use std::path::PathBuf;

use thiserror::Error;

use crate::audio::AudioFormat;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("No extractable text found in document")]
    ExtractionEmpty,

    #[error("TTS failed after {attempts} attempt(s) for {}: {message}", path.display())]
    Synthesis {
        path: PathBuf,
        attempts: u32,
        message: String,
    },

    #[error(
        "Mismatched WAV params in part {index} ({}): expected {expected}, found {found}",
        path.display()
    )]
    FormatMismatch {
        index: usize,
        path: PathBuf,
        expected: AudioFormat,
        found: AudioFormat,
    },

    #[error("No parts to concatenate")]
    EmptyConcat,

    #[error("Page {page} failed: {source}")]
    Page {
        page: usize,
        #[source]
        source: Box<ConvertError>,
    },

    #[error("TTS engine error: {0}")]
    Engine(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Could not replace file: {0}")]
    Persist(#[from] tempfile::PersistError),
}

impl ConvertError {
    /// The page a failure belongs to, if it was raised while processing one.
    pub fn page(&self) -> Option<usize> {
        match self {
            ConvertError::Page { page, .. } => Some(*page),
            _ => None,
        }
    }

    /// Strip the page wrapper, if any.
    pub fn root(&self) -> &ConvertError {
        match self {
            ConvertError::Page { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;
