//! Text processing for TTS: normalization and chunking.

pub mod chunker;
mod normalizer;

pub use chunker::{chunk_page, split, DEFAULT_MAX_CHARS};
pub use normalizer::normalize;

/// A chunk of page text ready for TTS processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// The page this chunk belongs to (1-based)
    pub page: usize,
    /// The chunk index within the page (1-based)
    pub index: usize,
    /// The text content
    pub text: String,
}

impl TextChunk {
    /// Create a new text chunk.
    pub fn new(page: usize, index: usize, text: String) -> Self {
        Self { page, index, text }
    }
}
