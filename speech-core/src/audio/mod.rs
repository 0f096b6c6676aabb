//! Audio segment handling: format descriptors and lossless WAV concatenation.

pub mod concat;
mod format;

pub use concat::concatenate;
pub use format::{read_segment, AudioFormat, AudioSegment, SampleFormat};
