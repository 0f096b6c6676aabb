//! WAV format descriptors.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// How samples are encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleFormat {
    /// Integer PCM
    Int,
    /// IEEE float
    Float,
}

impl From<hound::SampleFormat> for SampleFormat {
    fn from(format: hound::SampleFormat) -> Self {
        match format {
            hound::SampleFormat::Int => SampleFormat::Int,
            hound::SampleFormat::Float => SampleFormat::Float,
        }
    }
}

impl From<SampleFormat> for hound::SampleFormat {
    fn from(format: SampleFormat) -> Self {
        match format {
            SampleFormat::Int => hound::SampleFormat::Int,
            SampleFormat::Float => hound::SampleFormat::Float,
        }
    }
}

/// Format descriptor of an uncompressed audio file.
///
/// Two segments can be concatenated only if their descriptors are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    pub sample_format: SampleFormat,
}

impl From<hound::WavSpec> for AudioFormat {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bits_per_sample: spec.bits_per_sample,
            sample_format: spec.sample_format.into(),
        }
    }
}

impl From<AudioFormat> for hound::WavSpec {
    fn from(format: AudioFormat) -> Self {
        hound::WavSpec {
            channels: format.channels,
            sample_rate: format.sample_rate,
            bits_per_sample: format.bits_per_sample,
            sample_format: format.sample_format.into(),
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let encoding = match self.sample_format {
            SampleFormat::Int => "int",
            SampleFormat::Float => "float",
        };
        write!(
            f,
            "{} Hz, {} ch, {}-bit {}",
            self.sample_rate, self.channels, self.bits_per_sample, encoding
        )
    }
}

/// A rendered audio file together with its format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSegment {
    pub path: PathBuf,
    pub format: AudioFormat,
    /// Number of frames (samples per channel)
    pub frames: u32,
}

impl AudioSegment {
    /// Duration in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frames as f64 / self.format.sample_rate as f64
    }
}

/// Read the header of a WAV file.
pub fn read_segment(path: &Path) -> Result<AudioSegment> {
    let reader = hound::WavReader::open(path)?;
    Ok(AudioSegment {
        path: path.to_path_buf(),
        format: reader.spec().into(),
        frames: reader.duration(),
    })
}
