//! Lossless WAV concatenation.

use super::format::{AudioFormat, AudioSegment, SampleFormat};
use crate::error::{ConvertError, Result};
use hound::{WavReader, WavWriter};
use log::debug;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tempfile::NamedTempFile;

/// Concatenate WAV files that share the same format into `output_path`.
///
/// Every part's header is checked against the first one before anything is
/// written. Samples are copied in input order without resampling, gaps or
/// crossfades. The output is assembled in a temporary sibling file and only
/// renamed into place once complete.
pub fn concatenate(parts: &[&Path], output_path: &Path) -> Result<AudioSegment> {
    if parts.is_empty() {
        return Err(ConvertError::EmptyConcat);
    }

    let mut readers = Vec::with_capacity(parts.len());
    for path in parts {
        readers.push(WavReader::open(path)?);
    }

    let format = AudioFormat::from(readers[0].spec());
    for (index, (reader, path)) in readers.iter().zip(parts).enumerate().skip(1) {
        let found = AudioFormat::from(reader.spec());
        if found != format {
            return Err(ConvertError::FormatMismatch {
                index,
                path: path.to_path_buf(),
                expected: format,
                found,
            });
        }
    }

    let dir = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let tmp = NamedTempFile::new_in(dir)?;
    let mut writer = WavWriter::new(BufWriter::new(tmp.as_file().try_clone()?), format.into())?;

    let mut frames: u32 = 0;
    for reader in &mut readers {
        frames += reader.duration();
        copy_samples(reader, &mut writer, format)?;
    }
    writer.finalize()?;
    tmp.persist(output_path)?;

    debug!(
        "Concatenated {} part(s) into {} ({} frames)",
        parts.len(),
        output_path.display(),
        frames
    );

    Ok(AudioSegment {
        path: output_path.to_path_buf(),
        format,
        frames,
    })
}

/// Copy all samples from one reader to the writer, preserving their bits.
fn copy_samples(
    reader: &mut WavReader<BufReader<File>>,
    writer: &mut WavWriter<BufWriter<File>>,
    format: AudioFormat,
) -> Result<()> {
    match format.sample_format {
        SampleFormat::Float => {
            for sample in reader.samples::<f32>() {
                writer.write_sample(sample?)?;
            }
        }
        SampleFormat::Int => {
            for sample in reader.samples::<i32>() {
                writer.write_sample(sample?)?;
            }
        }
    }
    Ok(())
}
