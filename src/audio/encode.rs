//! WAV file writing.

use std::fs;
use std::path::Path;

use hound::{WavSpec, WavWriter};

use crate::audio::{AudioBuffer, SampleFormat, Samples};
use crate::error::{Error, Result};

/// Write a buffer to a WAV file using its own rate, channels and encoding.
///
/// Parent directories are created as needed. Samples are written exactly as
/// stored, so a decoded buffer round-trips bit for bit.
pub fn encode_wav(buffer: &AudioBuffer, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| Error::OutputDirCreateFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let encoding = buffer.encoding();
    let spec = WavSpec {
        channels: buffer.channels(),
        sample_rate: buffer.sample_rate(),
        bits_per_sample: encoding.bits_per_sample,
        sample_format: match encoding.format {
            SampleFormat::Int => hound::SampleFormat::Int,
            SampleFormat::Float => hound::SampleFormat::Float,
        },
    };

    let mut writer = WavWriter::create(path, spec).map_err(|e| Error::WavWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let written = match buffer.samples() {
        Samples::Int(samples) => samples.iter().try_for_each(|&s| writer.write_sample(s)),
        Samples::Float(samples) => samples.iter().try_for_each(|&s| writer.write_sample(s)),
    };
    written.map_err(|e| Error::WavWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    writer.finalize().map_err(|e| Error::WavWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::audio::{SampleEncoding, decode_wav};
    use tempfile::TempDir;

    #[test]
    fn test_encode_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/deeper/out.wav");
        let buffer =
            AudioBuffer::from_mono_f32(&[0.0, 0.25, -0.25], 8000, SampleEncoding::PCM_16).unwrap();

        encode_wav(&buffer, &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_encode_then_decode_is_lossless() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("float.wav");
        let original = AudioBuffer::new(
            Samples::Float(vec![0.1, -0.2, 0.3, -0.4, 0.5, -0.6]),
            44100,
            3,
            SampleEncoding::FLOAT_32,
        )
        .unwrap();

        encode_wav(&original, &path).unwrap();
        let decoded = decode_wav(&path).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_written_spec_matches_buffer() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("eight.wav");
        let encoding = SampleEncoding {
            bits_per_sample: 8,
            format: SampleFormat::Int,
        };
        let buffer = AudioBuffer::new(Samples::Int(vec![-128, 0, 127, 5]), 11025, 2, encoding)
            .unwrap();

        encode_wav(&buffer, &path).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 11025);
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.bits_per_sample, 8);
    }
}
