//! WAV decoding and container metadata probing.

use crate::audio::{AudioBuffer, SampleEncoding, SampleFormat, Samples};
use crate::error::{Error, Result};
use hound::WavReader;
use std::fs::File;
use std::path::Path;
use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Stream parameters read from the container header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioMetadata {
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: u16,
    /// Bits per sample, when the container declares it.
    pub bits_per_sample: Option<u32>,
}

/// Decode a WAV file, keeping samples in their stored representation.
pub fn decode_wav(path: &Path) -> Result<AudioBuffer> {
    let reader = WavReader::open(path).map_err(|e| Error::WavReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let spec = reader.spec();
    let encoding = SampleEncoding {
        bits_per_sample: spec.bits_per_sample,
        format: match spec.sample_format {
            hound::SampleFormat::Int => SampleFormat::Int,
            hound::SampleFormat::Float => SampleFormat::Float,
        },
    };

    if !encoding.is_supported() {
        return Err(Error::UnsupportedEncoding {
            path: path.to_path_buf(),
            reason: format!(
                "{}-bit {:?} samples",
                encoding.bits_per_sample, encoding.format
            ),
        });
    }

    let samples = match encoding.format {
        SampleFormat::Int => Samples::Int(
            reader
                .into_samples::<i32>()
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| Error::WavReadFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?,
        ),
        SampleFormat::Float => Samples::Float(
            reader
                .into_samples::<f32>()
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| Error::WavReadFailed {
                    path: path.to_path_buf(),
                    source: e,
                })?,
        ),
    };

    // A truncated data chunk can leave a partial frame at the end.
    let channels = usize::from(spec.channels.max(1));
    let samples = match samples {
        Samples::Int(mut s) => {
            s.truncate(s.len() - s.len() % channels);
            Samples::Int(s)
        }
        Samples::Float(mut s) => {
            s.truncate(s.len() - s.len() % channels);
            Samples::Float(s)
        }
    };

    AudioBuffer::new(samples, spec.sample_rate, spec.channels, encoding).map_err(|e| {
        Error::UnsupportedEncoding {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })
}

/// Read sample rate and channel count from the container header.
///
/// This reads the file independently of [`decode_wav`] so the two can be
/// cross-checked.
pub fn probe_metadata(path: &Path) -> Result<AudioMetadata> {
    let file = File::open(path).map_err(|e| Error::MetadataRead {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    let mss = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::MetadataRead {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::MetadataRead {
            path: path.to_path_buf(),
            source: "no audio track".into(),
        })?;

    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| Error::MetadataRead {
            path: path.to_path_buf(),
            source: "missing sample rate".into(),
        })?;

    let channels = track
        .codec_params
        .channels
        .map(symphonia::core::audio::Channels::count)
        .ok_or_else(|| Error::MetadataRead {
            path: path.to_path_buf(),
            source: "missing channel layout".into(),
        })?;

    let channels = u16::try_from(channels).map_err(|e| Error::MetadataRead {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    Ok(AudioMetadata {
        sample_rate,
        channels,
        bits_per_sample: track.codec_params.bits_per_sample,
    })
}
