//! In-memory PCM audio.

use crate::error::{Error, Result};

/// Numeric representation of samples on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    /// Signed integer PCM (8, 16, 24 or 32 bit).
    Int,
    /// IEEE float PCM (32 bit).
    Float,
}

/// Bit depth and numeric format of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleEncoding {
    /// Bits per sample.
    pub bits_per_sample: u16,
    /// Integer or float.
    pub format: SampleFormat,
}

impl SampleEncoding {
    /// 16-bit signed integer PCM.
    pub const PCM_16: Self = Self {
        bits_per_sample: 16,
        format: SampleFormat::Int,
    };

    /// 32-bit float PCM.
    pub const FLOAT_32: Self = Self {
        bits_per_sample: 32,
        format: SampleFormat::Float,
    };

    /// Whether hound can read and write this encoding.
    pub const fn is_supported(self) -> bool {
        match self.format {
            SampleFormat::Int => matches!(self.bits_per_sample, 8 | 16 | 24 | 32),
            SampleFormat::Float => self.bits_per_sample == 32,
        }
    }

    /// Bytes per sample.
    pub const fn sample_width(self) -> u16 {
        self.bits_per_sample.div_ceil(8)
    }

    /// Magnitude corresponding to 1.0 in the float domain.
    pub fn full_scale(self) -> f64 {
        match self.format {
            SampleFormat::Int => f64::from(1_u32 << (self.bits_per_sample - 1)),
            SampleFormat::Float => 1.0,
        }
    }
}

/// Interleaved sample storage.
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    /// Integer samples, widened to `i32`.
    Int(Vec<i32>),
    /// Float samples.
    Float(Vec<f32>),
}

impl Samples {
    /// Number of interleaved samples.
    pub fn len(&self) -> usize {
        match self {
            Self::Int(s) => s.len(),
            Self::Float(s) => s.len(),
        }
    }

    /// Whether there are no samples.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sample at interleaved index `i`, scaled to [-1.0, 1.0].
    fn get_f64(&self, i: usize, full_scale: f64) -> f64 {
        match self {
            Self::Int(s) => f64::from(s[i]) / full_scale,
            Self::Float(s) => f64::from(s[i]),
        }
    }

    /// Copy of the interleaved range `[start, end)`.
    fn slice(&self, start: usize, end: usize) -> Self {
        match self {
            Self::Int(s) => Self::Int(s[start..end].to_vec()),
            Self::Float(s) => Self::Float(s[start..end].to_vec()),
        }
    }
}

/// Decoded PCM audio with its format metadata.
///
/// Every transform returns a new buffer; a buffer is never modified after
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    samples: Samples,
    sample_rate: u32,
    channels: u16,
    encoding: SampleEncoding,
}

impl AudioBuffer {
    /// Build a buffer, checking that the parts agree with each other.
    pub fn new(
        samples: Samples,
        sample_rate: u32,
        channels: u16,
        encoding: SampleEncoding,
    ) -> Result<Self> {
        if sample_rate == 0 {
            return Err(Error::InvalidBuffer {
                reason: "sample rate must be positive".to_string(),
            });
        }
        if channels == 0 {
            return Err(Error::InvalidBuffer {
                reason: "channel count must be positive".to_string(),
            });
        }
        if !encoding.is_supported() {
            return Err(Error::InvalidBuffer {
                reason: format!(
                    "{}-bit {:?} samples are not supported",
                    encoding.bits_per_sample, encoding.format
                ),
            });
        }
        let format_matches = matches!(
            (&samples, encoding.format),
            (Samples::Int(_), SampleFormat::Int) | (Samples::Float(_), SampleFormat::Float)
        );
        if !format_matches {
            return Err(Error::InvalidBuffer {
                reason: format!("sample storage does not match {:?} encoding", encoding.format),
            });
        }
        if samples.len() % usize::from(channels) != 0 {
            return Err(Error::InvalidBuffer {
                reason: format!(
                    "{} samples cannot be split into frames of {channels} channels",
                    samples.len()
                ),
            });
        }

        Ok(Self {
            samples,
            sample_rate,
            channels,
            encoding,
        })
    }

    /// Build a mono buffer from float samples in [-1.0, 1.0], quantizing to
    /// `encoding`.
    pub fn from_mono_f32(samples: &[f32], sample_rate: u32, encoding: SampleEncoding) -> Result<Self> {
        let stored = match encoding.format {
            SampleFormat::Float => Samples::Float(samples.to_vec()),
            SampleFormat::Int => {
                let full_scale = encoding.full_scale();
                let max = full_scale - 1.0;
                #[allow(clippy::cast_possible_truncation)]
                let quantized = samples
                    .iter()
                    .map(|&s| (f64::from(s) * full_scale).round().clamp(-full_scale, max) as i32)
                    .collect();
                Samples::Int(quantized)
            }
        };
        Self::new(stored, sample_rate, 1, encoding)
    }

    /// Interleaved samples.
    pub const fn samples(&self) -> &Samples {
        &self.samples
    }

    /// Sample rate in Hz.
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel count.
    pub const fn channels(&self) -> u16 {
        self.channels
    }

    /// Bit depth and format.
    pub const fn encoding(&self) -> SampleEncoding {
        self.encoding
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels)
    }

    /// Duration in seconds.
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_secs(&self) -> f64 {
        self.frames() as f64 / f64::from(self.sample_rate)
    }

    /// One channel as floats in [-1.0, 1.0].
    #[allow(clippy::cast_possible_truncation)]
    pub fn channel_f32(&self, channel: u16) -> Vec<f32> {
        let channels = usize::from(self.channels);
        let full_scale = self.encoding.full_scale();
        let channel = usize::from(channel.min(self.channels - 1));
        (0..self.frames())
            .map(|frame| {
                self.samples
                    .get_f64(frame * channels + channel, full_scale) as f32
            })
            .collect()
    }

    /// Average of all channels as floats in [-1.0, 1.0].
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn to_mono_f32(&self) -> Vec<f32> {
        if self.channels == 1 {
            return self.channel_f32(0);
        }

        let channels = usize::from(self.channels);
        let full_scale = self.encoding.full_scale();
        (0..self.frames())
            .map(|frame| {
                let base = frame * channels;
                let sum: f64 = (0..channels)
                    .map(|ch| self.samples.get_f64(base + ch, full_scale))
                    .sum();
                (sum / channels as f64) as f32
            })
            .collect()
    }

    /// Frame index nearest to `secs`, clamped to the buffer.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn frame_at(&self, secs: f64) -> usize {
        let frame = (secs.max(0.0) * f64::from(self.sample_rate)).round();
        (frame as usize).min(self.frames())
    }

    /// Copy of the audio between `start_secs` and `end_secs`.
    ///
    /// Channel layout, rate and encoding are kept exactly; only the bounds
    /// change. Bounds past the end are clamped.
    pub fn time_slice(&self, start_secs: f64, end_secs: f64) -> Result<Self> {
        if !(start_secs.is_finite() && end_secs.is_finite()) || end_secs <= start_secs {
            return Err(Error::InvalidTimeRange {
                start: start_secs,
                end: end_secs,
            });
        }

        let channels = usize::from(self.channels);
        let start = self.frame_at(start_secs);
        let end = self.frame_at(end_secs).max(start);

        Ok(Self {
            samples: self.samples.slice(start * channels, end * channels),
            sample_rate: self.sample_rate,
            channels: self.channels,
            encoding: self.encoding,
        })
    }
}
