//! Audio buffers, WAV I/O and signal transforms.

mod buffer;
mod decode;
mod denoise;
mod encode;
mod normalize;

pub use buffer::{AudioBuffer, SampleEncoding, SampleFormat, Samples};
pub use decode::{AudioMetadata, decode_wav, probe_metadata};
pub use denoise::{DenoiseError, Denoiser, LogMmseDenoiser};
pub use encode::encode_wav;
pub use normalize::peak_normalize;
