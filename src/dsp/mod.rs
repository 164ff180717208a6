//! Stateless signal math used by the mixer.
//!
//! Nothing in here allocates or locks, so it is safe to call from the audio
//! callback.

/// Output sample formats and the clamped level domain.
pub mod sample;
/// Waveform formulas and the noise source.
pub mod waveform;

pub use sample::{clamp_level, OutputSample, LEVEL_MAX, LEVEL_MIN};
pub use waveform::{NoiseSource, Waveform};
