use thiserror::Error;

/// Errors raised while setting up or driving the synth from the control side.
///
/// None of these can come out of [`MixEngine::render`](crate::synth::MixEngine::render);
/// the render path handles bad input by skipping or clamping.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SynthError {
    #[error("voice {id} does not exist (table has {voices} voices)")]
    UnknownVoice { id: usize, voices: usize },

    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f64),

    #[error("frequency must be positive and finite, got {0} Hz")]
    InvalidFrequency(f64),

    #[error("pitch table has no voices")]
    EmptyPitchTable,

    #[error("volume must be within 1..=127, got {0}")]
    InvalidVolume(u8),
}
