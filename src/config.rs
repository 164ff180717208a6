//! Startup configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::Waveform,
    error::SynthError,
    synth::{
        pitch::{PitchTable, MIDDLE_C_HZ},
        state::{SynthState, DEFAULT_VOLUME, VOLUME_MAX, VOLUME_MIN},
    },
    DEFAULT_SAMPLE_RATE,
};

/// Everything needed to build a synth before the first render.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SynthConfig {
    /// Sample rate negotiated with the audio device, in Hz.
    pub sample_rate: u32,
    /// Frequency of voice 0, in Hz. Voice `n` sits `n` semitones above it.
    pub base_frequency: f64,
    /// Number of chromatic voices.
    pub voices: usize,
    pub waveform: Waveform,
    /// Initial volume, `1..=127`.
    pub volume: u8,
    /// Seed for the noise source.
    pub seed: u64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            base_frequency: MIDDLE_C_HZ,
            voices: 29,
            waveform: Waveform::default(),
            volume: DEFAULT_VOLUME,
            seed: 0x6b65_7973,
        }
    }
}

impl SynthConfig {
    pub fn validate(&self) -> Result<(), SynthError> {
        if self.sample_rate == 0 {
            return Err(SynthError::InvalidSampleRate(0.0));
        }
        if !(self.base_frequency.is_finite() && self.base_frequency > 0.0) {
            return Err(SynthError::InvalidFrequency(self.base_frequency));
        }
        if self.voices == 0 {
            return Err(SynthError::EmptyPitchTable);
        }
        if !(VOLUME_MIN..=VOLUME_MAX).contains(&self.volume) {
            return Err(SynthError::InvalidVolume(self.volume));
        }
        Ok(())
    }

    pub fn pitch_table(&self) -> Result<PitchTable, SynthError> {
        PitchTable::equal_tempered(self.base_frequency, self.voices)
    }

    pub fn initial_state(&self) -> SynthState {
        SynthState::new(self.waveform, self.volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert_eq!(SynthConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_out_of_range_fields() {
        let bad_volume = SynthConfig {
            volume: 0,
            ..SynthConfig::default()
        };
        assert_eq!(bad_volume.validate(), Err(SynthError::InvalidVolume(0)));

        let bad_rate = SynthConfig {
            sample_rate: 0,
            ..SynthConfig::default()
        };
        assert!(bad_rate.validate().is_err());

        let bad_base = SynthConfig {
            base_frequency: -1.0,
            ..SynthConfig::default()
        };
        assert_eq!(bad_base.validate(), Err(SynthError::InvalidFrequency(-1.0)));

        let no_voices = SynthConfig {
            voices: 0,
            ..SynthConfig::default()
        };
        assert_eq!(no_voices.validate(), Err(SynthError::EmptyPitchTable));
    }

    #[test]
    fn split_wires_both_halves() {
        let config = SynthConfig {
            voices: 12,
            waveform: Waveform::Sine,
            volume: 40,
            ..SynthConfig::default()
        };
        let (controller, engine) = crate::split(&config).unwrap();
        assert_eq!(engine.voice_count(), 12);
        assert_eq!(engine.sample_rate(), 44_100.0);
        assert_eq!(controller.snapshot(), SynthState::new(Waveform::Sine, 40));
    }
}
