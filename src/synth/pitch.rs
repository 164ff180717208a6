use log::debug;

use crate::error::SynthError;

/*
Pitch Table
===========

One entry per playable voice. Voice ids are plain indices into the table.

Equal temperament: each semitone multiplies the frequency by 2^(1/12), so
twelve steps double it (one octave):

    freq(n) = base · 2^(n / 12)

With base = 261.63 Hz (C4):

    id   0      1      2      ...   9      ...   12
         C4     C#4    D4           A4           C5
         261.6  277.2  293.7        440.0        523.3

White/black split: within each octave starting on C, the semitones
1, 3, 6, 8 and 10 are the black keys (C#, D#, F#, G#, A#).
*/

/// Middle C at A4 = 440 Hz tuning.
pub const MIDDLE_C_HZ: f64 = 261.625_565_300_598_6;

const BLACK_KEYS: [bool; 12] = [
    false, true, false, true, false, false, true, false, true, false, true, false,
];

/// Key colour of a voice on the on-screen keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyColor {
    White,
    Black,
}

/// Static voice-id → frequency mapping, built once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct PitchTable {
    frequencies: Vec<f64>,
}

impl PitchTable {
    /// Build a table from an explicit frequency list.
    ///
    /// Entries that are not positive and finite are kept (so ids stay stable)
    /// but will never sound.
    pub fn from_frequencies(frequencies: Vec<f64>) -> Result<Self, SynthError> {
        if frequencies.is_empty() {
            return Err(SynthError::EmptyPitchTable);
        }
        debug!("pitch table: {} voices from explicit list", frequencies.len());
        Ok(Self { frequencies })
    }

    /// `count` chromatic voices starting at `base_hz`.
    pub fn equal_tempered(base_hz: f64, count: usize) -> Result<Self, SynthError> {
        if !(base_hz.is_finite() && base_hz > 0.0) {
            return Err(SynthError::InvalidFrequency(base_hz));
        }
        if count == 0 {
            return Err(SynthError::EmptyPitchTable);
        }

        let frequencies: Vec<f64> = (0..count)
            .map(|n| semitones_above(base_hz, n as f64))
            .collect();
        debug!(
            "pitch table: {count} voices, {:.2} Hz .. {:.2} Hz",
            frequencies[0],
            frequencies[count - 1]
        );
        Ok(Self { frequencies })
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn frequency(&self, id: usize) -> Option<f64> {
        self.frequencies.get(id).copied()
    }

    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }

    /// Key colour assuming voice 0 is a C.
    pub fn key_color(&self, id: usize) -> KeyColor {
        if BLACK_KEYS[id % 12] {
            KeyColor::Black
        } else {
            KeyColor::White
        }
    }
}

/// Frequency `semitones` above (or below, if negative) `base_hz`.
#[inline]
pub fn semitones_above(base_hz: f64, semitones: f64) -> f64 {
    base_hz * 2.0_f64.powf(semitones / 12.0)
}
