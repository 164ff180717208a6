use std::sync::atomic::{AtomicBool, Ordering};

use crate::synth::pitch::PitchTable;

/// One playable pitch as seen from both threads.
///
/// Only the gate is shared. The phase accumulator lives in the
/// [`MixEngine`](crate::synth::MixEngine) because the audio thread is its only
/// writer.
#[derive(Debug)]
pub struct Voice {
    frequency: f64,
    on: AtomicBool,
}

impl Voice {
    pub fn new(frequency: f64) -> Self {
        Self {
            frequency,
            on: AtomicBool::new(false),
        }
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Whether the voice can make sound at all.
    pub fn is_pitched(&self) -> bool {
        self.frequency.is_finite() && self.frequency > 0.0
    }

    #[inline]
    pub fn is_on(&self) -> bool {
        self.on.load(Ordering::Acquire)
    }

    /// Returns the previous gate state.
    #[inline]
    pub fn set_on(&self, on: bool) -> bool {
        self.on.swap(on, Ordering::AcqRel)
    }

    /// Flip the gate in one atomic step and return the new state.
    #[inline]
    pub fn toggle(&self) -> bool {
        !self.on.fetch_xor(true, Ordering::AcqRel)
    }
}

/// Fixed-size set of voices shared between the input side and the renderer.
///
/// Capacity never changes after construction.
#[derive(Debug)]
pub struct VoiceBank {
    voices: Box<[Voice]>,
}

impl VoiceBank {
    pub fn new(table: &PitchTable) -> Self {
        Self {
            voices: table.frequencies().iter().map(|&f| Voice::new(f)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.voices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&Voice> {
        self.voices.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Voice> {
        self.voices.iter()
    }

    /// Number of voices whose gate is currently on.
    pub fn held(&self) -> usize {
        self.voices.iter().filter(|v| v.is_on()).count()
    }

    pub fn release_all(&self) {
        for voice in self.voices.iter() {
            voice.set_on(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gates_start_off_and_toggle() {
        let table = PitchTable::from_frequencies(vec![220.0, 440.0]).unwrap();
        let bank = VoiceBank::new(&table);
        assert_eq!(bank.held(), 0);

        assert!(!bank.get(1).unwrap().set_on(true));
        assert!(bank.get(1).unwrap().is_on());
        assert_eq!(bank.held(), 1);

        bank.release_all();
        assert_eq!(bank.held(), 0);
    }

    #[test]
    fn toggle_returns_new_state() {
        let voice = Voice::new(440.0);
        assert!(voice.toggle());
        assert!(voice.is_on());
        assert!(!voice.toggle());
        assert!(!voice.is_on());
    }

    #[test]
    fn unpitched_voices_are_flagged() {
        let table = PitchTable::from_frequencies(vec![0.0, -3.0, f64::NAN, 1.0]).unwrap();
        let bank = VoiceBank::new(&table);
        let pitched: Vec<bool> = bank.iter().map(Voice::is_pitched).collect();
        assert_eq!(pitched, vec![false, false, false, true]);
    }
}
