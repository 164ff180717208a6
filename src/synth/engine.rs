use std::sync::Arc;

use log::debug;

use crate::{
    dsp::{clamp_level, NoiseSource, OutputSample},
    error::SynthError,
    synth::{state::SynthState, voice::VoiceBank},
    MAX_BLOCK_SIZE,
};

/*
Polyphonic Mixing
=================

For every held voice the mixer walks the buffer sample by sample:

    period  = sample_rate / frequency
    phase_i = (position + i) mod period
    acc[i] += round(amplitude(waveform, phase_i, period) · volume)

and afterwards advances position by N. The position is a whole sample count,
so (position + i) is exact and the float remainder is the only rounding
step: two buffers of L1 and L2 samples produce the same bits as one buffer
of L1 + L2, and chunking a long buffer is invisible.

Normalisation
-------------

The accumulated sum is divided by the number of voices that contributed:

    out[i] = clamp(round(acc[i] / K), -128, 127)

Summing alone would clip harder with every extra key; averaging keeps the
peak level constant, at the price of each note getting quieter as more are
held. With no voices held the buffer is filled with the format's silence
value.

Realtime Rules
--------------

render() runs on the audio thread. The accumulator and the gate snapshot are
allocated once in new(); buffers longer than MAX_BLOCK_SIZE are rendered in
chunks, which the phase law makes seamless.
*/

/// Renders the held voices into output buffers.
///
/// Owns every piece of per-voice state that only the audio thread writes:
/// the sample positions, the gate snapshot and the mix accumulator.
pub struct MixEngine {
    sample_rate: f64,
    voices: Arc<VoiceBank>,
    /// Samples rendered so far per voice, while it was held.
    positions: Vec<u64>,
    /// Gates read once at the start of each render call.
    gates: Vec<bool>,
    accumulator: Vec<i32>,
    noise: NoiseSource,
}

impl MixEngine {
    pub fn new(sample_rate: f64, voices: Arc<VoiceBank>, seed: u64) -> Result<Self, SynthError> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(SynthError::InvalidSampleRate(sample_rate));
        }
        if voices.is_empty() {
            return Err(SynthError::EmptyPitchTable);
        }

        let count = voices.len();
        debug!("mix engine: {count} voices at {sample_rate} Hz, block {MAX_BLOCK_SIZE}");

        Ok(Self {
            sample_rate,
            voices,
            positions: vec![0; count],
            gates: vec![false; count],
            accumulator: vec![0; MAX_BLOCK_SIZE],
            noise: NoiseSource::new(seed),
        })
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn voice_count(&self) -> usize {
        self.positions.len()
    }

    pub fn voices(&self) -> &Arc<VoiceBank> {
        &self.voices
    }

    /// Phase the voice will resume from on the next render, in `[0, period)`.
    ///
    /// `None` for an unknown id or a voice that has no pitch.
    pub fn phase(&self, id: usize) -> Option<f64> {
        let position = *self.positions.get(id)?;
        let period = self.period(id)?;
        Some(position as f64 % period)
    }

    pub fn reset_phases(&mut self) {
        self.positions.fill(0);
    }

    fn period(&self, id: usize) -> Option<f64> {
        let period = self.sample_rate / self.voices.get(id)?.frequency();
        (period.is_finite() && period > 0.0).then_some(period)
    }

    /// Fill `out` with the mix of every held voice and return how many voices
    /// contributed.
    ///
    /// Never fails: unpitched voices are skipped, out-of-range levels are
    /// clamped, and an empty buffer is a no-op.
    pub fn render<S: OutputSample>(&mut self, out: &mut [S], state: SynthState) -> usize {
        if out.is_empty() {
            return 0;
        }

        for (gate, voice) in self.gates.iter_mut().zip(self.voices.iter()) {
            *gate = voice.is_on() && voice.is_pitched();
        }

        let mut active = 0;
        for chunk in out.chunks_mut(MAX_BLOCK_SIZE) {
            active = self.render_chunk(chunk, state);
        }
        active
    }

    fn render_chunk<S: OutputSample>(&mut self, out: &mut [S], state: SynthState) -> usize {
        let Self {
            sample_rate,
            voices,
            positions,
            gates,
            accumulator,
            noise,
        } = self;

        let len = out.len();
        let acc = &mut accumulator[..len];
        acc.fill(0);

        let volume = state.volume as f64;
        let waveform = state.waveform;
        let mut active = 0usize;

        let held = voices.iter().zip(positions.iter_mut()).zip(gates.iter());
        for ((voice, position), &gate) in held {
            if !gate {
                continue;
            }
            let period = *sample_rate / voice.frequency();
            if !(period.is_finite() && period > 0.0) {
                continue;
            }

            let start = *position;
            for (i, slot) in acc.iter_mut().enumerate() {
                let p = (start + i as u64) as f64 % period;
                let amplitude = waveform.amplitude(p, period, noise);
                *slot += (amplitude * volume).round() as i32;
            }
            *position = start + len as u64;
            active += 1;
        }

        if active == 0 {
            out.fill(S::SILENCE);
            return 0;
        }

        let divisor = active as f64;
        for (o, &sum) in out.iter_mut().zip(acc.iter()) {
            let level = (sum as f64 / divisor).round() as i32;
            *o = S::from_level(clamp_level(level));
        }
        active
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsp::Waveform;
    use crate::synth::pitch::PitchTable;

    const SR: f64 = 44_100.0;

    fn engine(frequencies: Vec<f64>) -> (Arc<VoiceBank>, MixEngine) {
        let table = PitchTable::from_frequencies(frequencies).unwrap();
        let bank = Arc::new(VoiceBank::new(&table));
        let engine = MixEngine::new(SR, Arc::clone(&bank), 1).unwrap();
        (bank, engine)
    }

    /// Contribution of a single voice, computed straight from the formulas.
    fn contribution(waveform: Waveform, freq: f64, volume: u8, index: usize) -> i32 {
        let period = SR / freq;
        let p = (index as f64) % period;
        (waveform.shape(p, period).unwrap() * volume as f64).round() as i32
    }

    #[test]
    fn rejects_invalid_setup() {
        let table = PitchTable::from_frequencies(vec![440.0]).unwrap();
        let bank = Arc::new(VoiceBank::new(&table));
        assert_eq!(
            MixEngine::new(0.0, Arc::clone(&bank), 0).err(),
            Some(SynthError::InvalidSampleRate(0.0))
        );
        assert!(MixEngine::new(f64::INFINITY, bank, 0).is_err());
    }

    #[test]
    fn silence_without_held_voices() {
        let (_bank, mut engine) = engine(vec![440.0, 880.0]);
        let state = SynthState::new(Waveform::Saw, 100);

        let mut signed = [7i8; 32];
        assert_eq!(engine.render(&mut signed, state), 0);
        assert!(signed.iter().all(|&s| s == 0));

        let mut unsigned = [7u8; 32];
        engine.render(&mut unsigned, state);
        assert!(unsigned.iter().all(|&s| s == 128));
    }

    #[test]
    fn empty_buffer_is_a_no_op() {
        let (bank, mut engine) = engine(vec![440.0]);
        bank.get(0).unwrap().set_on(true);
        let mut out: [i8; 0] = [];
        assert_eq!(engine.render(&mut out, SynthState::default()), 0);
        assert_eq!(engine.phase(0), Some(0.0));
    }

    #[test]
    fn unpitched_voice_is_skipped() {
        let (bank, mut engine) = engine(vec![0.0, -20.0, 441.0]);
        for voice in bank.iter() {
            voice.set_on(true);
        }
        let state = SynthState::new(Waveform::Square, 20);
        let mut out = [0i8; 16];
        assert_eq!(engine.render(&mut out, state), 1);
        // only the 441 Hz voice (period 100) contributes, undivided
        assert!(out.iter().all(|&s| s == -20));
    }

    #[test]
    fn square_432_switches_at_half_period() {
        let (bank, mut engine) = engine(vec![432.0]);
        bank.get(0).unwrap().set_on(true);
        let state = SynthState::new(Waveform::Square, 10);

        let mut first = [0i8; 8];
        assert_eq!(engine.render(&mut first, state), 1);
        assert_eq!(first, [-10; 8]);

        engine.reset_phases();
        let mut long = [0i8; 110];
        engine.render(&mut long, state);
        // period = 44100 / 432 ≈ 102.08, half ≈ 51.04
        assert!(long[..52].iter().all(|&s| s == -10));
        assert!(long[52..103].iter().all(|&s| s == 10));
        assert!(long[103..].iter().all(|&s| s == -10));
    }

    #[test]
    fn phase_continues_across_buffers() {
        let state = SynthState::new(Waveform::Sine, 100);

        let (bank, mut whole) = engine(vec![432.0]);
        bank.get(0).unwrap().set_on(true);
        let mut expected = [0i8; 300];
        whole.render(&mut expected, state);

        let (bank, mut split) = engine(vec![432.0]);
        bank.get(0).unwrap().set_on(true);
        let mut actual = [0i8; 300];
        let (a, rest) = actual.split_at_mut(37);
        let (b, c) = rest.split_at_mut(128);
        split.render(a, state);
        split.render(b, state);
        split.render(c, state);

        assert_eq!(actual, expected);
    }

    #[test]
    fn phase_is_stored_for_next_sample() {
        let (bank, mut engine) = engine(vec![441.0]);
        bank.get(0).unwrap().set_on(true);
        let mut out = [0i8; 130];
        engine.render(&mut out, SynthState::default());
        assert_eq!(engine.phase(0), Some(30.0));
    }

    #[test]
    fn released_voice_keeps_its_phase() {
        let (bank, mut engine) = engine(vec![441.0]);
        let voice = bank.get(0).unwrap();
        voice.set_on(true);
        let mut out = [0i8; 40];
        engine.render(&mut out, SynthState::default());
        voice.set_on(false);
        engine.render(&mut out, SynthState::default());
        assert_eq!(engine.phase(0), Some(40.0));
    }

    #[test]
    fn mixing_averages_over_active_voices() {
        let freqs = [441.0, 630.0, 1050.0];
        let (bank, mut engine) = engine(freqs.to_vec());
        for voice in bank.iter() {
            voice.set_on(true);
        }
        let state = SynthState::new(Waveform::Saw, 90);
        let mut out = [0i16; 256];
        assert_eq!(engine.render(&mut out, state), 3);

        for (i, &sample) in out.iter().enumerate() {
            let sum: i32 = freqs
                .iter()
                .map(|&f| contribution(Waveform::Saw, f, 90, i))
                .sum();
            let level = clamp_level((sum as f64 / 3.0).round() as i32);
            assert_eq!(sample, i16::from_level(level), "sample {i}");
        }
    }

    #[test]
    fn noise_saturates_instead_of_wrapping() {
        let (bank, mut engine) = engine(vec![441.0]);
        bank.get(0).unwrap().set_on(true);
        let state = SynthState::new(Waveform::Noise, 127);
        let mut out = [0i8; 512];
        engine.render(&mut out, state);
        // any non-zero noise value reaches ±127 after scaling
        assert!(out.iter().all(|&s| s <= -127 || s == 0 || s == 127));
        assert!(out.iter().any(|&s| s == -128));
        assert!(out.iter().any(|&s| s == 127));
    }

    #[test]
    fn noise_still_advances_phase() {
        let (bank, mut engine) = engine(vec![441.0]);
        bank.get(0).unwrap().set_on(true);

        // period 100: 130 samples of noise leave the cycle at 30
        let mut out = [0i8; 130];
        engine.render(&mut out, SynthState::new(Waveform::Noise, 50));
        assert_eq!(engine.phase(0), Some(30.0));

        let mut next = [0i8; 4];
        engine.render(&mut next, SynthState::new(Waveform::Sine, 100));
        for (i, &sample) in next.iter().enumerate() {
            let expected = contribution(Waveform::Sine, 441.0, 100, 130 + i);
            assert_eq!(sample as i32, expected, "sample {i}");
        }
    }

    #[test]
    fn split_points_never_move_a_breakpoint() {
        // 3605 Hz square split at 37 has a sample within rounding of the half period
        for kind in [Waveform::Square, Waveform::Saw, Waveform::Triangle, Waveform::Sine] {
            for freq in [3605.0, 432.0, 1234.5, 997.0] {
                for split_at in [1, 37, 64, 255] {
                    let state = SynthState::new(kind, 127);

                    let (bank, mut whole) = engine(vec![freq]);
                    bank.get(0).unwrap().set_on(true);
                    let mut expected = [0i8; 512];
                    whole.render(&mut expected, state);

                    let (bank, mut split) = engine(vec![freq]);
                    bank.get(0).unwrap().set_on(true);
                    let mut actual = [0i8; 512];
                    let (a, b) = actual.split_at_mut(split_at);
                    split.render(a, state);
                    split.render(b, state);

                    assert_eq!(actual, expected, "{kind} at {freq} Hz split at {split_at}");
                }
            }
        }
    }

    #[test]
    fn long_buffers_render_in_chunks() {
        let state = SynthState::new(Waveform::Triangle, 64);

        let (bank, mut chunked) = engine(vec![300.0]);
        bank.get(0).unwrap().set_on(true);
        let mut long = vec![0i8; MAX_BLOCK_SIZE * 2 + 17];
        assert_eq!(chunked.render(&mut long, state), 1);

        for (i, &sample) in long.iter().enumerate() {
            let expected = contribution(Waveform::Triangle, 300.0, 64, i);
            assert_eq!(sample as i32, expected, "sample {i}");
        }
    }

    #[test]
    fn waveform_switch_keeps_phase() {
        let (bank, mut engine) = engine(vec![441.0]);
        bank.get(0).unwrap().set_on(true);
        let mut out = [0i8; 25];
        engine.render(&mut out, SynthState::new(Waveform::Square, 10));
        engine.render(&mut out, SynthState::new(Waveform::Sine, 100));
        // second buffer starts a quarter period in: sine peak
        assert_eq!(out[0], 100);
    }
}
