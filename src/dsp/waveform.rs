use std::f64::consts::TAU;
use std::fmt;
use std::str::FromStr;

use rand::{rngs::SmallRng, Rng, SeedableRng};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
Waveform Shapes
===============

Every voice runs the same phase accumulator. The waveform kind only decides
how a phase position is turned into an amplitude, so switching kinds while a
key is held changes the timbre without restarting the cycle.

Vocabulary
----------

  period      Samples per cycle: sample_rate / frequency.
              At 44.1 kHz, 432 Hz gives 102.083... samples.

  phase       Position inside the current cycle, in samples, [0, period).
              Fractional: the cycle rarely lines up with whole samples.

  amplitude   The unscaled output, -1.0 to +1.0 (noise excepted, see below).
              The mixer multiplies it by the global volume (1..=127).


The Shapes Over One Period
--------------------------

  Square         -1 for the first half, +1 for the second.

                   +1         ┌─────┐
                   -1   ──────┘     └

  Triangle       Four linear segments. The first peak sits at 0.35 of the
                 period, not 0.25, which leans the wave slightly:

                   +1     ╱╲
                    0   ╱    ╲       ╱
                   -1          ╲___╱
                        0  .35 .5 .75 1

  Saw            Linear ramp from -1 to +1, then snap back.

  Sine           sin(2π · phase / period).

  Folded sines   Sine with parts of the cycle zeroed or mirrored, the shapes
                 OPL2-era FM chips offered. Zeroing adds harmonics without a
                 second oscillator.

                   FoldedHalf     first half sine, second half silent
                   FoldedFull     first half sine, second half sine negated
                                  (a full-wave rectified sine, never negative)
                   FoldedQuarter  quarter 1 sine, quarter 2 silent,
                                  quarter 3 sine negated, quarter 4 silent

  Noise          Not a function of phase at all: each sample is an
                 independent integer in -10..=9. It is deliberately NOT
                 normalised to ±1, so after volume scaling it is loud and
                 usually clips. Phase still advances under noise so that
                 switching back to a pitched shape picks up where the cycle
                 would have been.
*/

/// Waveform kind shared by every voice.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Waveform {
    #[default]
    Square,
    Triangle,
    Saw,
    Noise,
    Sine,
    FoldedHalf,
    FoldedFull,
    FoldedQuarter,
}

/// First triangle breakpoint as a fraction of the period.
const TRIANGLE_PEAK: f64 = 0.35;

/// Inclusive lower and exclusive upper bound of a noise sample.
const NOISE_RANGE: std::ops::Range<i32> = -10..10;

impl Waveform {
    /// All kinds in selection order (F1..F8 in the front-end).
    pub const ALL: [Waveform; 8] = [
        Waveform::Square,
        Waveform::Triangle,
        Waveform::Saw,
        Waveform::Noise,
        Waveform::Sine,
        Waveform::FoldedHalf,
        Waveform::FoldedFull,
        Waveform::FoldedQuarter,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Inverse of [`Waveform::index`]. Out-of-range values yield `None`.
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Next kind in selection order, wrapping around.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() as usize + 1) % Self::ALL.len()]
    }

    /// Previous kind in selection order, wrapping around.
    pub fn previous(self) -> Self {
        let len = Self::ALL.len();
        Self::ALL[(self.index() as usize + len - 1) % len]
    }

    pub fn name(self) -> &'static str {
        match self {
            Waveform::Square => "square",
            Waveform::Triangle => "triangle",
            Waveform::Saw => "saw",
            Waveform::Noise => "noise",
            Waveform::Sine => "sine",
            Waveform::FoldedHalf => "folded-half",
            Waveform::FoldedFull => "folded-full",
            Waveform::FoldedQuarter => "folded-quarter",
        }
    }

    /// Deterministic shape at `phase` within a cycle of `period` samples.
    ///
    /// Returns `None` for [`Waveform::Noise`], which has no shape. `phase` is
    /// wrapped into `[0, period)` first, so any real phase is accepted.
    #[inline]
    pub fn shape(self, phase: f64, period: f64) -> Option<f64> {
        let p = phase.rem_euclid(period);
        let half = 0.5 * period;

        let value = match self {
            Waveform::Square => {
                if p < half {
                    -1.0
                } else {
                    1.0
                }
            }
            Waveform::Triangle => triangle(p, period),
            Waveform::Saw => -1.0 + 2.0 * (p / period),
            Waveform::Noise => return None,
            Waveform::Sine => sine(p, period),
            Waveform::FoldedHalf => {
                if p < half {
                    sine(p, period)
                } else {
                    0.0
                }
            }
            Waveform::FoldedFull => {
                if p < half {
                    sine(p, period)
                } else {
                    -sine(p, period)
                }
            }
            Waveform::FoldedQuarter => {
                if p < 0.25 * period {
                    sine(p, period)
                } else if p < half {
                    0.0
                } else if p < 0.75 * period {
                    -sine(p, period)
                } else {
                    0.0
                }
            }
        };

        Some(value)
    }

    /// Amplitude of one sample, drawing from `noise` when the kind is noise.
    #[inline]
    pub fn amplitude(self, phase: f64, period: f64, noise: &mut NoiseSource) -> f64 {
        match self.shape(phase, period) {
            Some(value) => value,
            None => noise.next_sample(),
        }
    }
}

#[inline]
fn sine(phase: f64, period: f64) -> f64 {
    (TAU * phase / period).sin()
}

#[inline]
fn triangle(phase: f64, period: f64) -> f64 {
    let q = TRIANGLE_PEAK * period;
    let h = 0.5 * period;
    let t = 0.75 * period;

    if phase < q {
        phase / q
    } else if phase < h {
        1.0 - (phase - q) / (h - q)
    } else if phase < t {
        -(phase - h) / (t - h)
    } else {
        -1.0 + (phase - t) / (period - t)
    }
}

impl fmt::Display for Waveform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Waveform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|w| w.name() == wanted)
            .ok_or_else(|| {
                let names: Vec<&str> = Self::ALL.iter().map(|w| w.name()).collect();
                format!("unknown waveform '{s}', expected one of: {}", names.join(", "))
            })
    }
}

/// Per-sample noise generator owned by the mixer.
///
/// A seeded [`SmallRng`] keeps the audio thread free of syscalls and makes
/// noise renders reproducible in tests.
#[derive(Debug, Clone)]
pub struct NoiseSource {
    rng: SmallRng,
}

impl NoiseSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Next noise value, an integer in `-10..=9`.
    #[inline]
    pub fn next_sample(&mut self) -> f64 {
        self.rng.random_range(NOISE_RANGE) as f64
    }
}

impl Default for NoiseSource {
    fn default() -> Self {
        Self::new(0x6b65_7973)
    }
}
