//! Global waveform/volume state.
//!
//! The renderer never reads shared fields one at a time. It takes a
//! [`SynthState`] snapshot once per buffer, so a buffer is always rendered
//! with one consistent (waveform, volume) pair.

use std::sync::atomic::{AtomicU16, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::Waveform;

pub const VOLUME_MIN: u8 = 1;
pub const VOLUME_MAX: u8 = 127;
pub const DEFAULT_VOLUME: u8 = 10;

/// Snapshot of the settings that apply to every voice.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthState {
    pub waveform: Waveform,
    pub volume: u8,
}

impl SynthState {
    /// Build a state, clamping `volume` into `VOLUME_MIN..=VOLUME_MAX`.
    pub fn new(waveform: Waveform, volume: u8) -> Self {
        Self {
            waveform,
            volume: volume.clamp(VOLUME_MIN, VOLUME_MAX),
        }
    }

    /// Apply a signed volume step.
    ///
    /// Steps below the minimum pin at 1 and steps past the maximum pin at
    /// 127.
    pub fn with_volume_delta(self, delta: i32) -> Self {
        let volume = (self.volume as i32 + delta).clamp(VOLUME_MIN as i32, VOLUME_MAX as i32);
        Self {
            volume: volume as u8,
            ..self
        }
    }

    pub fn with_waveform(self, waveform: Waveform) -> Self {
        Self { waveform, ..self }
    }

    fn pack(self) -> u16 {
        ((self.waveform.index() as u16) << 8) | self.volume as u16
    }

    fn unpack(bits: u16) -> Self {
        let waveform = Waveform::from_index((bits >> 8) as u8).unwrap_or_default();
        Self::new(waveform, (bits & 0xff) as u8)
    }
}

impl Default for SynthState {
    fn default() -> Self {
        Self::new(Waveform::default(), DEFAULT_VOLUME)
    }
}

/// Lock-free cell holding the current [`SynthState`].
///
/// Both fields live in one atomic word so a reader can never observe a
/// waveform from one update paired with a volume from another.
#[derive(Debug)]
pub struct SharedState {
    bits: AtomicU16,
}

impl SharedState {
    pub fn new(initial: SynthState) -> Self {
        Self {
            bits: AtomicU16::new(initial.pack()),
        }
    }

    #[inline]
    pub fn snapshot(&self) -> SynthState {
        SynthState::unpack(self.bits.load(Ordering::Acquire))
    }

    pub fn store(&self, state: SynthState) {
        self.bits.store(state.pack(), Ordering::Release);
    }

    /// Apply `f` atomically and return the new state.
    pub fn update(&self, f: impl Fn(SynthState) -> SynthState) -> SynthState {
        let mut current = self.bits.load(Ordering::Acquire);
        loop {
            let next = f(SynthState::unpack(current));
            match self.bits.compare_exchange_weak(
                current,
                next.pack(),
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return next,
                Err(actual) => current = actual,
            }
        }
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(SynthState::default())
    }
}
