//! Realtime-safe polyphonic keyboard synthesizer.
//!
//! The crate is split the same way the audio flows:
//!
//! - [`dsp`] holds the stateless math: waveform formulas and output sample
//!   formats.
//! - [`synth`] holds the stateful parts: the pitch table, shared voice gates,
//!   the global waveform/volume state and the [`MixEngine`](synth::MixEngine)
//!   that renders buffers on the audio thread.
//!
//! ```
//! use keysynth::{dsp::Waveform, split, SynthConfig};
//!
//! let config = SynthConfig::default();
//! let (controller, mut engine) = split(&config).unwrap();
//!
//! controller.set_waveform(Waveform::Square);
//! controller.set_voice_on(0, true).unwrap();
//!
//! let mut block = [0i8; 64];
//! let active = engine.render(&mut block, controller.snapshot());
//! assert_eq!(active, 1);
//! ```

pub mod config;
pub mod dsp;
pub mod error;
pub mod synth;

pub use config::SynthConfig;
pub use error::SynthError;
pub use synth::{split, Controller, MixEngine};

/// Largest block rendered in one pass. Longer buffers are rendered in chunks.
pub const MAX_BLOCK_SIZE: usize = 2048;

/// Sample rate used when nothing else has been negotiated.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
