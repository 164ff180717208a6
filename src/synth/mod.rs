// Purpose: voice gates, global state and the mixer that renders them.
// The control side and the audio side meet only through atomics.

pub mod control;
pub mod engine;
pub mod pitch;
#[cfg(feature = "rtrb")]
pub mod scope;
pub mod state;
pub mod voice;

use std::sync::Arc;

use log::info;

pub use control::Controller;
pub use engine::MixEngine;
pub use pitch::{KeyColor, PitchTable};
pub use state::{SharedState, SynthState};
pub use voice::{Voice, VoiceBank};

use crate::{config::SynthConfig, error::SynthError};

/// Build the synth from `config` and split it into its two halves.
///
/// The [`Controller`] goes to whatever handles input, the [`MixEngine`] moves
/// into the audio callback.
pub fn split(config: &SynthConfig) -> Result<(Controller, MixEngine), SynthError> {
    config.validate()?;

    let table = config.pitch_table()?;
    let voices = Arc::new(VoiceBank::new(&table));
    let state = Arc::new(SharedState::new(config.initial_state()));
    let engine = MixEngine::new(config.sample_rate as f64, Arc::clone(&voices), config.seed)?;

    info!(
        "synth ready: {} voices, {} Hz, {} at volume {}",
        voices.len(),
        config.sample_rate,
        config.waveform,
        config.volume
    );

    Ok((Controller::new(voices, state), engine))
}
