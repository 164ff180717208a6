use std::sync::Arc;

use log::{trace, warn};

use crate::{
    dsp::Waveform,
    error::SynthError,
    synth::{
        state::{SharedState, SynthState},
        voice::VoiceBank,
    },
};

/// Input-side handle: everything a key binding is allowed to change.
///
/// Cheap to clone. Every method is lock-free, so it is also safe to call from
/// an event thread while the audio thread renders.
#[derive(Debug, Clone)]
pub struct Controller {
    voices: Arc<VoiceBank>,
    state: Arc<SharedState>,
}

impl Controller {
    pub fn new(voices: Arc<VoiceBank>, state: Arc<SharedState>) -> Self {
        Self { voices, state }
    }

    /// Press (`true`) or release (`false`) a voice.
    ///
    /// An unknown id is a caller bug; it is reported and otherwise ignored.
    pub fn set_voice_on(&self, id: usize, on: bool) -> Result<(), SynthError> {
        match self.voices.get(id) {
            Some(voice) => {
                if voice.set_on(on) != on {
                    trace!("voice {id} {}", if on { "on" } else { "off" });
                }
                Ok(())
            }
            None => {
                warn!("ignoring gate change for unknown voice {id}");
                Err(SynthError::UnknownVoice {
                    id,
                    voices: self.voices.len(),
                })
            }
        }
    }

    /// Flip a voice and return its new gate state.
    pub fn toggle_voice(&self, id: usize) -> Result<bool, SynthError> {
        let voice = self.voices.get(id).ok_or_else(|| {
            warn!("ignoring toggle for unknown voice {id}");
            SynthError::UnknownVoice {
                id,
                voices: self.voices.len(),
            }
        })?;
        let on = voice.toggle();
        trace!("voice {id} {}", if on { "on" } else { "off" });
        Ok(on)
    }

    pub fn is_on(&self, id: usize) -> bool {
        self.voices.get(id).is_some_and(|v| v.is_on())
    }

    pub fn all_notes_off(&self) {
        self.voices.release_all();
    }

    pub fn set_waveform(&self, waveform: Waveform) {
        self.state.update(|s| s.with_waveform(waveform));
    }

    /// Step the volume by `delta`, clamped to `1..=127`. Returns the new volume.
    pub fn adjust_volume(&self, delta: i32) -> u8 {
        self.state.update(|s| s.with_volume_delta(delta)).volume
    }

    /// Current state, as the next render will see it.
    pub fn snapshot(&self) -> SynthState {
        self.state.snapshot()
    }

    pub fn shared_state(&self) -> &Arc<SharedState> {
        &self.state
    }

    pub fn voices(&self) -> &Arc<VoiceBank> {
        &self.voices
    }
}
