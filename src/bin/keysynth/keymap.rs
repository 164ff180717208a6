//! Computer keyboard → synth actions.
//!
//! Two tracker-style rows. The lower row plays the first octave, the upper
//! row continues from the next C up to the E above it:
//!
//! ```text
//!  2 3   5 6 7   9 0           s d   g h j
//! q w e r t y u i o p         z x c v b n m
//! ```
//!
//! Each voice has exactly one key, so releasing a key in hold mode never cuts
//! a note held on the other row.

use crossterm::event::KeyCode;
use keysynth::dsp::Waveform;

const LOWER_ROW: [char; 12] = ['z', 's', 'x', 'd', 'c', 'v', 'g', 'b', 'h', 'n', 'j', 'm'];
const UPPER_ROW: [char; 17] = [
    'q', '2', 'w', '3', 'e', 'r', '5', 't', '6', 'y', '7', 'u', 'i', '9', 'o', '0', 'p',
];
const UPPER_ROW_OFFSET: usize = LOWER_ROW.len();

/// Voices reachable from the two rows.
pub const MAPPED_VOICES: usize = UPPER_ROW_OFFSET + UPPER_ROW.len();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Note(usize),
    SelectWaveform(Waveform),
    NextWaveform,
    PreviousWaveform,
    Volume(i32),
    AllNotesOff,
    ToggleMode,
    Quit,
}

pub fn action_for(code: KeyCode) -> Option<Action> {
    match code {
        KeyCode::Esc => Some(Action::Quit),
        KeyCode::Char(' ') => Some(Action::AllNotesOff),
        KeyCode::Tab => Some(Action::ToggleMode),
        KeyCode::F(n @ 1..=8) => Waveform::from_index(n - 1).map(Action::SelectWaveform),
        KeyCode::Char('[') => Some(Action::PreviousWaveform),
        KeyCode::Char(']') => Some(Action::NextWaveform),
        KeyCode::Char('-') => Some(Action::Volume(-1)),
        KeyCode::Char('=') => Some(Action::Volume(1)),
        KeyCode::Char('_') => Some(Action::Volume(-8)),
        KeyCode::Char('+') => Some(Action::Volume(8)),
        KeyCode::Char(c) => note_for(c.to_ascii_lowercase()).map(Action::Note),
        _ => None,
    }
}

fn note_for(c: char) -> Option<usize> {
    if let Some(i) = LOWER_ROW.iter().position(|&k| k == c) {
        return Some(i);
    }
    UPPER_ROW
        .iter()
        .position(|&k| k == c)
        .map(|i| i + UPPER_ROW_OFFSET)
}

/// Key to show on the on-screen keyboard for a voice.
pub fn label_for(id: usize) -> Option<char> {
    if id >= UPPER_ROW_OFFSET {
        UPPER_ROW.get(id - UPPER_ROW_OFFSET).copied()
    } else {
        LOWER_ROW.get(id).copied()
    }
}
