//! TUI module for keysynth
//!
//! Turns key events into controller calls and draws the keyboard, the
//! synth state and the rendered audio.

mod keyboard;
mod spectrum;
mod status;
mod waveform;

use std::{
    fmt,
    io::stdout,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use color_eyre::eyre::Result as EyreResult;
use crossterm::{
    event::{
        self, Event, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
};
use keysynth::{
    synth::{KeyColor, PitchTable},
    Controller,
};
use log::{debug, info};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    DefaultTerminal, Frame,
};
use rtrb::Consumer;

use crate::keymap::{self, Action};

use keyboard::render_keyboard;
use spectrum::{render_spectrum, SpectrumAnalyzer};
use status::{render_status, AudioStats, StatusLine};
use waveform::render_waveform;

/// Samples kept for drawing (also the FFT size)
const VIS_BUFFER_SIZE: usize = 2048;

/// How note keys behave.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMode {
    /// Note sounds while the key is held. Needs key-release events.
    Hold,
    /// Each press toggles the note. Works on any terminal.
    Latch,
}

impl KeyMode {
    /// Hold if the terminal can report key releases, otherwise latch.
    pub fn detect() -> Self {
        match crossterm::terminal::supports_keyboard_enhancement() {
            Ok(true) => KeyMode::Hold,
            _ => KeyMode::Latch,
        }
    }

    /// Turn on release reporting for hold mode. Undone when the guard drops.
    pub fn enable(self) -> EnhancementGuard {
        let active = self == KeyMode::Hold
            && execute!(
                stdout(),
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                )
            )
            .is_ok();
        EnhancementGuard { active }
    }
}

impl fmt::Display for KeyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyMode::Hold => f.write_str("hold"),
            KeyMode::Latch => f.write_str("latch"),
        }
    }
}

/// Pops the keyboard enhancement flags pushed by [`KeyMode::enable`].
pub struct EnhancementGuard {
    active: bool,
}

impl Drop for EnhancementGuard {
    fn drop(&mut self) {
        if self.active {
            let _ = execute!(stdout(), PopKeyboardEnhancementFlags);
        }
    }
}

/// UI application state
pub struct UiApp {
    controller: Controller,
    /// Key colour per voice, fixed at startup
    keys: Vec<KeyColor>,
    /// Ring buffer receiver for rendered samples
    audio_rx: Consumer<f32>,
    /// Most recent samples for the scope and spectrum
    audio_buffer: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    /// Voices the last render mixed
    active: Arc<AtomicUsize>,
    sample_rate: f32,
    mode: KeyMode,
    /// Whether the terminal reports key releases
    hold_supported: bool,
    should_quit: bool,
}

impl UiApp {
    pub fn new(
        controller: Controller,
        table: PitchTable,
        audio_rx: Consumer<f32>,
        active: Arc<AtomicUsize>,
        sample_rate: f32,
        mode: KeyMode,
    ) -> Self {
        let keys = (0..table.len()).map(|id| table.key_color(id)).collect();
        Self {
            controller,
            keys,
            audio_rx,
            audio_buffer: vec![0.0; VIS_BUFFER_SIZE],
            spectrum: SpectrumAnalyzer::new(VIS_BUFFER_SIZE, sample_rate),
            active,
            sample_rate,
            mode,
            hold_supported: mode == KeyMode::Hold,
            should_quit: false,
        }
    }

    /// Run the UI event loop
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.spectrum.update(&self.audio_buffer);

            terminal.draw(|frame| self.render(frame))?;

            // Drain every pending key event, then redraw (~60fps)
            if event::poll(Duration::from_millis(16))? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        self.handle_key(key);
                    }
                }
            }
        }

        Ok(())
    }

    pub fn release_all(&self) {
        self.controller.all_notes_off();
    }

    /// Pull new samples from the ring, keeping the last VIS_BUFFER_SIZE
    fn poll_audio(&mut self) {
        let available = self.audio_rx.slots();
        if available == 0 {
            return;
        }

        let keep = available.min(VIS_BUFFER_SIZE);
        // Older samples than the window can hold are skipped outright
        for _ in keep..available {
            let _ = self.audio_rx.pop();
        }
        self.audio_buffer.drain(..keep);
        while let Ok(sample) = self.audio_rx.pop() {
            self.audio_buffer.push(sample);
            if self.audio_buffer.len() == VIS_BUFFER_SIZE {
                break;
            }
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let Some(action) = keymap::action_for(key.code) else {
            return;
        };

        match action {
            Action::Note(id) => self.handle_note(id, key.kind),
            _ if key.kind == KeyEventKind::Release => {}
            Action::Volume(delta) => {
                let volume = self.controller.adjust_volume(delta);
                debug!("volume {volume}");
            }
            _ if key.kind == KeyEventKind::Repeat => {}
            Action::SelectWaveform(waveform) => self.controller.set_waveform(waveform),
            Action::NextWaveform => {
                let next = self.controller.snapshot().waveform.next();
                self.controller.set_waveform(next);
            }
            Action::PreviousWaveform => {
                let previous = self.controller.snapshot().waveform.previous();
                self.controller.set_waveform(previous);
            }
            Action::AllNotesOff => self.controller.all_notes_off(),
            Action::ToggleMode => self.toggle_mode(),
            Action::Quit => self.should_quit = true,
        }
    }

    fn handle_note(&mut self, id: usize, kind: KeyEventKind) {
        let result = match (self.mode, kind) {
            (KeyMode::Hold, KeyEventKind::Press) => self.controller.set_voice_on(id, true),
            (KeyMode::Hold, KeyEventKind::Release) => self.controller.set_voice_on(id, false),
            (KeyMode::Latch, KeyEventKind::Press) => self.controller.toggle_voice(id).map(|_| ()),
            _ => Ok(()),
        };
        if let Err(err) = result {
            debug!("{err}");
        }
    }

    fn toggle_mode(&mut self) {
        let next = match self.mode {
            KeyMode::Hold => KeyMode::Latch,
            KeyMode::Latch if self.hold_supported => KeyMode::Hold,
            KeyMode::Latch => return,
        };
        self.controller.all_notes_off();
        self.mode = next;
        info!("key mode: {next}");
    }

    /// Render the UI
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Status bar
                Constraint::Length(6), // Keyboard
                Constraint::Min(6),    // Scope + spectrum
                Constraint::Length(1), // Help bar
            ])
            .split(area);

        let held: Vec<bool> = (0..self.keys.len())
            .map(|id| self.controller.is_on(id))
            .collect();

        let status = StatusLine {
            state: self.controller.snapshot(),
            sample_rate: self.sample_rate,
            active_voices: self.active.load(Ordering::Relaxed),
            held_keys: held.iter().filter(|&&h| h).count(),
            mode: self.mode,
            dominant_hz: self.spectrum.dominant_frequency(),
        };
        render_status(frame, chunks[0], &status, &AudioStats::from_buffer(&self.audio_buffer));

        render_keyboard(frame, chunks[1], &self.keys, &held);

        let scopes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2]);
        render_waveform(frame, scopes[0], &self.audio_buffer);
        render_spectrum(frame, scopes[1], self.spectrum.data());

        let help = Paragraph::new(
            " [Esc] Quit  [F1-F8] Waveform  [ [ ] ] Cycle  [-/=] Volume  [_/+] Volume x8  [Space] All off  [Tab] Hold/Latch",
        )
        .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(help, chunks[3]);
    }
}
