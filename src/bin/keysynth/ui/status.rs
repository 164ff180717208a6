//! Status bar widget - waveform, volume, voices and audio stats

use keysynth::synth::SynthState;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::KeyMode;

/// Audio statistics for display
pub struct AudioStats {
    pub peak: f32,
    pub rms: f32,
}

impl AudioStats {
    /// Compute audio stats from a buffer
    pub fn from_buffer(buffer: &[f32]) -> Self {
        if buffer.is_empty() {
            return Self { peak: 0.0, rms: 0.0 };
        }
        let peak = buffer.iter().fold(0.0f32, |acc, &x| acc.max(x.abs()));
        let rms = (buffer.iter().map(|&x| x * x).sum::<f32>() / buffer.len() as f32).sqrt();
        Self { peak, rms }
    }
}

/// Values shown in the status bar
pub struct StatusLine {
    pub state: SynthState,
    pub sample_rate: f32,
    pub active_voices: usize,
    pub held_keys: usize,
    pub mode: KeyMode,
    pub dominant_hz: Option<f64>,
}

/// Render the status bar
pub fn render_status(frame: &mut Frame, area: Rect, status: &StatusLine, audio_stats: &AudioStats) {
    let block = Block::default().title(" keysynth ").borders(Borders::ALL);

    // Volume as a share of the 1..=127 range
    let volume_pct = status.state.volume as f32 / 127.0 * 100.0;
    let pitch = match status.dominant_hz {
        Some(hz) => format!("~{hz:.0} Hz  "),
        None => "-  ".to_string(),
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {}  ", status.state.waveform),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("Vol {:>3} ({volume_pct:.0}%)  ", status.state.volume),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(
            format!("Voices {}/{}  ", status.active_voices, status.held_keys),
            Style::default().fg(if status.active_voices > 0 {
                Color::Green
            } else {
                Color::DarkGray
            }),
        ),
        Span::styled(format!("[{}]  ", status.mode), Style::default().fg(Color::White)),
        Span::styled(
            format!("{:.1}kHz  ", status.sample_rate / 1000.0),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(pitch, Style::default().fg(Color::LightBlue)),
        Span::styled(
            format!("Peak: {:.2}  RMS: {:.2}", audio_stats.peak, audio_stats.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
