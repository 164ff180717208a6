//! Oscilloscope widget, triggered on a rising zero crossing

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Samples shown per frame
const WINDOW: usize = 512;

/// Render the waveform oscilloscope
pub fn render_waveform(frame: &mut Frame, area: Rect, audio_buffer: &[f32]) {
    let block = Block::default().title(" Scope ").borders(Borders::ALL);

    let start = trigger_point(audio_buffer, WINDOW);
    let end = (start + WINDOW).min(audio_buffer.len());
    let window = &audio_buffer[start..end];

    let data: Vec<(f64, f64)> = window
        .iter()
        .enumerate()
        .map(|(i, &sample)| (i as f64, sample as f64))
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, WINDOW as f64])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([-1.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}

/// First rising zero crossing that still leaves `window` samples to draw.
///
/// Keeps a held note standing still on screen instead of scrolling.
fn trigger_point(buffer: &[f32], window: usize) -> usize {
    let last = buffer.len().saturating_sub(window);
    buffer
        .windows(2)
        .take(last)
        .position(|pair| pair[0] < 0.0 && pair[1] >= 0.0)
        .map_or(last, |i| i + 1)
}
