//! On-screen keyboard widget - black keys on the top row, white keys below

use keysynth::synth::KeyColor;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::keymap::label_for;

/// Characters per key cell
const CELL_WIDTH: usize = 3;

/// Render one cell per voice; held voices are lit
pub fn render_keyboard(frame: &mut Frame, area: Rect, keys: &[KeyColor], held: &[bool]) {
    let block = Block::default().title(" Keyboard ").borders(Borders::ALL);

    let mut black_row = Vec::with_capacity(keys.len());
    let mut white_row = Vec::with_capacity(keys.len());
    let mut label_row = Vec::with_capacity(keys.len());

    for (id, &color) in keys.iter().enumerate() {
        let on = held.get(id).copied().unwrap_or(false);
        let blank = Span::raw(" ".repeat(CELL_WIDTH));
        let cell = Span::styled(" ".repeat(CELL_WIDTH), key_style(color, on));
        let label = label_for(id).map_or_else(|| " ".to_string(), |c| c.to_string());

        match color {
            KeyColor::Black => {
                black_row.push(cell);
                white_row.push(blank);
            }
            KeyColor::White => {
                black_row.push(blank);
                white_row.push(cell);
            }
        }
        label_row.push(Span::styled(
            format!("{label:^CELL_WIDTH$}"),
            Style::default().fg(if on { Color::LightGreen } else { Color::DarkGray }),
        ));
    }

    let lines = vec![
        Line::from(black_row),
        Line::from(white_row.clone()),
        Line::from(white_row),
        Line::from(label_row),
    ];
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn key_style(color: KeyColor, on: bool) -> Style {
    match (color, on) {
        (_, true) => Style::default().bg(Color::LightGreen).add_modifier(Modifier::BOLD),
        (KeyColor::White, false) => Style::default().bg(Color::White),
        (KeyColor::Black, false) => Style::default().bg(Color::DarkGray),
    }
}
