//! Spectrum widget
//!
//! FFT of the latest output window, limited to the keyboard's range, plus a
//! readout of the strongest partial.

use std::sync::Arc;

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};
use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Highest frequency drawn, in Hz
const MAX_DISPLAY_HZ: f64 = 4_000.0;
/// Floor of the dB axis
const FLOOR_DB: f64 = -90.0;
/// Peaks quieter than this (relative to full scale) don't count as a pitch
const DOMINANT_THRESHOLD_DB: f64 = -50.0;

pub struct SpectrumAnalyzer {
    /// Hann window coefficients
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
    scratch: Vec<Complex<f32>>,
    /// (frequency_hz, magnitude_db) for each displayed bin
    spectrum: Vec<(f64, f64)>,
}

impl SpectrumAnalyzer {
    pub fn new(fft_len: usize, sample_rate: f32) -> Self {
        let fft = FftPlanner::new().plan_fft_forward(fft_len);

        let denom = fft_len.saturating_sub(1).max(1) as f32;
        let window = (0..fft_len)
            .map(|i| 0.5 * (1.0 - (std::f32::consts::TAU * i as f32 / denom).cos()))
            .collect();

        let bin_hz = sample_rate as f64 / fft_len.max(1) as f64;
        let bins = ((MAX_DISPLAY_HZ / bin_hz) as usize).clamp(1, (fft_len / 2).max(1));
        let spectrum = (0..bins).map(|i| (i as f64 * bin_hz, FLOOR_DB)).collect();

        Self {
            window,
            fft,
            scratch: vec![Complex::new(0.0, 0.0); fft_len],
            spectrum,
        }
    }

    /// Recompute from `buffer`, which must be exactly one FFT length long.
    pub fn update(&mut self, buffer: &[f32]) {
        if buffer.len() != self.window.len() {
            return;
        }

        for ((slot, &sample), &w) in self.scratch.iter_mut().zip(buffer).zip(&self.window) {
            *slot = Complex::new(sample * w, 0.0);
        }
        self.fft.process(&mut self.scratch);

        // Hann window has a coherent gain of 0.5
        let norm = 2.0 / (0.5 * self.window.len() as f64);
        for (i, point) in self.spectrum.iter_mut().enumerate() {
            let magnitude = self.scratch[i].norm() as f64 * norm;
            point.1 = (20.0 * magnitude.max(1e-9).log10()).max(FLOOR_DB);
        }
    }

    pub fn data(&self) -> &[(f64, f64)] {
        &self.spectrum
    }

    /// Frequency of the loudest bin above DC, if it is loud enough to matter.
    pub fn dominant_frequency(&self) -> Option<f64> {
        self.spectrum
            .iter()
            .skip(1)
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .filter(|(_, db)| *db > DOMINANT_THRESHOLD_DB)
            .map(|(hz, _)| *hz)
    }
}

/// Render the spectrum
pub fn render_spectrum(frame: &mut Frame, area: Rect, spectrum: &[(f64, f64)]) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(spectrum);

    let max_freq = spectrum.last().map_or(MAX_DISPLAY_HZ, |(f, _)| *f).max(1.0);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([0.0, max_freq])
                .labels(vec!["0".to_string(), format!("{:.0}k", max_freq / 1000.0)])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([FLOOR_DB, 0.0])
                .labels(vec!["-90", "-45", "0"])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
