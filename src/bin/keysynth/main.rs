//! keysynth - terminal keyboard synthesizer
//!
//! Run with: cargo run --release -- --waveform sine

mod app;
mod keymap;
mod ui;

use std::{fs::File, path::PathBuf};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use keysynth::{dsp::Waveform, synth::pitch::MIDDLE_C_HZ, SynthConfig, DEFAULT_SAMPLE_RATE};

use app::KeySynth;

/// Play a polyphonic synth from the computer keyboard.
#[derive(Parser, Debug)]
#[command(name = "keysynth")]
#[command(version)]
struct Args {
    /// Preferred sample rate in Hz (falls back to the device default)
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    sample_rate: u32,

    /// Fixed device buffer size in frames (device default if omitted)
    #[arg(long)]
    buffer_size: Option<u32>,

    /// Frequency of the lowest key in Hz
    #[arg(long, default_value_t = MIDDLE_C_HZ)]
    base_hz: f64,

    /// Initial waveform: square, triangle, saw, noise, sine,
    /// folded-half, folded-full, folded-quarter
    #[arg(long, default_value = "square")]
    waveform: Waveform,

    /// Initial volume (1-127)
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u8).range(1..=127))]
    volume: u8,

    /// Seed for the noise waveform
    #[arg(long, default_value_t = 0x6b65_7973)]
    seed: u64,

    /// Write logs to this file (the terminal belongs to the UI)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let args = Args::parse();

    if let Some(path) = &args.log_file {
        let file = File::create(path)
            .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
            .target(env_logger::Target::Pipe(Box::new(file)))
            .init();
    }

    let config = SynthConfig {
        sample_rate: args.sample_rate,
        base_frequency: args.base_hz,
        voices: keymap::MAPPED_VOICES,
        waveform: args.waveform,
        volume: args.volume,
        seed: args.seed,
    };

    KeySynth::new(config).buffer_size(args.buffer_size).run()
}
