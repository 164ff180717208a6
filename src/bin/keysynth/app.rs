//! KeySynth - audio device setup and the run loop

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use color_eyre::eyre::{bail, eyre, Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, SizedSample};
use log::{error, info, warn};

use keysynth::{
    dsp::OutputSample,
    synth::{
        scope::{scope, ScopeTap},
        SharedState,
    },
    MixEngine, SynthConfig, MAX_BLOCK_SIZE,
};

use super::ui::{KeyMode, UiApp};

/// Capacity in blocks of the audio → UI scope ring.
const SCOPE_RING_BLOCKS: usize = 8;

/// Application builder
pub struct KeySynth {
    config: SynthConfig,
    buffer_size: Option<u32>,
}

impl KeySynth {
    pub fn new(config: SynthConfig) -> Self {
        Self {
            config,
            buffer_size: None,
        }
    }

    /// Ask the device for a fixed callback size instead of its default.
    pub fn buffer_size(mut self, frames: Option<u32>) -> Self {
        self.buffer_size = frames;
        self
    }

    /// Open the output device, start the stream and hand the terminal to the UI.
    pub fn run(mut self) -> EyreResult<()> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| eyre!("no default output device available"))?;
        let supported = pick_config(&device, self.config.sample_rate)?;

        let sample_format = supported.sample_format();
        let mut stream_config: cpal::StreamConfig = supported.into();
        if let Some(frames) = self.buffer_size {
            stream_config.buffer_size = cpal::BufferSize::Fixed(frames);
        }

        // The engine's periods are derived from whatever rate the device gave us.
        self.config.sample_rate = stream_config.sample_rate.0;
        info!(
            "output: {} Hz, {} channel(s), {sample_format:?}, buffer {:?}",
            stream_config.sample_rate.0, stream_config.channels, stream_config.buffer_size
        );

        let (controller, engine) = keysynth::split(&self.config)?;
        let (tap, scope_rx) = scope(MAX_BLOCK_SIZE * SCOPE_RING_BLOCKS);
        let active = Arc::new(AtomicUsize::new(0));

        let audio = AudioContext {
            engine,
            state: Arc::clone(controller.shared_state()),
            tap,
            active: Arc::clone(&active),
        };
        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, audio)?,
            SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, audio)?,
            SampleFormat::I8 => build_stream::<i8>(&device, &stream_config, audio)?,
            SampleFormat::U8 => build_stream::<u8>(&device, &stream_config, audio)?,
            other => bail!("unsupported device sample format {other:?}"),
        };
        stream.play().wrap_err("failed to start output stream")?;

        let mode = KeyMode::detect();
        info!("key mode: {mode}");

        let mut terminal = ratatui::init();
        let enhancement = mode.enable();
        let mut app = UiApp::new(
            controller,
            self.config.pitch_table()?,
            scope_rx,
            active,
            self.config.sample_rate as f32,
            mode,
        );
        let result = app.run(&mut terminal);
        drop(enhancement);
        ratatui::restore();

        app.release_all();
        drop(stream);
        info!("stopped");
        result
    }
}

/// Everything the audio callback owns.
struct AudioContext {
    engine: MixEngine,
    state: Arc<SharedState>,
    tap: ScopeTap,
    active: Arc<AtomicUsize>,
}

/// Use the requested rate if any supported config covers it, else the device default.
fn pick_config(device: &cpal::Device, wanted: u32) -> EyreResult<cpal::SupportedStreamConfig> {
    let wanted_rate = cpal::SampleRate(wanted);
    let matching = device
        .supported_output_configs()
        .wrap_err("failed to query output configs")?
        .find(|range| {
            is_renderable(range.sample_format())
                && range.min_sample_rate() <= wanted_rate
                && wanted_rate <= range.max_sample_rate()
        });

    match matching {
        Some(range) => Ok(range.with_sample_rate(wanted_rate)),
        None => {
            let fallback = device
                .default_output_config()
                .wrap_err("failed to fetch default output config")?;
            warn!(
                "{wanted} Hz not supported, using device default {} Hz",
                fallback.sample_rate().0
            );
            Ok(fallback)
        }
    }
}

fn is_renderable(format: SampleFormat) -> bool {
    matches!(
        format,
        SampleFormat::F32 | SampleFormat::I16 | SampleFormat::I8 | SampleFormat::U8
    )
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    audio: AudioContext,
) -> EyreResult<cpal::Stream>
where
    T: SizedSample + OutputSample,
{
    let channels = config.channels as usize;
    let AudioContext {
        mut engine,
        state,
        mut tap,
        active,
    } = audio;

    // Mono block reused by every callback
    let mut block = vec![T::SILENCE; MAX_BLOCK_SIZE];

    let stream = device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                // One snapshot per callback: every chunk sees the same settings.
                let snapshot = state.snapshot();
                let total_frames = data.len() / channels;
                let mut frames_written = 0;

                while frames_written < total_frames {
                    let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                    let mono = &mut block[..frames];
                    let voices = engine.render(mono, snapshot);
                    active.store(voices, Ordering::Relaxed);

                    // Duplicate mono to all channels
                    let out_off = frames_written * channels;
                    for (i, &s) in mono.iter().enumerate() {
                        for ch in 0..channels {
                            data[out_off + i * channels + ch] = s;
                        }
                    }

                    tap.push_block(mono);
                    frames_written += frames;
                }
            },
            |err| error!("stream error: {err}"),
            None,
        )
        .wrap_err("failed to build output stream")?;

    Ok(stream)
}
