//! A C major triad rendered into every supported output format.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keysynth::{
    dsp::{OutputSample, Waveform},
    split,
    synth::{MixEngine, SynthState},
    SynthConfig,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

/// C, E and G above the base key
const TRIAD: [usize; 3] = [0, 4, 7];

fn triad() -> Option<MixEngine> {
    let config = SynthConfig {
        sample_rate: SAMPLE_RATE,
        voices: 12,
        ..SynthConfig::default()
    };
    let (controller, engine) = split(&config).ok()?;
    for id in TRIAD {
        controller.set_voice_on(id, true).ok()?;
    }
    Some(engine)
}

fn bench_format<S: OutputSample>(
    group: &mut criterion::BenchmarkGroup<'_, criterion::measurement::WallTime>,
    name: &str,
    size: usize,
) {
    let Some(mut engine) = triad() else {
        return;
    };
    let mut buffer = vec![S::SILENCE; size];
    let state = SynthState::new(Waveform::Sine, 100);

    group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
        b.iter(|| {
            engine.render(black_box(&mut buffer), black_box(state));
        })
    });
}

pub fn bench_formats(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/formats");

    for &size in BLOCK_SIZES {
        bench_format::<i8>(&mut group, "i8", size);
        bench_format::<u8>(&mut group, "u8", size);
        bench_format::<i16>(&mut group, "i16", size);
        bench_format::<f32>(&mut group, "f32", size);
    }

    group.finish();
}
