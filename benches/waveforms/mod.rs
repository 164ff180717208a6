//! Single-voice renders, one per waveform kind.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keysynth::{dsp::Waveform, split, synth::SynthState, SynthConfig};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_waveforms(c: &mut Criterion) {
    let mut group = c.benchmark_group("waveforms");
    let config = SynthConfig {
        sample_rate: SAMPLE_RATE,
        voices: 1,
        ..SynthConfig::default()
    };

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0i8; size];

        // Square and saw are a compare or a multiply per sample, sine and the
        // folded shapes pay for sin(), noise for the RNG
        for kind in Waveform::ALL {
            let Ok((controller, mut engine)) = split(&config) else {
                return;
            };
            let _ = controller.set_voice_on(0, true);
            let state = SynthState::new(kind, 64);

            group.bench_with_input(BenchmarkId::new(kind.name(), size), &size, |b, _| {
                b.iter(|| {
                    engine.render(black_box(&mut buffer), black_box(state));
                })
            });
        }
    }

    group.finish();
}
