//! Cost of the mixer as more keys are held.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use keysynth::{dsp::Waveform, split, synth::SynthState, SynthConfig};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

/// Held keys per scenario, up to the full 29-key tracker layout.
const HELD: &[usize] = &[1, 3, 8, 29];

pub fn bench_polyphony(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/polyphony");
    let config = SynthConfig {
        sample_rate: SAMPLE_RATE,
        voices: 29,
        ..SynthConfig::default()
    };

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0i8; size];

        for &held in HELD {
            let Ok((controller, mut engine)) = split(&config) else {
                return;
            };
            for id in 0..held {
                let _ = controller.set_voice_on(id, true);
            }

            // Triangle is the most branchy deterministic shape
            let state = SynthState::new(Waveform::Triangle, 100);
            let name = format!("triangle_x{held}");
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    engine.render(black_box(&mut buffer), black_box(state));
                })
            });
        }

        // === IDLE ===
        // No keys held: only the gate snapshot and the silence fill
        let Ok((_controller, mut idle)) = split(&config) else {
            return;
        };
        group.bench_with_input(BenchmarkId::new("idle", size), &size, |b, _| {
            b.iter(|| {
                idle.render(black_box(&mut buffer), black_box(SynthState::default()));
            })
        });
    }

    group.finish();
}
