//! Benchmarks for oscillator waveform generation.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::dsp::oscillator::{advance_phase, generate_sample, Waveform};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn render(buffer: &mut [f32], phase: &mut f64, waveform: Waveform, anti_alias: bool) {
    let frequency = 440.0;
    let increment = frequency / SAMPLE_RATE;
    for sample in buffer.iter_mut() {
        *sample = generate_sample(*phase, increment, waveform, anti_alias) as f32;
        *phase = advance_phase(*phase, frequency, SAMPLE_RATE);
    }
}

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        for (name, waveform, anti_alias) in [
            // sin() per sample
            ("sine", Waveform::Sine, false),
            ("saw_naive", Waveform::Saw, false),
            // two polynomial branches near the wrap
            ("saw_polyblep", Waveform::Saw, true),
            ("square_naive", Waveform::Square, false),
            // residual evaluated at two phases
            ("square_polyblep", Waveform::Square, true),
            ("triangle", Waveform::Triangle, false),
            // phase hash: sin() plus floor()
            ("noise", Waveform::Noise, false),
        ] {
            let mut phase = 0.0;
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| render(black_box(&mut buffer), &mut phase, waveform, anti_alias))
            });
        }
    }

    group.finish();
}
