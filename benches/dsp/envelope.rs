//! Benchmarks for ADSR envelope generator.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::dsp::envelope::{AdsrParams, Envelope};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Attack phase (ramping up); ten seconds so the bench never leaves it
        let mut env = Envelope::with_params(SAMPLE_RATE, AdsrParams::new(10.0, 0.1, 0.7, 0.3));
        env.trigger();
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| env.render(black_box(&mut buffer)))
        });

        // Sustain phase (holding steady)
        let mut env = Envelope::with_params(SAMPLE_RATE, AdsrParams::new(0.001, 0.001, 0.7, 0.3));
        env.trigger();
        // Advance past attack/decay
        for _ in 0..200 {
            env.process();
        }
        group.bench_with_input(BenchmarkId::new("sustain", size), &size, |b, _| {
            b.iter(|| env.render(black_box(&mut buffer)))
        });

        // Release phase (quadratic ramp down)
        let mut env = Envelope::with_params(SAMPLE_RATE, AdsrParams::new(0.001, 0.001, 0.7, 10.0));
        env.trigger();
        for _ in 0..200 {
            env.process();
        }
        env.release();
        group.bench_with_input(BenchmarkId::new("release", size), &size, |b, _| {
            b.iter(|| env.render(black_box(&mut buffer)))
        });
    }

    group.finish();
}
