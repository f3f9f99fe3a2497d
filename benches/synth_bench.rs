//! Benchmarks for DSP primitives and voice-engine scenarios.
//!
//! Run with: cargo bench
//!
//! These benchmarks measure the per-block cost of the engine to ensure it
//! completes well within real-time audio deadlines.
//!
//! Reference timing at 48kHz sample rate:
//!   - 64 samples  = 1.33ms deadline
//!   - 128 samples = 2.67ms deadline
//!   - 256 samples = 5.33ms deadline
//!   - 512 samples = 10.67ms deadline
//!
//! Benchmark groups:
//!   - dsp/*        Low-level primitives (oscillator kernel, filter, envelope)
//!   - scenarios/*  Voice pools, stealing under load, full synth blocks

use criterion::{criterion_group, criterion_main};

mod dsp;
mod scenarios;

/// Common buffer sizes used in audio applications.
pub const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512];

pub const SAMPLE_RATE: f64 = 48_000.0;

criterion_group!(
    benches,
    // Low-level DSP primitives
    dsp::bench_oscillator,
    dsp::bench_filter,
    dsp::bench_envelope,
    // Engine scenarios
    scenarios::bench_voices,
    scenarios::bench_synth,
);
criterion_main!(benches);
