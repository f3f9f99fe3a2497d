//! Benchmarks for the state-variable filter and its safe-mode wrapper.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::dsp::{filter::FilterType, selectable::SelectableFilter};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();

        for (name, filter_type) in [
            ("lowpass", FilterType::LowPass),
            ("highpass", FilterType::HighPass),
            ("bandpass", FilterType::BandPass),
            ("notch", FilterType::Notch),
        ] {
            let mut filter = SelectableFilter::new(SAMPLE_RATE, true);
            filter.set_type(filter_type);
            filter.set_frequency(1_000.0);
            filter.set_resonance(2.0);
            let mut buffer = input.clone();

            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.process_buffer(black_box(&mut buffer));
                })
            });
        }

        // Safe mode tripping every block: NaN at the head forces a reset
        let mut filter = SelectableFilter::new(SAMPLE_RATE, true);
        let mut corrupt = input.clone();
        corrupt[0] = f32::NAN;
        let mut buffer = corrupt.clone();
        group.bench_with_input(BenchmarkId::new("lowpass_with_reset", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&corrupt);
                filter.process_buffer(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
