//! Benchmarks for the voice pool.
//!
//! Each case renders one block through `VoiceManager::process_voices_into`,
//! the same path the synth takes, with a varying number of sounding voices.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::{
    dsp::{envelope::AdsrParams, filter::FilterType, oscillator::Waveform},
    synth::{FilterSettings, PolyOscillator, VoiceManager},
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

// long sustain so voices never free themselves mid-bench
fn pad_envelope() -> AdsrParams {
    AdsrParams::new(0.01, 0.1, 0.8, 1.0)
}

fn full_pool(voice_count: usize) -> VoiceManager {
    let mut vm = VoiceManager::with_envelope(voice_count, SAMPLE_RATE, pad_envelope());
    for i in 0..voice_count {
        vm.allocate_voice(i as i32, 0, 36 + ((i * 5) % 60) as u8, 0.8);
    }
    vm
}

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // === BARE POOL ===
        // polyblep saw, no per-voice filter: the cost of the pool itself
        for voices in [1usize, 8, 16, 64] {
            let mut vm = full_pool(voices);
            let mut osc = PolyOscillator::new(Waveform::Saw);
            group.bench_with_input(
                BenchmarkId::new(format!("saw_x{voices}"), size),
                &size,
                |b, _| b.iter(|| vm.process_voices_into(black_box(&mut buffer), &mut osc)),
            );
        }

        // === FILTERED POOL ===
        // every voice through its own safe-mode lowpass
        let mut vm = full_pool(16);
        let mut osc = PolyOscillator::new(Waveform::Saw)
            .with_filter(FilterSettings::new(FilterType::LowPass, 1_800.0, 2.0));
        group.bench_with_input(BenchmarkId::new("filtered_saw_x16", size), &size, |b, _| {
            b.iter(|| vm.process_voices_into(black_box(&mut buffer), &mut osc))
        });

        // === NOTE CHURN ===
        // a new note every block into a full pool: steal + retrigger + render
        let mut vm = full_pool(16);
        let mut osc = PolyOscillator::new(Waveform::Square);
        let mut next_id = 16;
        group.bench_with_input(BenchmarkId::new("steal_every_block_x16", size), &size, |b, _| {
            b.iter(|| {
                vm.allocate_voice(next_id, 0, 40 + (next_id % 40) as u8, 0.7);
                next_id += 1;
                vm.process_voices_into(black_box(&mut buffer), &mut osc);
            })
        });
    }

    group.finish();
}
