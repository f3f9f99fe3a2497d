//! Benchmarks for complete synth blocks: queue drain, routing, voices,
//! master filter and volume.

use std::collections::VecDeque;
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_synth::{
    dsp::oscillator::Waveform,
    io::RawMidi,
    synth::{processor::MasterFilterSettings, PolySynth, SynthMessage},
    SynthConfig,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn chord_synth(config: SynthConfig) -> Option<PolySynth<VecDeque<SynthMessage>>> {
    let mut synth = PolySynth::new(config, VecDeque::new()).ok()?;
    for (id, key) in [48u8, 55, 60, 64, 67, 71].into_iter().enumerate() {
        synth.handle_message(SynthMessage::NoteOn {
            note_id: id as i32,
            channel: 0,
            key,
            velocity: 0.5,
        });
    }
    Some(synth)
}

pub fn bench_synth(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/synth");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // === SIX-NOTE CHORD ===
        let config = SynthConfig::new(SAMPLE_RATE, 16)
            .waveform(Waveform::Saw)
            .envelope(0.01, 0.1, 0.8, 1.0);
        if let Some(mut synth) = chord_synth(config.clone()) {
            group.bench_with_input(BenchmarkId::new("chord", size), &size, |b, _| {
                b.iter(|| synth.render_block(black_box(&mut buffer)))
            });
        }

        // === CHORD + SWEEPING MASTER FILTER ===
        let swept = config.clone().master_filter(MasterFilterSettings {
            cutoff: 300.0,
            resonance: 4.0,
            env_amount: 0.8,
            ..Default::default()
        });
        if let Some(mut synth) = chord_synth(swept) {
            group.bench_with_input(BenchmarkId::new("chord_master_filter", size), &size, |b, _| {
                b.iter(|| synth.render_block(black_box(&mut buffer)))
            });
        }

        // === CONTROLLER STREAM ===
        // raw pitch bend and mod wheel every block, as from a busy MIDI source
        if let Some(mut synth) = chord_synth(config) {
            let mut tick = 0u8;
            group.bench_with_input(BenchmarkId::new("chord_with_cc", size), &size, |b, _| {
                b.iter(|| {
                    tick = tick.wrapping_add(1) & 0x7F;
                    synth.handle_message(SynthMessage::Midi(RawMidi::new(0, &[0xE0, 0, tick])));
                    synth.handle_message(SynthMessage::Midi(RawMidi::new(0, &[0xB0, 1, tick])));
                    synth.render_block(black_box(&mut buffer));
                })
            });
        }
    }

    group.finish();
}
