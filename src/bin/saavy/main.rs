//! saavy - plays a short chord progression through the voice engine
//!
//! Run with: cargo run
//! Set RUST_LOG=saavy_synth=debug to watch voice steals and filter resets.

use std::{thread, time::Duration};

use color_eyre::eyre::{Result as EyreResult, WrapErr};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use rtrb::{Producer, RingBuffer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use saavy_synth::{
    dsp::{FilterType, Waveform},
    io::RawMidi,
    synth::{FilterSettings, PolySynth, SynthMessage},
    Error, SynthConfig, MAX_BLOCK_SIZE,
};

const CHORD_LENGTH: Duration = Duration::from_millis(900);
const GAP: Duration = Duration::from_millis(100);

// C major, A minor, F major, G major, voiced around middle C
const PROGRESSION: [[u8; 3]; 4] = [[60, 64, 67], [57, 60, 64], [53, 57, 60], [55, 59, 62]];

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| Error::Stream("no default output device available".into()))?;
    let config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = config.sample_rate().0 as f64;
    let channels = config.channels() as usize;
    info!(sample_rate, channels, "audio device ready");

    let synth_config = SynthConfig::new(sample_rate, 16)
        .waveform(Waveform::Saw)
        .envelope(0.02, 0.2, 0.6, 0.4)
        .voice_filter(FilterSettings::new(FilterType::LowPass, 2_400.0, 1.2));

    let (mut tx, rx) = RingBuffer::<SynthMessage>::new(256);
    let mut synth = PolySynth::new(synth_config, rx)?;
    let voices = synth.voices().clone();

    let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];
    let stream = device.build_output_stream(
        &config.into(),
        move |data: &mut [f32], _| {
            let total_frames = data.len() / channels;
            let mut frames_written = 0;

            while frames_written < total_frames {
                let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                let block = &mut render_buf[..frames_to_render];
                synth.render_block(block);

                // mono to all channels
                let out_off = frames_written * channels;
                for (i, &s) in block.iter().enumerate() {
                    for ch in 0..channels {
                        data[out_off + i * channels + ch] = s;
                    }
                }

                frames_written += frames_to_render;
            }
        },
        |err| warn!(%err, "audio stream error"),
        None,
    )?;
    stream.play()?;

    let mut next_id = 0;
    for chord in PROGRESSION {
        let first_id = next_id;
        for &key in &chord {
            send(
                &mut tx,
                SynthMessage::NoteOn {
                    note_id: next_id,
                    channel: 0,
                    key,
                    velocity: 0.6,
                },
            );
            next_id += 1;
        }

        thread::sleep(CHORD_LENGTH);
        info!(active = voices.active_voice_count(), "chord sounding");

        for (offset, &key) in chord.iter().enumerate() {
            send(
                &mut tx,
                SynthMessage::NoteOff {
                    note_id: first_id + offset as i32,
                    channel: 0,
                    key,
                },
            );
        }
        thread::sleep(GAP);
    }

    // a final root note over raw MIDI, bent up a whole step halfway through
    send(&mut tx, SynthMessage::Midi(RawMidi::new(0, &[0x90, 48, 100])));
    thread::sleep(CHORD_LENGTH);
    send(&mut tx, SynthMessage::Midi(RawMidi::new(0, &[0xE0, 0x7F, 0x7F])));
    thread::sleep(CHORD_LENGTH);
    send(&mut tx, SynthMessage::Midi(RawMidi::new(0, &[0x80, 48, 0])));

    // let the release tail ring out
    thread::sleep(Duration::from_millis(600));

    let stats = voices.read().filter_statistics();
    info!(active = voices.active_voice_count(), %stats, "done");
    Ok(())
}

fn send(tx: &mut Producer<SynthMessage>, msg: SynthMessage) {
    if tx.push(msg).is_err() {
        warn!(?msg, "message queue full, dropping message");
    }
}
