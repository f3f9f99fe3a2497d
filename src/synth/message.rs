use std::collections::VecDeque;

#[cfg(feature = "rtrb")]
use rtrb::Consumer;

use crate::io::midi::RawMidi;

/// Per-note expression targets a host can address by note id.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NoteExpression {
    Volume,
    Pan,
    /// Offset in semitones.
    Tuning,
    Vibrato,
    Brightness,
    Pressure,
}

/// Everything the engine can be told between audio blocks.
///
/// `note_id` is [`NOTE_ID_UNSET`](crate::synth::voice::NOTE_ID_UNSET) when
/// the sender has no id; such notes are matched by channel and key.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SynthMessage {
    NoteOn {
        note_id: i32,
        channel: u8,
        key: u8,
        velocity: f64,
    },
    NoteOff {
        note_id: i32,
        channel: u8,
        key: u8,
    },
    /// Stop immediately, no release tail.
    NoteChoke {
        note_id: i32,
        channel: u8,
        key: u8,
    },
    /// The note reached its natural end; handled like a note-off.
    NoteEnd {
        note_id: i32,
        channel: u8,
        key: u8,
    },
    Expression {
        note_id: i32,
        channel: u8,
        expression: NoteExpression,
        value: f64,
    },
    /// `value` normalized to 0.0 - 1.0.
    ControlChange {
        channel: u8,
        controller: u8,
        value: f64,
    },
    /// `value` in -1.0 - 1.0, scaled by the router's bend range.
    PitchBend {
        channel: u8,
        value: f64,
    },
    PolyPressure {
        channel: u8,
        key: u8,
        pressure: f64,
    },
    ChannelPressure {
        channel: u8,
        pressure: f64,
    },
    Midi(RawMidi),
    AllNotesOff,
    AllSoundOff,
}

pub trait MessageReceiver {
    fn pop(&mut self) -> Option<SynthMessage>;
}

#[cfg(feature = "rtrb")]
impl MessageReceiver for Consumer<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        Consumer::pop(self).ok()
    }
}

/// Offline rendering and tests: push messages, then render.
impl MessageReceiver for VecDeque<SynthMessage> {
    fn pop(&mut self) -> Option<SynthMessage> {
        self.pop_front()
    }
}
