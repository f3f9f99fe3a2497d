//! Translates note, controller and raw MIDI input into voice operations.

use tracing::{trace, warn};

use crate::{
    io::{converter::midi_to_synth, midi::MidiEvent},
    synth::{
        manager::SharedVoiceManager,
        message::{NoteExpression, SynthMessage},
        voice::{Voice, NOTE_ID_UNSET},
    },
};

pub const CC_MOD_WHEEL: u8 = 1;
pub const CC_VOLUME: u8 = 7;
pub const CC_SUSTAIN: u8 = 64;
pub const CC_BRIGHTNESS: u8 = 74;
pub const CC_ALL_SOUND_OFF: u8 = 120;
pub const CC_ALL_NOTES_OFF: u8 = 123;

pub const DEFAULT_PITCH_BEND_RANGE: f64 = 2.0;

/// Clamp a modulation value into range. NaN and infinities are refused so
/// they can never reach voice state.
fn sanitize(value: f64, min: f64, max: f64) -> Option<f64> {
    value.is_finite().then(|| value.clamp(min, max))
}

/// Hooks for whatever sits next to the voice engine and wants to follow the
/// incoming performance (parameter mapping, UI, logging). Every hook has a
/// no-op default; `()` ignores everything.
pub trait ModulationSink {
    fn on_note_on(&mut self, _channel: u8, _key: u8, _velocity: f64) {}

    fn on_note_off(&mut self, _channel: u8, _key: u8) {}

    /// Every controller except all-sound-off and all-notes-off lands here,
    /// including the ones the router already applied to voices.
    fn on_modulation(&mut self, _channel: u8, _controller: u8, _value: f64) {}

    /// `value` is the normalized bend (-1.0 - 1.0), before range scaling.
    fn on_pitch_bend(&mut self, _channel: u8, _value: f64) {}

    fn on_poly_pressure(&mut self, _channel: u8, _key: u8, _pressure: f64) {}
}

impl ModulationSink for () {}

/// Routes events onto a shared voice pool.
///
/// Events with a note id (>= 0) address voices by `(note_id, channel)`;
/// events without one, raw MIDI included, address them by `(channel, key)`.
pub struct NoteRouter<S = ()> {
    voices: SharedVoiceManager,
    pitch_bend_range: f64,
    sink: S,
}

impl NoteRouter<()> {
    pub fn new(voices: SharedVoiceManager) -> Self {
        Self::with_sink(voices, ())
    }
}

impl<S: ModulationSink> NoteRouter<S> {
    pub fn with_sink(voices: SharedVoiceManager, sink: S) -> Self {
        Self {
            voices,
            pitch_bend_range: DEFAULT_PITCH_BEND_RANGE,
            sink,
        }
    }

    pub fn voices(&self) -> &SharedVoiceManager {
        &self.voices
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Semitones reached at full bend.
    pub fn set_pitch_bend_range(&mut self, semitones: f64) {
        self.pitch_bend_range = semitones;
    }

    pub fn pitch_bend_range(&self) -> f64 {
        self.pitch_bend_range
    }

    /// Returns whether a voice was started. A pool with no capacity drops
    /// the note.
    pub fn note_on(&mut self, note_id: i32, channel: u8, key: u8, velocity: f64) -> bool {
        let started = self.voices.allocate_voice(note_id, channel, key, velocity);
        if !started {
            warn!(note_id, channel, key, "no voice available, note dropped");
        }
        self.sink.on_note_on(channel, key, velocity);
        started
    }

    pub fn note_off(&mut self, note_id: i32, channel: u8, key: u8) {
        let mut voices = self.voices.write();
        if note_id == NOTE_ID_UNSET {
            voices.release_voices_by_key(channel, key);
        } else {
            voices.release_voice(note_id, channel);
        }
        drop(voices);

        self.sink.on_note_off(channel, key);
    }

    /// Silence a note without a release tail.
    pub fn note_choke(&mut self, note_id: i32, channel: u8, key: u8) {
        let mut voices = self.voices.write();
        if note_id == NOTE_ID_UNSET {
            voices.choke_voices_by_key(channel, key);
        } else {
            voices.choke_voice(note_id, channel);
        }
    }

    pub fn note_end(&mut self, note_id: i32, channel: u8, key: u8) {
        self.note_off(note_id, channel, key);
    }

    /// Per-note expression. Without a note id it applies to the whole channel.
    pub fn note_expression(
        &mut self,
        note_id: i32,
        channel: u8,
        expression: NoteExpression,
        value: f64,
    ) {
        if !value.is_finite() {
            trace!(note_id, channel, ?expression, "ignoring non-finite expression value");
            return;
        }

        let apply = |voice: &mut Voice| match expression {
            NoteExpression::Volume => voice.volume = value,
            NoteExpression::Tuning => voice.pitch_bend = value,
            NoteExpression::Brightness => voice.brightness = value,
            NoteExpression::Pressure => voice.pressure = value,
            NoteExpression::Pan | NoteExpression::Vibrato => {}
        };

        let mut voices = self.voices.write();
        if note_id == NOTE_ID_UNSET {
            voices.apply_to_channel(channel, apply);
        } else if let Some(voice) = voices.voice_by_note_id_mut(note_id, channel) {
            apply(voice);
        }
    }

    /// `value` is normalized to 0.0 - 1.0; anything outside is clamped.
    pub fn control_change(&mut self, channel: u8, controller: u8, value: f64) {
        match controller {
            CC_ALL_SOUND_OFF => return self.all_sound_off(channel),
            CC_ALL_NOTES_OFF => return self.all_notes_off(channel),
            _ => {}
        }

        let Some(value) = sanitize(value, 0.0, 1.0) else {
            trace!(channel, controller, "ignoring non-finite controller value");
            return;
        };

        match controller {
            CC_MOD_WHEEL | CC_BRIGHTNESS => self
                .voices
                .write()
                .apply_to_channel(channel, |v| v.brightness = value),
            CC_VOLUME => self
                .voices
                .write()
                .apply_to_channel(channel, |v| v.volume = value),
            // sustain pedal latching is not implemented; the sink still sees it
            CC_SUSTAIN => {}
            _ => {}
        }

        self.sink.on_modulation(channel, controller, value);
    }

    /// `value` in -1.0 - 1.0, scaled by the bend range onto every voice on
    /// `channel`. Out-of-range bends are clamped, non-finite ones dropped.
    pub fn pitch_bend(&mut self, channel: u8, value: f64) {
        let Some(value) = sanitize(value, -1.0, 1.0) else {
            trace!(channel, "ignoring non-finite pitch bend");
            return;
        };

        let semitones = value * self.pitch_bend_range;
        self.voices
            .write()
            .apply_to_channel(channel, |v| v.pitch_bend = semitones);
        self.sink.on_pitch_bend(channel, value);
    }

    pub fn poly_pressure(&mut self, channel: u8, key: u8, pressure: f64) {
        let Some(pressure) = sanitize(pressure, 0.0, 1.0) else {
            trace!(channel, key, "ignoring non-finite poly pressure");
            return;
        };

        self.voices.write().apply_to_channel(channel, |v| {
            if v.key == key {
                v.pressure = pressure;
            }
        });
        self.sink.on_poly_pressure(channel, key, pressure);
    }

    pub fn channel_pressure(&mut self, channel: u8, pressure: f64) {
        let Some(pressure) = sanitize(pressure, 0.0, 1.0) else {
            trace!(channel, "ignoring non-finite channel pressure");
            return;
        };

        self.voices
            .write()
            .apply_to_channel(channel, |v| v.pressure = pressure);
    }

    /// Release every voice on `channel`.
    pub fn all_notes_off(&mut self, channel: u8) {
        self.voices.write().apply_to_channel(channel, Voice::release);
    }

    /// Hard-stop every voice on `channel`.
    pub fn all_sound_off(&mut self, channel: u8) {
        self.voices.write().apply_to_channel(channel, Voice::choke);
    }

    /// Release every voice on every channel.
    pub fn release_all(&mut self) {
        self.voices.release_all_voices();
    }

    /// Hard-stop every voice on every channel.
    pub fn silence_all(&mut self) {
        self.voices.apply_to_all_voices(Voice::choke);
    }

    /// Decode and route up to three raw MIDI 1.0 bytes. Short, system and
    /// program change messages are ignored.
    pub fn handle_midi(&mut self, port: u16, bytes: &[u8]) {
        match MidiEvent::parse(bytes) {
            Some(event) => self.handle_event(event),
            None => trace!(port, ?bytes, "ignoring malformed or system MIDI message"),
        }
    }

    pub fn handle_event(&mut self, event: MidiEvent) {
        match midi_to_synth(event) {
            Some(message) => self.handle_message(message),
            None => trace!(?event, "ignoring unsupported MIDI message"),
        }
    }

    pub fn handle_message(&mut self, message: SynthMessage) {
        match message {
            SynthMessage::NoteOn {
                note_id,
                channel,
                key,
                velocity,
            } => {
                self.note_on(note_id, channel, key, velocity);
            }
            SynthMessage::NoteOff {
                note_id,
                channel,
                key,
            } => self.note_off(note_id, channel, key),
            SynthMessage::NoteChoke {
                note_id,
                channel,
                key,
            } => self.note_choke(note_id, channel, key),
            SynthMessage::NoteEnd {
                note_id,
                channel,
                key,
            } => self.note_end(note_id, channel, key),
            SynthMessage::Expression {
                note_id,
                channel,
                expression,
                value,
            } => self.note_expression(note_id, channel, expression, value),
            SynthMessage::ControlChange {
                channel,
                controller,
                value,
            } => self.control_change(channel, controller, value),
            SynthMessage::PitchBend { channel, value } => self.pitch_bend(channel, value),
            SynthMessage::PolyPressure {
                channel,
                key,
                pressure,
            } => self.poly_pressure(channel, key, pressure),
            SynthMessage::ChannelPressure { channel, pressure } => {
                self.channel_pressure(channel, pressure)
            }
            SynthMessage::Midi(raw) => self.handle_midi(raw.port, raw.bytes()),
            SynthMessage::AllNotesOff => self.release_all(),
            SynthMessage::AllSoundOff => self.silence_all(),
        }
    }
}
