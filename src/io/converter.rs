use crate::{io::midi::MidiEvent, synth::message::SynthMessage, synth::voice::NOTE_ID_UNSET};

/// Equal-tempered frequency of a MIDI key. A4 (69) = 440 Hz.
#[inline]
pub fn note_to_frequency(key: u8) -> f64 {
    440.0 * 2.0_f64.powf((f64::from(key) - 69.0) / 12.0)
}

/// 7-bit MIDI data byte to 0.0 - 1.0.
#[inline]
pub fn normalize_7bit(value: u8) -> f64 {
    f64::from(value & 0x7F) / 127.0
}

/// 14-bit pitch bend (centered at 0x2000) to -1.0 - 1.0.
#[inline]
pub fn decode_pitch_bend(lsb: u8, msb: u8) -> f64 {
    let raw = i32::from(lsb & 0x7F) | (i32::from(msb & 0x7F) << 7);
    f64::from(raw - 8192) / 8192.0
}

/// Lift a decoded MIDI event into the typed message it is equivalent to.
///
/// Note events have no id on the wire, so they carry [`NOTE_ID_UNSET`] and
/// are matched by key.
pub fn midi_to_synth(midi: MidiEvent) -> Option<SynthMessage> {
    match midi {
        MidiEvent::NoteOn {
            channel,
            key,
            velocity,
        } if velocity > 0 => Some(SynthMessage::NoteOn {
            note_id: NOTE_ID_UNSET,
            channel,
            key,
            velocity: normalize_7bit(velocity),
        }),
        MidiEvent::NoteOn { channel, key, .. } | MidiEvent::NoteOff { channel, key, .. } => {
            Some(SynthMessage::NoteOff {
                note_id: NOTE_ID_UNSET,
                channel,
                key,
            })
        }
        MidiEvent::PolyPressure {
            channel,
            key,
            pressure,
        } => Some(SynthMessage::PolyPressure {
            channel,
            key,
            pressure: normalize_7bit(pressure),
        }),
        MidiEvent::ControlChange {
            channel,
            controller,
            value,
        } => Some(SynthMessage::ControlChange {
            channel,
            controller,
            value: normalize_7bit(value),
        }),
        MidiEvent::ChannelPressure { channel, pressure } => Some(SynthMessage::ChannelPressure {
            channel,
            pressure: normalize_7bit(pressure),
        }),
        MidiEvent::PitchBend { channel, lsb, msb } => Some(SynthMessage::PitchBend {
            channel,
            value: decode_pitch_bend(lsb, msb),
        }),
        MidiEvent::ProgramChange { .. } => None,
    }
}
