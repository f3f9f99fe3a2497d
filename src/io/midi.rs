/// A channel-voice MIDI 1.0 message, decoded from its status and data bytes.
///
/// Channels are 0-based (0 - 15). Data values are the raw 7-bit bytes;
/// normalization happens in [`converter`](crate::io::converter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, key: u8, velocity: u8 },
    NoteOff { channel: u8, key: u8, velocity: u8 },
    PolyPressure { channel: u8, key: u8, pressure: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
    ChannelPressure { channel: u8, pressure: u8 },
    PitchBend { channel: u8, lsb: u8, msb: u8 },
}

impl MidiEvent {
    /// Decode a raw message. Returns `None` for system messages, stray data
    /// bytes, and messages shorter than their status requires.
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let (&status, data) = bytes.split_first()?;
        if status < 0x80 {
            return None;
        }
        let channel = status & 0x0F;

        let two = |data: &[u8]| -> Option<(u8, u8)> {
            match data {
                [a, b, ..] => Some((a & 0x7F, b & 0x7F)),
                _ => None,
            }
        };
        let one = |data: &[u8]| -> Option<u8> { data.first().map(|a| a & 0x7F) };

        match status & 0xF0 {
            0x80 => two(data).map(|(key, velocity)| MidiEvent::NoteOff {
                channel,
                key,
                velocity,
            }),
            0x90 => two(data).map(|(key, velocity)| MidiEvent::NoteOn {
                channel,
                key,
                velocity,
            }),
            0xA0 => two(data).map(|(key, pressure)| MidiEvent::PolyPressure {
                channel,
                key,
                pressure,
            }),
            0xB0 => two(data).map(|(controller, value)| MidiEvent::ControlChange {
                channel,
                controller,
                value,
            }),
            0xC0 => one(data).map(|program| MidiEvent::ProgramChange { channel, program }),
            0xD0 => one(data).map(|pressure| MidiEvent::ChannelPressure { channel, pressure }),
            0xE0 => two(data).map(|(lsb, msb)| MidiEvent::PitchBend { channel, lsb, msb }),
            _ => None,
        }
    }

    pub fn channel(&self) -> u8 {
        match *self {
            MidiEvent::NoteOn { channel, .. }
            | MidiEvent::NoteOff { channel, .. }
            | MidiEvent::PolyPressure { channel, .. }
            | MidiEvent::ControlChange { channel, .. }
            | MidiEvent::ProgramChange { channel, .. }
            | MidiEvent::ChannelPressure { channel, .. }
            | MidiEvent::PitchBend { channel, .. } => channel,
        }
    }
}

/// Up to three raw MIDI 1.0 bytes plus the note port they arrived on.
///
/// Fixed-size so it can travel through a realtime message queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMidi {
    pub port: u16,
    data: [u8; 3],
    len: u8,
}

impl RawMidi {
    /// Keeps at most the first three bytes of `bytes`.
    pub fn new(port: u16, bytes: &[u8]) -> Self {
        let mut data = [0u8; 3];
        let len = bytes.len().min(3);
        data[..len].copy_from_slice(&bytes[..len]);
        Self {
            port,
            data,
            len: len as u8,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }

    pub fn decode(&self) -> Option<MidiEvent> {
        MidiEvent::parse(self.bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_note_messages() {
        assert_eq!(
            MidiEvent::parse(&[0x93, 60, 100]),
            Some(MidiEvent::NoteOn {
                channel: 3,
                key: 60,
                velocity: 100
            })
        );
        assert_eq!(
            MidiEvent::parse(&[0x80, 61, 0]),
            Some(MidiEvent::NoteOff {
                channel: 0,
                key: 61,
                velocity: 0
            })
        );
    }

    #[test]
    fn short_messages_are_rejected() {
        assert_eq!(MidiEvent::parse(&[]), None);
        assert_eq!(MidiEvent::parse(&[0x90]), None);
        assert_eq!(MidiEvent::parse(&[0x90, 60]), None);
        assert_eq!(MidiEvent::parse(&[0xE0, 0]), None);
        assert_eq!(MidiEvent::parse(&[0xD0]), None);
    }

    #[test]
    fn two_byte_messages_need_one_data_byte() {
        assert_eq!(
            MidiEvent::parse(&[0xD5, 64]),
            Some(MidiEvent::ChannelPressure {
                channel: 5,
                pressure: 64
            })
        );
    }

    #[test]
    fn system_and_data_bytes_are_ignored() {
        assert_eq!(MidiEvent::parse(&[0xF8]), None);
        assert_eq!(MidiEvent::parse(&[0xF0, 1, 2]), None);
        assert_eq!(MidiEvent::parse(&[0x40, 1, 2]), None);
    }

    #[test]
    fn raw_midi_truncates_to_three_bytes() {
        let raw = RawMidi::new(1, &[0xB0, 7, 100, 99]);
        assert_eq!(raw.bytes(), &[0xB0, 7, 100]);
        assert_eq!(raw.port, 1);
        assert_eq!(raw.decode().map(|e| e.channel()), Some(0));

        let short = RawMidi::new(0, &[0x90, 60]);
        assert_eq!(short.decode(), None);
    }
}
