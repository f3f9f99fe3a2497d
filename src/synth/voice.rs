use crate::dsp::envelope::{AdsrParams, Envelope};
use crate::dsp::selectable::SelectableFilter;
use crate::io::converter::note_to_frequency;

/// Note id used by events that do not carry one (raw MIDI, host wildcards).
pub const NOTE_ID_UNSET: i32 = -1;

/// One slot of the voice pool.
///
/// Voices are never created or dropped while the engine runs: the manager
/// reinitializes a free (or stolen) slot in place for every new note.
#[derive(Debug, Clone)]
pub struct Voice {
    pub note_id: i32,
    pub channel: u8,
    pub key: u8,
    pub velocity: f64,

    /// Oscillator phase in [0, 1).
    pub phase: f64,
    /// Base pitch in Hz, before pitch bend.
    pub frequency: f64,

    /// Semitones added on top of `frequency`.
    pub pitch_bend: f64,
    pub brightness: f64,
    pub pressure: f64,
    pub volume: f64,
    /// 0 selects equal temperament.
    pub tuning_id: u64,

    pub envelope: Envelope,
    pub filter: SelectableFilter,

    active: bool,
    // value of the manager's trigger counter when this voice last started
    serial: u64,
}

impl Voice {
    pub fn new(sample_rate: f64, params: AdsrParams) -> Self {
        Self {
            note_id: NOTE_ID_UNSET,
            channel: 0,
            key: 0,
            velocity: 0.0,
            phase: 0.0,
            frequency: 0.0,
            pitch_bend: 0.0,
            brightness: 1.0,
            pressure: 0.0,
            volume: 1.0,
            tuning_id: 0,
            envelope: Envelope::with_params(sample_rate, params),
            filter: SelectableFilter::new(sample_rate, true),
            active: false,
            serial: 0,
        }
    }

    /// Reinitialize this slot for a new note and trigger its envelope.
    pub(crate) fn start(&mut self, note_id: i32, channel: u8, key: u8, velocity: f64, serial: u64) {
        self.note_id = note_id;
        self.channel = channel;
        self.key = key;
        self.velocity = velocity;
        self.phase = 0.0;
        self.frequency = note_to_frequency(key);
        self.pitch_bend = 0.0;
        self.brightness = 1.0;
        self.pressure = 0.0;
        self.volume = 1.0;
        self.tuning_id = 0;
        self.active = true;
        self.serial = serial;

        self.filter.reset();
        self.envelope.trigger();
    }

    /// Let the envelope run its release tail. The voice stays active until
    /// the manager sees the envelope go idle.
    pub fn release(&mut self) {
        self.envelope.release();
    }

    /// Silence immediately: hard-reset the envelope, no release tail.
    pub fn choke(&mut self) {
        self.envelope.reset();
    }

    pub(crate) fn deactivate(&mut self) {
        self.active = false;
    }

    pub(crate) fn clear(&mut self) {
        self.active = false;
        self.phase = 0.0;
        self.envelope.reset();
        self.filter.reset();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Pitch after bend, in Hz.
    pub fn bent_frequency(&self) -> f64 {
        if self.pitch_bend == 0.0 {
            self.frequency
        } else {
            self.frequency * 2.0_f64.powf(self.pitch_bend / 12.0)
        }
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }

    pub(crate) fn set_sample_rate(&mut self, sample_rate: f64) {
        self.envelope.set_sample_rate(sample_rate);
        self.filter.set_sample_rate(sample_rate);
    }

    pub(crate) fn matches_id(&self, note_id: i32, channel: u8) -> bool {
        self.active && self.note_id == note_id && self.channel == channel
    }

    pub(crate) fn matches_key(&self, channel: u8, key: u8) -> bool {
        self.active && self.channel == channel && self.key == key
    }
}
