//! Per-voice render pipeline: oscillator, envelope, expression gains and the
//! optional voice filter, one sample at a time.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{
        filter::FilterType,
        oscillator::{advance_phase, generate_sample, Waveform},
        selectable::SelectableFilter,
    },
    synth::{manager::VoiceRenderer, voice::Voice},
};

/// Response, cutoff and Q pushed into every voice's filter before it renders.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterSettings {
    pub filter_type: FilterType,
    pub frequency: f64,
    pub resonance: f64,
}

impl FilterSettings {
    pub fn new(filter_type: FilterType, frequency: f64, resonance: f64) -> Self {
        Self {
            filter_type,
            frequency,
            resonance,
        }
    }

    pub(crate) fn apply(&self, filter: &mut SelectableFilter) {
        filter.set_type(self.filter_type);
        filter.set_frequency(self.frequency);
        filter.set_resonance(self.resonance);
    }
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self::new(FilterType::LowPass, 5_000.0, 0.707)
    }
}

/// The stock voice renderer.
///
/// Per sample: `envelope * velocity * volume` scales the oscillator, then
/// brightness below 1.0 darkens it to `brightness * 0.7 + 0.3` and pressure
/// above 0.0 lifts it by up to 30%. Both are plain gains, not filter
/// modulation.
#[derive(Debug, Clone)]
pub struct PolyOscillator {
    waveform: Waveform,
    anti_alias: bool,
    filter: Option<FilterSettings>,
}

impl PolyOscillator {
    pub fn new(waveform: Waveform) -> Self {
        Self {
            waveform,
            anti_alias: true,
            filter: None,
        }
    }

    pub fn with_anti_alias(mut self, enabled: bool) -> Self {
        self.anti_alias = enabled;
        self
    }

    pub fn with_filter(mut self, settings: FilterSettings) -> Self {
        self.filter = Some(settings);
        self
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
    }

    pub fn anti_alias(&self) -> bool {
        self.anti_alias
    }

    pub fn set_anti_alias(&mut self, enabled: bool) {
        self.anti_alias = enabled;
    }

    pub fn filter(&self) -> Option<FilterSettings> {
        self.filter
    }

    /// `None` bypasses the voice filters entirely.
    pub fn set_filter(&mut self, settings: Option<FilterSettings>) {
        self.filter = settings;
    }
}

impl Default for PolyOscillator {
    fn default() -> Self {
        Self::new(Waveform::default())
    }
}

/// Static gain from velocity, volume, brightness and pressure.
fn expression_gain(voice: &Voice) -> f64 {
    let mut gain = voice.velocity * voice.volume;
    if voice.brightness < 1.0 {
        gain *= voice.brightness * 0.7 + 0.3;
    }
    if voice.pressure > 0.0 {
        gain *= 1.0 + voice.pressure * 0.3;
    }
    gain
}

impl VoiceRenderer for PolyOscillator {
    fn render(&mut self, voice: &mut Voice, out: &mut [f32], sample_rate: f64) {
        if sample_rate <= 0.0 || !sample_rate.is_finite() {
            // no pitch to play, but the envelope keeps running so a released
            // voice still reaches idle and frees its slot
            for _ in out.iter() {
                voice.envelope.process();
            }
            return;
        }

        if let Some(settings) = &self.filter {
            settings.apply(&mut voice.filter);
        }

        // voice fields are public; a corrupt write must not stick until the
        // next note
        if !voice.phase.is_finite() {
            voice.phase = 0.0;
        }
        let mut frequency = voice.bent_frequency();
        if !frequency.is_finite() {
            frequency = voice.frequency;
        }
        let increment = frequency / sample_rate;
        let mut gain = expression_gain(voice);
        if !gain.is_finite() {
            gain = 0.0;
        }

        for sample in out.iter_mut() {
            let env = voice.envelope.process();
            let raw = generate_sample(voice.phase, increment, self.waveform, self.anti_alias);

            let mut value = raw * env * gain;
            if self.filter.is_some() {
                value = voice.filter.process(value);
            }

            *sample = value as f32;
            voice.phase = advance_phase(voice.phase, frequency, sample_rate);
        }
    }
}
