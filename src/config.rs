#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{envelope::AdsrParams, oscillator::Waveform},
    error::{Error, Result},
    synth::{
        manager::StealPolicy, processor::MasterFilterSettings, render::FilterSettings,
        router::DEFAULT_PITCH_BEND_RANGE,
    },
    MAX_VOICES,
};

/// Everything needed to build a [`PolySynth`](crate::synth::poly::PolySynth).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct SynthConfig {
    pub sample_rate: f64,
    /// Zero is allowed and drops every note.
    pub max_voices: usize,
    pub steal_policy: StealPolicy,
    /// Semitones at full pitch bend.
    pub pitch_bend_range: f64,
    pub envelope: AdsrParams,
    pub waveform: Waveform,
    pub anti_alias: bool,
    /// Per-voice filter; `None` leaves voices unfiltered.
    pub voice_filter: Option<FilterSettings>,
    /// Filter over the mixed output; `None` skips it.
    pub master_filter: Option<MasterFilterSettings>,
    /// Master output gain.
    pub volume: f64,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100.0,
            max_voices: 16,
            steal_policy: StealPolicy::Oldest,
            pitch_bend_range: DEFAULT_PITCH_BEND_RANGE,
            envelope: AdsrParams::default(),
            waveform: Waveform::Sine,
            anti_alias: true,
            voice_filter: None,
            master_filter: None,
            volume: 0.7,
        }
    }
}

impl SynthConfig {
    pub fn new(sample_rate: f64, max_voices: usize) -> Self {
        Self {
            sample_rate,
            max_voices,
            ..Default::default()
        }
    }

    pub fn waveform(mut self, waveform: Waveform) -> Self {
        self.waveform = waveform;
        self
    }

    pub fn envelope(mut self, attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        self.envelope = AdsrParams::new(attack, decay, sustain, release);
        self
    }

    pub fn voice_stealing(mut self, policy: StealPolicy) -> Self {
        self.steal_policy = policy;
        self
    }

    pub fn pitch_bend_range(mut self, semitones: f64) -> Self {
        self.pitch_bend_range = semitones;
        self
    }

    pub fn voice_filter(mut self, settings: FilterSettings) -> Self {
        self.voice_filter = Some(settings);
        self
    }

    pub fn master_filter(mut self, settings: MasterFilterSettings) -> Self {
        self.master_filter = Some(settings);
        self
    }

    pub fn volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    /// Reject settings the engine cannot run with. Envelope times and
    /// filter ranges are clamped later rather than rejected here.
    pub fn validate(&self) -> Result<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(Error::InvalidConfig(format!(
                "sample_rate must be positive and finite, got {}",
                self.sample_rate
            )));
        }
        if self.max_voices > MAX_VOICES {
            return Err(Error::InvalidConfig(format!(
                "max_voices must be at most {MAX_VOICES}, got {}",
                self.max_voices
            )));
        }
        if !(self.pitch_bend_range.is_finite() && self.pitch_bend_range >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "pitch_bend_range must be non-negative and finite, got {}",
                self.pitch_bend_range
            )));
        }
        if !self.volume.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "volume must be finite, got {}",
                self.volume
            )));
        }
        Ok(())
    }
}
