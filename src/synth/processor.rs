#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::{
    envelope::{AdsrParams, Envelope},
    filter::StateVariableFilter,
};

/// Master low-pass stage settings.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MasterFilterSettings {
    pub cutoff: f64,
    pub resonance: f64,
    /// Octaves of cutoff sweep at full envelope, divided by four.
    pub env_amount: f64,
    pub envelope: AdsrParams,
}

impl Default for MasterFilterSettings {
    fn default() -> Self {
        Self {
            cutoff: 5_000.0,
            resonance: 1.0,
            env_amount: 0.0,
            envelope: AdsrParams::default(),
        }
    }
}

/// Low-pass filter over the mixed voice output, with an envelope that sweeps
/// the cutoff upward: `cutoff * 2^(env_amount * env * 4)`.
///
/// The envelope is independent of the voice envelopes; the owner decides
/// when to trigger and release it.
#[derive(Debug, Clone)]
pub struct SynthProcessor {
    filter: StateVariableFilter,
    envelope: Envelope,
    cutoff: f64,
    resonance: f64,
    env_amount: f64,
}

impl SynthProcessor {
    pub fn new(sample_rate: f64) -> Self {
        Self::with_settings(sample_rate, MasterFilterSettings::default())
    }

    pub fn with_settings(sample_rate: f64, settings: MasterFilterSettings) -> Self {
        let mut processor = Self {
            filter: StateVariableFilter::new(sample_rate),
            envelope: Envelope::with_params(sample_rate, settings.envelope),
            cutoff: settings.cutoff,
            resonance: settings.resonance,
            env_amount: settings.env_amount,
        };
        processor.filter.set_frequency(settings.cutoff);
        processor.filter.set_resonance(settings.resonance);
        processor
    }

    pub fn set_filter_parameters(&mut self, cutoff: f64, resonance: f64, env_amount: f64) {
        self.cutoff = cutoff;
        self.resonance = resonance;
        self.env_amount = env_amount;
        self.filter.set_frequency(cutoff);
        self.filter.set_resonance(resonance);
    }

    pub fn set_filter_envelope(&mut self, params: AdsrParams) {
        self.envelope.set_adsr(params);
    }

    pub fn trigger_filter_envelope(&mut self) {
        self.envelope.trigger();
    }

    pub fn release_filter_envelope(&mut self) {
        self.envelope.release();
    }

    pub fn filter_envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Cutoff the filter is currently running at, after modulation.
    pub fn current_cutoff(&self) -> f64 {
        self.filter.frequency()
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.filter.set_sample_rate(sample_rate);
        self.filter.set_frequency(self.cutoff);
        self.filter.set_resonance(self.resonance);
        self.envelope.set_sample_rate(sample_rate);
    }

    /// Filter `buffer` in place.
    pub fn process(&mut self, buffer: &mut [f32]) {
        let modulated = self.env_amount > 0.0;
        if !modulated {
            self.filter.set_frequency(self.cutoff);
        }

        for sample in buffer.iter_mut() {
            if modulated {
                let env = self.envelope.process();
                self.filter
                    .set_frequency(self.cutoff * 2.0_f64.powf(self.env_amount * env * 4.0));
            }
            *sample = self.filter.process_lowpass(f64::from(*sample)) as f32;
        }
    }

    pub fn reset(&mut self) {
        self.filter.reset();
        self.envelope.reset();
    }
}
