use std::f64::consts::PI;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
| type              | output of the network           | passes          | rejects      |
| ----------------- | ------------------------------- | --------------- | ------------ |
| low-pass          | second integrator               | below cutoff    | above cutoff |
| high-pass         | input − lp − damping·bp         | above cutoff    | below cutoff |
| band-pass         | first integrator                | around cutoff   | outside      |
| notch / band-stop | hp + lp                         | outside         | around       |

Chamberlin state-variable topology, one sample at a time:

    f  = 2·sin(π·cutoff/sample_rate), capped at 1.5
    d  = 2 / resonance

    hp = in − lp[n−1] − d·bp[n−1]
    bp = f·hp + bp[n−1]
    lp = f·bp + lp[n−1]
    notch = hp + lp

The plain Chamberlin SVF goes unstable as f approaches 2. Three guards keep
it bounded no matter what the caller asks for:

  - cutoff is clamped to [20 Hz, 0.45·sample_rate]
  - resonance is clamped to [0.5, 20]
  - the integrator states (lp, bp) are soft-clipped with 10·tanh(x/10)
    once they exceed ±10, before being fed back
*/

pub const MIN_FREQUENCY: f64 = 20.0;
pub const MAX_FREQUENCY_RATIO: f64 = 0.45;
pub const MIN_RESONANCE: f64 = 0.5;
pub const MAX_RESONANCE: f64 = 20.0;

const MAX_COEFFICIENT: f64 = 1.5;
const STATE_LIMIT: f64 = 10.0;

/// Which response a [`SelectableFilter`](crate::dsp::selectable::SelectableFilter)
/// passes through.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterType {
    #[default]
    LowPass,
    HighPass,
    BandPass,
    Notch,
    Bypass,
}

impl FilterType {
    /// Host choice index: 0..=3 select a response, anything else bypasses.
    pub fn from_index(index: u32) -> Self {
        match index {
            0 => FilterType::LowPass,
            1 => FilterType::HighPass,
            2 => FilterType::BandPass,
            3 => FilterType::Notch,
            _ => FilterType::Bypass,
        }
    }

    pub fn index(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterType::LowPass => "Lowpass",
            FilterType::HighPass => "Highpass",
            FilterType::BandPass => "Bandpass",
            FilterType::Notch => "Notch",
            FilterType::Bypass => "Bypass",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterOutputs {
    pub lowpass: f64,
    pub highpass: f64,
    pub bandpass: f64,
    pub notch: f64,
}

/// Clamp a cutoff request into the stable range for `sample_rate`.
pub fn clamp_frequency(frequency: f64, sample_rate: f64) -> f64 {
    let max = (sample_rate * MAX_FREQUENCY_RATIO).max(MIN_FREQUENCY);
    if frequency.is_nan() {
        return MIN_FREQUENCY;
    }
    frequency.clamp(MIN_FREQUENCY, max)
}

/// Clamp a resonance (Q) request into [0.5, 20].
pub fn clamp_resonance(resonance: f64) -> f64 {
    if resonance.is_nan() {
        return MIN_RESONANCE;
    }
    resonance.clamp(MIN_RESONANCE, MAX_RESONANCE)
}

#[derive(Debug, Clone)]
pub struct StateVariableFilter {
    sample_rate: f64,
    frequency: f64,
    resonance: f64,

    lowpass: f64,
    highpass: f64,
    bandpass: f64,
    notch: f64,

    prev_bandpass: f64,
    prev_lowpass: f64,
}

impl StateVariableFilter {
    /// 1 kHz cutoff, Q of 1.
    pub fn new(sample_rate: f64) -> Self {
        Self {
            sample_rate,
            frequency: clamp_frequency(1000.0, sample_rate),
            resonance: 1.0,
            lowpass: 0.0,
            highpass: 0.0,
            bandpass: 0.0,
            notch: 0.0,
            prev_bandpass: 0.0,
            prev_lowpass: 0.0,
        }
    }

    /// Out-of-range requests are clamped, never rejected.
    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = clamp_frequency(frequency, self.sample_rate);
    }

    pub fn set_resonance(&mut self, resonance: f64) {
        self.resonance = clamp_resonance(resonance);
    }

    /// Change the sample rate and re-clamp the cutoff against the new Nyquist.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.frequency = clamp_frequency(self.frequency, sample_rate);
    }

    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    pub fn resonance(&self) -> f64 {
        self.resonance
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    #[inline]
    fn coefficient(&self) -> f64 {
        let w = self.frequency / self.sample_rate;
        (2.0 * (PI * w).sin()).min(MAX_COEFFICIENT)
    }

    /// Run one sample through the network and return all four responses.
    pub fn process(&mut self, input: f64) -> FilterOutputs {
        let f = self.coefficient();
        let damping = 2.0 / self.resonance;

        self.highpass = input - self.prev_lowpass - damping * self.prev_bandpass;
        self.bandpass = f * self.highpass + self.prev_bandpass;
        self.lowpass = f * self.bandpass + self.prev_lowpass;
        self.notch = self.highpass + self.lowpass;

        self.lowpass = soft_clip(self.lowpass);
        self.bandpass = soft_clip(self.bandpass);

        self.prev_bandpass = self.bandpass;
        self.prev_lowpass = self.lowpass;

        FilterOutputs {
            lowpass: self.lowpass,
            highpass: self.highpass,
            bandpass: self.bandpass,
            notch: self.notch,
        }
    }

    pub fn process_lowpass(&mut self, input: f64) -> f64 {
        self.process(input).lowpass
    }

    pub fn process_highpass(&mut self, input: f64) -> f64 {
        self.process(input).highpass
    }

    pub fn process_bandpass(&mut self, input: f64) -> f64 {
        self.process(input).bandpass
    }

    pub fn process_notch(&mut self, input: f64) -> f64 {
        self.process(input).notch
    }

    pub fn reset(&mut self) {
        self.lowpass = 0.0;
        self.highpass = 0.0;
        self.bandpass = 0.0;
        self.notch = 0.0;
        self.prev_bandpass = 0.0;
        self.prev_lowpass = 0.0;
    }
}

#[inline]
fn soft_clip(x: f64) -> f64 {
    if x.abs() > STATE_LIMIT {
        STATE_LIMIT * (x / STATE_LIMIT).tanh()
    } else {
        x
    }
}
