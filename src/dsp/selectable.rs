//! Response selection and NaN/Inf protection on top of [`StateVariableFilter`].

use std::fmt;

use tracing::debug;

use crate::dsp::filter::{clamp_frequency, clamp_resonance, FilterType, StateVariableFilter};

/// Counters describing what safe mode has had to correct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterStatistics {
    pub nan_count: u64,
    pub inf_count: u64,
    pub reset_count: u64,
    pub safe_mode: bool,
    pub filter_type: FilterType,
}

impl FilterStatistics {
    pub fn has_errors(&self) -> bool {
        self.nan_count > 0 || self.inf_count > 0
    }

    /// Sum counters from several filters, e.g. one per voice.
    pub fn merge(&mut self, other: &FilterStatistics) {
        self.nan_count += other.nan_count;
        self.inf_count += other.inf_count;
        self.reset_count += other.reset_count;
    }
}

impl fmt::Display for FilterStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.has_errors() {
            return f.write_str("Filter: no errors detected");
        }
        write!(
            f,
            "Filter ({}): {} NaN, {} Inf, {} resets (safe mode: {})",
            self.filter_type, self.nan_count, self.inf_count, self.reset_count, self.safe_mode
        )
    }
}

#[derive(Debug, Clone)]
pub struct SelectableFilter {
    filter: StateVariableFilter,
    filter_type: FilterType,
    safe_mode: bool,
    sample_rate: f64,

    nan_count: u64,
    inf_count: u64,
    reset_count: u64,
}

impl SelectableFilter {
    pub fn new(sample_rate: f64, safe_mode: bool) -> Self {
        Self {
            filter: StateVariableFilter::new(sample_rate),
            filter_type: FilterType::LowPass,
            safe_mode,
            sample_rate,
            nan_count: 0,
            inf_count: 0,
            reset_count: 0,
        }
    }

    pub fn set_type(&mut self, filter_type: FilterType) {
        self.filter_type = filter_type;
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn set_frequency(&mut self, frequency: f64) {
        self.filter
            .set_frequency(clamp_frequency(frequency, self.sample_rate));
    }

    pub fn set_resonance(&mut self, resonance: f64) {
        self.filter.set_resonance(clamp_resonance(resonance));
    }

    pub fn frequency(&self) -> f64 {
        self.filter.frequency()
    }

    pub fn resonance(&self) -> f64 {
        self.filter.resonance()
    }

    pub fn set_safe_mode(&mut self, enabled: bool) {
        self.safe_mode = enabled;
    }

    pub fn is_safe_mode_enabled(&self) -> bool {
        self.safe_mode
    }

    /// Filter one sample through the selected response.
    ///
    /// In safe mode a NaN or infinite result resets the filter state and
    /// yields silence for that sample instead.
    pub fn process(&mut self, input: f64) -> f64 {
        let output = match self.filter_type {
            FilterType::LowPass => self.filter.process_lowpass(input),
            FilterType::HighPass => self.filter.process_highpass(input),
            FilterType::BandPass => self.filter.process_bandpass(input),
            FilterType::Notch => self.filter.process_notch(input),
            FilterType::Bypass => input,
        };

        if !self.safe_mode || output.is_finite() {
            return output;
        }

        if output.is_nan() {
            self.nan_count += 1;
        } else {
            self.inf_count += 1;
        }
        self.filter.reset();
        self.reset_count += 1;
        debug!(
            filter_type = %self.filter_type,
            resets = self.reset_count,
            "non-finite filter output, state reset"
        );
        0.0
    }

    /// Filter `buffer` in place.
    pub fn process_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process(f64::from(*sample)) as f32;
        }
    }

    /// Filter `input` into `output`; the shorter of the two sets the length.
    pub fn process_buffer_into(&mut self, input: &[f32], output: &mut [f32]) {
        for (out, &x) in output.iter_mut().zip(input) {
            *out = self.process(f64::from(x)) as f32;
        }
    }

    /// Clear the filter's feedback state. Counters are kept.
    pub fn reset(&mut self) {
        self.filter.reset();
    }

    /// Rebuild the inner filter for a new rate, keeping cutoff and Q.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        let frequency = self.filter.frequency();
        let resonance = self.filter.resonance();

        self.sample_rate = sample_rate;
        self.filter = StateVariableFilter::new(sample_rate);
        self.filter.set_frequency(frequency);
        self.filter.set_resonance(resonance);
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn statistics(&self) -> FilterStatistics {
        FilterStatistics {
            nan_count: self.nan_count,
            inf_count: self.inf_count,
            reset_count: self.reset_count,
            safe_mode: self.safe_mode,
            filter_type: self.filter_type,
        }
    }

    pub fn reset_statistics(&mut self) {
        self.nan_count = 0;
        self.inf_count = 0;
        self.reset_count = 0;
    }
}
