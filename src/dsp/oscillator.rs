#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::f64::consts::TAU;

/*
Oscillator Kernel
=================

Stateless waveform math. Every function here is pure: the caller owns the
phase and advances it, which is what lets each voice keep its own oscillator
state without sharing anything.

Vocabulary
----------

  phase       Position inside one cycle, normalized to [0, 1).
              0.0 is the start of the cycle, 0.5 the middle.

  increment   How far the phase moves per sample: frequency / sample_rate.
              At 440 Hz and 48 kHz that is ~0.00917.

  naive       A waveform computed straight from the phase with no
              band-limiting. Cheap, but the hard edges of saw and square
              contain harmonics above Nyquist that fold back (alias).


Naive Shapes
------------

    sine       sin(2π·phase)
    saw        2·phase − 1              (ramps −1 → +1, drops at the wrap)
    square     +1 below 0.5, −1 above   (edges at 0.0 and 0.5)
    triangle   4·phase − 1 rising, −4·phase + 3 falling
    noise      fract(sin(phase·12.9898 + 78.233)·43758.5453) mapped to ±1

Noise is a hash of the phase, not a random number generator. The same phase
always yields the same sample, so rendering is reproducible.


PolyBLEP
--------

A discontinuity in a naive waveform is a "step". PolyBLEP (polynomial
band-limited step) subtracts a quadratic residual around each step so the
edge is spread over one sample on either side:

    just after the step   (phase < dt):      x = phase / dt
                                             residual = 2x − x² − 1
    just before the step  (phase > 1 − dt):  x = (phase − 1) / dt
                                             residual = x² + 2x + 1

At the step itself the residual is ±1, exactly cancelling the jump; one
increment away it has faded to 0. Saw has one step (at the wrap). Square
has two: the wrap and phase 0.5, where the step goes the other way, so the
residual is evaluated half a cycle later and subtracted.
*/

/// Oscillator waveform selection.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Saw,
    Square,
    Triangle,
    Noise,
}

impl Waveform {
    /// Map a host choice-parameter index onto a waveform. Unknown indices
    /// fall back to sine.
    pub fn from_index(index: u32) -> Self {
        match index {
            1 => Waveform::Saw,
            2 => Waveform::Square,
            3 => Waveform::Triangle,
            4 => Waveform::Noise,
            _ => Waveform::Sine,
        }
    }

    pub fn index(self) -> u32 {
        self as u32
    }

    /// Saw and square have hard edges that PolyBLEP can smooth.
    pub fn has_discontinuity(self) -> bool {
        matches!(self, Waveform::Saw | Waveform::Square)
    }
}

/// Naive (non band-limited) sample for `phase` in [0, 1).
#[inline]
pub fn generate_waveform_sample(phase: f64, waveform: Waveform) -> f64 {
    match waveform {
        Waveform::Sine => (TAU * phase).sin(),
        Waveform::Saw => 2.0 * phase - 1.0,
        Waveform::Square => {
            if phase < 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        Waveform::Triangle => {
            if phase < 0.5 {
                4.0 * phase - 1.0
            } else {
                -4.0 * phase + 3.0
            }
        }
        Waveform::Noise => {
            let x = (phase * 12.9898 + 78.233).sin() * 43758.5453;
            2.0 * (x - x.floor()) - 1.0
        }
    }
}

/// Advance `phase` by one sample at `frequency`, wrapped into [0, 1).
#[inline]
pub fn advance_phase(phase: f64, frequency: f64, sample_rate: f64) -> f64 {
    let next = phase + frequency / sample_rate;
    let wrapped = next - next.floor();
    // fract of a value a hair below an integer can round up to exactly 1.0
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

/// Residual of the polynomial band-limited step at `phase`, or 0.0 when the
/// phase is more than one increment away from the wrap.
#[inline]
fn poly_blep(phase: f64, increment: f64) -> f64 {
    if phase < increment {
        let x = phase / increment;
        x + x - x * x - 1.0
    } else if phase > 1.0 - increment {
        let x = (phase - 1.0) / increment;
        x * x + x + x + 1.0
    } else {
        0.0
    }
}

/// Band-limited sawtooth.
#[inline]
pub fn generate_polyblep_saw(phase: f64, increment: f64) -> f64 {
    let naive = 2.0 * phase - 1.0;
    naive - poly_blep(phase, increment)
}

/// Band-limited square, corrected at the wrap and at phase 0.5.
#[inline]
pub fn generate_polyblep_square(phase: f64, increment: f64) -> f64 {
    let naive = if phase < 0.5 { 1.0 } else { -1.0 };
    let half = (phase + 0.5).fract();
    naive + poly_blep(phase, increment) - poly_blep(half, increment)
}

/// One oscillator sample, band-limited when `anti_alias` is set and the
/// waveform has a discontinuity.
#[inline]
pub fn generate_sample(phase: f64, increment: f64, waveform: Waveform, anti_alias: bool) -> f64 {
    if anti_alias {
        match waveform {
            Waveform::Saw => return generate_polyblep_saw(phase, increment),
            Waveform::Square => return generate_polyblep_square(phase, increment),
            _ => {}
        }
    }
    generate_waveform_sample(phase, waveform)
}
