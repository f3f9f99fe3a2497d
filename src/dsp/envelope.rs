#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/*
ADSR Envelope Implementation
============================

Per-voice gain contour. One `Envelope` lives inside every voice and is
advanced one sample at a time by the render pipeline.

Vocabulary
----------

  level       The envelope's current output value (0.0 to 1.0). This multiplies
              the oscillator output to control amplitude over time.

  stage       Which phase of the envelope we're in: Idle, Attack, Decay,
              Sustain, or Release. A state machine governs transitions.

  elapsed     Samples spent in the current stage. Progress through a timed
              stage is elapsed / (stage_time * sample_rate).


The Shape
---------

  Level
    1.0 ┐     ╱╲
        │    ╱  ╲___________
    S   │   ╱               ╲
        │  ╱                 ╲_
    0.0 └─╱────────────────────‾‾──→ Time
        Attack Decay  Sustain  Release
         (A)   (D)      (S)      (R)

Attack and decay are linear ramps. Release is quadratic:

    level = release_start * (1 - progress)²

which falls quickly at first and eases into silence, closer to how a
struck or plucked sound dies away than a straight line.


The State Machine
-----------------

    Idle ──trigger──→ Attack ──level=1──→ Decay ──level=S──→ Sustain
      ↑                  │                  │                  │
      │                  └──────release─────┴──────────────────┘
      │                                     ↓
      └──────────────level=0─────────── Release

  trigger   Restarts Attack from level 0, from any stage.
  release   Moves Attack/Decay/Sustain into Release, snapshotting the
            current level as the starting point (no jump in output).
  reset     Hard stop: straight to Idle at level 0. Used for choke and
            all-sound-off where a release tail is not wanted.

A zero-length stage completes on the sample it is entered.
*/

const MAX_STAGE_SECONDS: f64 = 10.0;

/// The current stage of the envelope state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeStage {
    Idle,
    Attack,
    Decay,
    Sustain,
    Release,
}

/// Attack/decay/release times in seconds and sustain level (0.0 - 1.0).
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdsrParams {
    pub attack: f64,
    pub decay: f64,
    pub sustain: f64,
    pub release: f64,
}

impl AdsrParams {
    pub fn new(attack: f64, decay: f64, sustain: f64, release: f64) -> Self {
        Self {
            attack,
            decay,
            sustain,
            release,
        }
    }

    /// Clamp times to [0, 10] s and sustain to [0, 1]. NaN collapses to 0.
    pub fn clamped(self) -> Self {
        Self {
            attack: clamp_or_zero(self.attack, MAX_STAGE_SECONDS),
            decay: clamp_or_zero(self.decay, MAX_STAGE_SECONDS),
            sustain: clamp_or_zero(self.sustain, 1.0),
            release: clamp_or_zero(self.release, MAX_STAGE_SECONDS),
        }
    }
}

impl Default for AdsrParams {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.7,
            release: 0.3,
        }
    }
}

fn clamp_or_zero(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, max)
    }
}

#[derive(Debug, Clone)]
pub struct Envelope {
    params: AdsrParams,
    sample_rate: f64,

    stage: EnvelopeStage,
    level: f64,
    elapsed: u64,

    // level captured when release began
    release_level: f64,
}

impl Envelope {
    pub fn new(sample_rate: f64) -> Self {
        Self::with_params(sample_rate, AdsrParams::default())
    }

    pub fn with_params(sample_rate: f64, params: AdsrParams) -> Self {
        Self {
            params: params.clamped(),
            sample_rate,
            stage: EnvelopeStage::Idle,
            level: 0.0,
            elapsed: 0,
            release_level: 0.0,
        }
    }

    pub fn set_adsr(&mut self, params: AdsrParams) {
        self.params = params.clamped();
    }

    pub fn params(&self) -> AdsrParams {
        self.params
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Start the attack from zero, whatever stage we were in.
    pub fn trigger(&mut self) {
        self.stage = EnvelopeStage::Attack;
        self.level = 0.0;
        self.elapsed = 0;
    }

    /// Enter the release stage from the current level.
    ///
    /// No-op when idle or already releasing.
    pub fn release(&mut self) {
        if matches!(self.stage, EnvelopeStage::Idle | EnvelopeStage::Release) {
            return;
        }
        self.release_level = self.level;
        self.stage = EnvelopeStage::Release;
        self.elapsed = 0;
    }

    /// Hard stop to idle.
    pub fn reset(&mut self) {
        self.stage = EnvelopeStage::Idle;
        self.level = 0.0;
        self.elapsed = 0;
        self.release_level = 0.0;
    }

    /// Advance one sample and return the level for it.
    pub fn process(&mut self) -> f64 {
        match self.stage {
            EnvelopeStage::Idle => {
                self.level = 0.0;
            }

            EnvelopeStage::Attack => match self.progress(self.params.attack) {
                Some(progress) if progress < 1.0 => {
                    self.level = progress;
                    self.elapsed += 1;
                }
                _ => {
                    self.level = 1.0;
                    self.enter(EnvelopeStage::Decay);
                }
            },

            EnvelopeStage::Decay => {
                let sustain = self.params.sustain;
                match self.progress(self.params.decay) {
                    Some(progress) if progress < 1.0 => {
                        self.level = 1.0 - progress * (1.0 - sustain);
                        self.elapsed += 1;
                    }
                    _ => {
                        self.level = sustain;
                        self.enter(EnvelopeStage::Sustain);
                    }
                }
            }

            EnvelopeStage::Sustain => {
                self.level = self.params.sustain;
            }

            EnvelopeStage::Release => match self.progress(self.params.release) {
                Some(progress) if progress < 1.0 => {
                    let remaining = 1.0 - progress;
                    self.level = self.release_level * remaining * remaining;
                    self.elapsed += 1;
                }
                _ => {
                    self.level = 0.0;
                    self.enter(EnvelopeStage::Idle);
                }
            },
        }

        self.level = self.level.clamp(0.0, 1.0);
        self.level
    }

    /// Fill `buffer` with consecutive envelope levels.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process() as f32;
        }
    }

    pub fn is_active(&self) -> bool {
        self.stage != EnvelopeStage::Idle
    }

    pub fn level(&self) -> f64 {
        self.level
    }

    pub fn stage(&self) -> EnvelopeStage {
        self.stage
    }

    /// Fraction of a timed stage already covered, or `None` when the stage
    /// has zero length (or the sample rate is unusable) and should complete
    /// immediately.
    fn progress(&self, seconds: f64) -> Option<f64> {
        let total = seconds * self.sample_rate;
        if total > 0.0 && total.is_finite() {
            Some(self.elapsed as f64 / total)
        } else {
            None
        }
    }

    fn enter(&mut self, stage: EnvelopeStage) {
        self.stage = stage;
        self.elapsed = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SAMPLE_RATE: f64 = 1_000.0;

    fn render_samples(env: &mut Envelope, samples: usize) -> f64 {
        let mut last = 0.0;
        for _ in 0..samples {
            last = env.process();
        }
        last
    }

    #[test]
    fn starts_idle_and_silent() {
        let mut env = Envelope::new(SAMPLE_RATE);
        assert!(!env.is_active());
        assert_eq!(env.process(), 0.0);
        assert_eq!(env.stage(), EnvelopeStage::Idle);
    }

    #[test]
    fn attack_reaches_full_level() {
        let mut env = Envelope::with_params(SAMPLE_RATE, AdsrParams::new(0.01, 0.1, 0.7, 0.2));
        env.trigger();
        assert_eq!(env.stage(), EnvelopeStage::Attack);

        // 10 samples of ramp, the peak sample, then the first decay sample
        let level = render_samples(&mut env, 12);

        assert_relative_eq!(level, 1.0);
        assert_eq!(env.stage(), EnvelopeStage::Decay);
    }

    #[test]
    fn sustain_holds_target_level() {
        let sustain = 0.6;
        let mut env = Envelope::with_params(SAMPLE_RATE, AdsrParams::new(0.01, 0.05, sustain, 0.2));
        env.trigger();
        render_samples(&mut env, 10 + 50 + 5);

        assert_eq!(env.stage(), EnvelopeStage::Sustain);
        assert_relative_eq!(env.level(), sustain);
        assert_relative_eq!(render_samples(&mut env, 100), sustain);
    }

    #[test]
    fn release_starts_from_current_level() {
        let mut env = Envelope::with_params(SAMPLE_RATE, AdsrParams::new(0.1, 0.1, 0.5, 0.1));
        env.trigger();
        let before = render_samples(&mut env, 40);
        assert!(before > 0.3 && before < 0.5);

        env.release();
        assert_eq!(env.stage(), EnvelopeStage::Release);
        // first release sample sits exactly on the captured level
        assert_relative_eq!(env.process(), before);
    }

    #[test]
    fn release_falls_back_to_idle() {
        let release = 0.03;
        let mut env = Envelope::with_params(SAMPLE_RATE, AdsrParams::new(0.01, 0.05, 0.5, release));
        env.trigger();
        render_samples(&mut env, 20);

        env.release();
        let mut previous = env.level();
        for _ in 0..(release * SAMPLE_RATE) as usize + 2 {
            let level = env.process();
            assert!(level <= previous + 1e-12, "release must not rise");
            previous = level;
        }

        assert_eq!(env.level(), 0.0);
        assert_eq!(env.stage(), EnvelopeStage::Idle);
        assert!(!env.is_active());
    }

    #[test]
    fn release_is_noop_when_idle() {
        let mut env = Envelope::new(SAMPLE_RATE);
        env.release();
        assert_eq!(env.stage(), EnvelopeStage::Idle);
    }

    #[test]
    fn retrigger_restarts_attack() {
        let mut env = Envelope::new(SAMPLE_RATE);
        env.trigger();
        render_samples(&mut env, 500);
        env.release();
        render_samples(&mut env, 10);

        env.trigger();
        assert_eq!(env.stage(), EnvelopeStage::Attack);
        assert_eq!(env.process(), 0.0);
    }

    #[test]
    fn reset_is_immediate() {
        let mut env = Envelope::new(SAMPLE_RATE);
        env.trigger();
        render_samples(&mut env, 50);
        env.reset();
        assert!(!env.is_active());
        assert_eq!(env.level(), 0.0);
        assert_eq!(env.process(), 0.0);
    }

    #[test]
    fn zero_length_stages_complete_immediately() {
        let mut env = Envelope::with_params(SAMPLE_RATE, AdsrParams::new(0.0, 0.0, 0.4, 0.0));
        env.trigger();
        assert_eq!(env.process(), 1.0);
        assert_relative_eq!(env.process(), 0.4);
        assert_eq!(env.stage(), EnvelopeStage::Sustain);
        env.release();
        assert_eq!(env.process(), 0.0);
        assert!(!env.is_active());
    }

    #[test]
    fn params_are_clamped() {
        let mut env = Envelope::new(SAMPLE_RATE);
        env.set_adsr(AdsrParams::new(-1.0, 30.0, 1.5, f64::NAN));
        let p = env.params();
        assert_eq!(p.attack, 0.0);
        assert_eq!(p.decay, 10.0);
        assert_eq!(p.sustain, 1.0);
        assert_eq!(p.release, 0.0);
    }

    #[test]
    fn output_stays_in_unit_range() {
        let mut env = Envelope::with_params(SAMPLE_RATE, AdsrParams::new(0.003, 0.007, 0.9, 0.011));
        env.trigger();
        for i in 0..200 {
            if i == 15 {
                env.release();
            }
            let level = env.process();
            assert!((0.0..=1.0).contains(&level));
        }
    }
}
