//! Fixed-capacity voice pool.
//!
//! All voices are allocated up front; note-on picks a slot index (a free
//! one, or a victim chosen by [`StealPolicy`]) and reinitializes it in place.
//! A voice only becomes free again inside [`VoiceManager::process_voices_into`],
//! once its envelope has gone idle.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::{
        envelope::{AdsrParams, EnvelopeStage},
        selectable::FilterStatistics,
    },
    synth::voice::Voice,
    MAX_BLOCK_SIZE,
};

/// Which active voice gives way when a note arrives and every slot is busy.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StealPolicy {
    /// The least recently triggered voice.
    #[default]
    Oldest,
    /// Always the first slot in the pool, regardless of age.
    FirstSlot,
}

/// Snapshot for hosts that ask how many voices are in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoiceInfo {
    pub voice_count: usize,
    pub voice_capacity: usize,
    pub supports_overlapping_notes: bool,
}

/// Produces one voice's audio for a block.
///
/// `out` arrives zeroed and has the block's length. Implementations advance
/// the voice's phase and envelope as they go.
pub trait VoiceRenderer {
    fn render(&mut self, voice: &mut Voice, out: &mut [f32], sample_rate: f64);
}

pub struct VoiceManager {
    voices: Vec<Voice>,
    sample_rate: f64,
    steal_policy: StealPolicy,
    envelope: AdsrParams,
    next_serial: u64,
    scratch: Vec<f32>,
}

impl VoiceManager {
    pub fn new(max_voices: usize, sample_rate: f64) -> Self {
        Self::with_envelope(max_voices, sample_rate, AdsrParams::default())
    }

    pub fn with_envelope(max_voices: usize, sample_rate: f64, envelope: AdsrParams) -> Self {
        let voices = (0..max_voices)
            .map(|_| Voice::new(sample_rate, envelope))
            .collect();

        Self {
            voices,
            sample_rate,
            steal_policy: StealPolicy::default(),
            envelope,
            next_serial: 0,
            scratch: vec![0.0; MAX_BLOCK_SIZE],
        }
    }

    /// Start a note, stealing a voice if the pool is full.
    ///
    /// A note id (>= 0) that is already sounding on the same channel
    /// retriggers that voice instead of taking a second slot. Returns `None`
    /// only for a zero-capacity pool.
    pub fn allocate_voice(
        &mut self,
        note_id: i32,
        channel: u8,
        key: u8,
        velocity: f64,
    ) -> Option<&mut Voice> {
        let idx = self.select_slot(note_id, channel)?;
        self.next_serial += 1;
        let serial = self.next_serial;

        let voice = &mut self.voices[idx];
        voice.start(note_id, channel, key, velocity, serial);
        Some(voice)
    }

    fn select_slot(&self, note_id: i32, channel: u8) -> Option<usize> {
        if note_id >= 0 {
            if let Some(idx) = self.voices.iter().position(|v| v.matches_id(note_id, channel)) {
                return Some(idx);
            }
        }

        if let Some(idx) = self.voices.iter().position(|v| !v.is_active()) {
            return Some(idx);
        }

        let victim = match self.steal_policy {
            StealPolicy::Oldest => self
                .voices
                .iter()
                .enumerate()
                .min_by_key(|(_, v)| v.serial())
                .map(|(idx, _)| idx),
            StealPolicy::FirstSlot => (!self.voices.is_empty()).then_some(0),
        }?;

        let stolen = &self.voices[victim];
        debug!(
            slot = victim,
            stolen_note_id = stolen.note_id,
            stolen_key = stolen.key,
            policy = ?self.steal_policy,
            "voice stolen"
        );
        Some(victim)
    }

    /// Release every active voice holding `(note_id, channel)`. Returns how
    /// many voices entered release.
    pub fn release_voice(&mut self, note_id: i32, channel: u8) -> usize {
        self.for_matching(|v| v.matches_id(note_id, channel), Voice::release)
    }

    /// Release by channel and key, for notes that arrived without an id.
    pub fn release_voices_by_key(&mut self, channel: u8, key: u8) -> usize {
        self.for_matching(|v| v.matches_key(channel, key), Voice::release)
    }

    /// Hard-stop `(note_id, channel)`; the slot frees on the next process call.
    pub fn choke_voice(&mut self, note_id: i32, channel: u8) -> usize {
        self.for_matching(|v| v.matches_id(note_id, channel), Voice::choke)
    }

    pub fn choke_voices_by_key(&mut self, channel: u8, key: u8) -> usize {
        self.for_matching(|v| v.matches_key(channel, key), Voice::choke)
    }

    pub fn release_all_voices(&mut self) {
        self.apply_to_all_voices(Voice::release);
    }

    fn for_matching(
        &mut self,
        pred: impl Fn(&Voice) -> bool,
        mut action: impl FnMut(&mut Voice),
    ) -> usize {
        let mut count = 0;
        for voice in self.voices.iter_mut() {
            if pred(&*voice) {
                action(voice);
                count += 1;
            }
        }
        count
    }

    /// Render and sum every active voice into `out`, then free voices whose
    /// envelopes have finished. `out` is overwritten.
    pub fn process_voices_into<R>(&mut self, out: &mut [f32], renderer: &mut R)
    where
        R: VoiceRenderer + ?Sized,
    {
        out.fill(0.0);
        let frames = out.len();

        let Self {
            voices,
            scratch,
            sample_rate,
            ..
        } = self;

        if scratch.len() < frames {
            scratch.resize(frames, 0.0);
        }
        let block = &mut scratch[..frames];

        for voice in voices.iter_mut().filter(|v| v.is_active()) {
            block.fill(0.0);
            renderer.render(voice, block, *sample_rate);

            for (o, v) in out.iter_mut().zip(block.iter()) {
                *o += v;
            }

            if !voice.envelope.is_active() {
                voice.deactivate();
            }
        }
    }

    /// Allocating convenience over [`process_voices_into`](Self::process_voices_into).
    pub fn process_voices<R>(&mut self, frame_count: usize, renderer: &mut R) -> Vec<f32>
    where
        R: VoiceRenderer + ?Sized,
    {
        let mut out = vec![0.0; frame_count];
        self.process_voices_into(&mut out, renderer);
        out
    }

    /// Run `f` on every active voice.
    pub fn apply_to_all_voices(&mut self, mut f: impl FnMut(&mut Voice)) {
        for voice in self.voices.iter_mut().filter(|v| v.is_active()) {
            f(voice);
        }
    }

    /// Run `f` on every active voice on `channel`.
    pub fn apply_to_channel(&mut self, channel: u8, mut f: impl FnMut(&mut Voice)) {
        self.apply_to_all_voices(|v| {
            if v.channel == channel {
                f(v)
            }
        });
    }

    pub fn voice_by_note_id(&self, note_id: i32, channel: u8) -> Option<&Voice> {
        self.voices.iter().find(|v| v.matches_id(note_id, channel))
    }

    pub fn voice_by_note_id_mut(&mut self, note_id: i32, channel: u8) -> Option<&mut Voice> {
        self.voices.iter_mut().find(|v| v.matches_id(note_id, channel))
    }

    /// All slots, active or not, in pool order.
    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.iter().filter(|v| v.is_active()).count()
    }

    /// Active voices that have not started releasing.
    pub fn held_voice_count(&self) -> usize {
        self.voices
            .iter()
            .filter(|v| {
                v.is_active()
                    && matches!(
                        v.envelope.stage(),
                        EnvelopeStage::Attack | EnvelopeStage::Decay | EnvelopeStage::Sustain
                    )
            })
            .count()
    }

    pub fn max_voices(&self) -> usize {
        self.voices.len()
    }

    pub fn voice_info(&self) -> VoiceInfo {
        VoiceInfo {
            voice_count: self.active_voice_count(),
            voice_capacity: self.max_voices(),
            supports_overlapping_notes: true,
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        for voice in &mut self.voices {
            voice.set_sample_rate(sample_rate);
        }
    }

    pub fn steal_policy(&self) -> StealPolicy {
        self.steal_policy
    }

    pub fn set_steal_policy(&mut self, policy: StealPolicy) {
        self.steal_policy = policy;
    }

    /// `true` steals the least recently triggered voice, `false` the first slot.
    pub fn set_voice_stealing_strategy(&mut self, steal_oldest: bool) {
        self.steal_policy = if steal_oldest {
            StealPolicy::Oldest
        } else {
            StealPolicy::FirstSlot
        };
    }

    /// Apply ADSR settings to every slot, idle ones included.
    pub fn set_envelope_params(&mut self, params: AdsrParams) {
        self.envelope = params.clamped();
        for voice in &mut self.voices {
            voice.envelope.set_adsr(self.envelope);
        }
    }

    pub fn envelope_params(&self) -> AdsrParams {
        self.envelope
    }

    /// Counters from every voice's filter, summed.
    pub fn filter_statistics(&self) -> FilterStatistics {
        let mut total = FilterStatistics::default();
        for voice in &self.voices {
            let stats = voice.filter.statistics();
            total.merge(&stats);
            total.safe_mode |= stats.safe_mode;
            total.filter_type = stats.filter_type;
        }
        total
    }

    /// Silence and free every voice at once.
    pub fn reset(&mut self) {
        for voice in &mut self.voices {
            voice.clear();
        }
    }
}

/// A [`VoiceManager`] behind a reader/writer lock, shareable between the
/// audio callback and whoever else feeds it notes.
///
/// Mutation and block processing take the write lock; queries take the
/// read lock.
#[derive(Clone)]
pub struct SharedVoiceManager {
    inner: Arc<RwLock<VoiceManager>>,
}

impl SharedVoiceManager {
    pub fn new(manager: VoiceManager) -> Self {
        Self {
            inner: Arc::new(RwLock::new(manager)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, VoiceManager> {
        self.inner.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, VoiceManager> {
        self.inner.write()
    }

    /// Returns whether a voice was started.
    pub fn allocate_voice(&self, note_id: i32, channel: u8, key: u8, velocity: f64) -> bool {
        self.write()
            .allocate_voice(note_id, channel, key, velocity)
            .is_some()
    }

    pub fn release_voice(&self, note_id: i32, channel: u8) -> usize {
        self.write().release_voice(note_id, channel)
    }

    pub fn release_voices_by_key(&self, channel: u8, key: u8) -> usize {
        self.write().release_voices_by_key(channel, key)
    }

    pub fn release_all_voices(&self) {
        self.write().release_all_voices();
    }

    pub fn apply_to_all_voices(&self, f: impl FnMut(&mut Voice)) {
        self.write().apply_to_all_voices(f);
    }

    pub fn process_voices_into<R>(&self, out: &mut [f32], renderer: &mut R)
    where
        R: VoiceRenderer + ?Sized,
    {
        self.write().process_voices_into(out, renderer);
    }

    pub fn process_voices<R>(&self, frame_count: usize, renderer: &mut R) -> Vec<f32>
    where
        R: VoiceRenderer + ?Sized,
    {
        self.write().process_voices(frame_count, renderer)
    }

    pub fn active_voice_count(&self) -> usize {
        self.read().active_voice_count()
    }

    pub fn voice_info(&self) -> VoiceInfo {
        self.read().voice_info()
    }

    /// Inspect the voice holding `(note_id, channel)`, if any.
    pub fn with_voice<T>(&self, note_id: i32, channel: u8, f: impl FnOnce(&Voice) -> T) -> Option<T> {
        self.read().voice_by_note_id(note_id, channel).map(f)
    }

    pub fn reset(&self) {
        self.write().reset();
    }
}
