use tracing::{debug, trace};

use crate::{
    config::SynthConfig,
    dsp::selectable::FilterStatistics,
    error::Result,
    io::converter::midi_to_synth,
    synth::{
        manager::{SharedVoiceManager, VoiceManager},
        message::{MessageReceiver, SynthMessage},
        processor::SynthProcessor,
        render::PolyOscillator,
        router::NoteRouter,
    },
};

/// The complete engine: message queue in, mono block out.
///
/// Each [`render_block`](Self::render_block) drains every pending message,
/// mixes the active voices, runs the optional master filter and applies
/// master volume.
pub struct PolySynth<R> {
    voices: SharedVoiceManager,
    router: NoteRouter,
    renderer: PolyOscillator,
    master: Option<SynthProcessor>,
    rx: R,
    volume: f64,
    sample_rate: f64,
    frame_counter: u64,
}

impl<R: MessageReceiver> PolySynth<R> {
    pub fn new(config: SynthConfig, rx: R) -> Result<Self> {
        config.validate()?;

        let mut manager =
            VoiceManager::with_envelope(config.max_voices, config.sample_rate, config.envelope);
        manager.set_steal_policy(config.steal_policy);
        let voices = SharedVoiceManager::new(manager);

        let mut router = NoteRouter::new(voices.clone());
        router.set_pitch_bend_range(config.pitch_bend_range);

        let mut renderer = PolyOscillator::new(config.waveform).with_anti_alias(config.anti_alias);
        renderer.set_filter(config.voice_filter);

        let master = config
            .master_filter
            .map(|settings| SynthProcessor::with_settings(config.sample_rate, settings));

        debug!(
            sample_rate = config.sample_rate,
            max_voices = config.max_voices,
            waveform = ?config.waveform,
            "synth created"
        );

        Ok(Self {
            voices,
            router,
            renderer,
            master,
            rx,
            volume: config.volume,
            sample_rate: config.sample_rate,
            frame_counter: 0,
        })
    }

    pub fn render_block(&mut self, out: &mut [f32]) {
        while let Some(msg) = self.rx.pop() {
            self.handle_message(msg);
        }

        self.voices.process_voices_into(out, &mut self.renderer);

        if let Some(master) = &mut self.master {
            master.process(out);
        }

        if self.volume != 1.0 {
            let volume = self.volume as f32;
            for sample in out.iter_mut() {
                *sample *= volume;
            }
        }

        self.frame_counter += out.len() as u64;
    }

    /// Apply one message immediately, outside the queue.
    pub fn handle_message(&mut self, msg: SynthMessage) {
        let msg = match msg {
            SynthMessage::Midi(raw) => match raw.decode().and_then(midi_to_synth) {
                Some(decoded) => decoded,
                None => {
                    trace!(port = raw.port, bytes = ?raw.bytes(), "ignoring MIDI message");
                    return;
                }
            },
            other => other,
        };

        self.router.handle_message(msg);

        let Some(master) = &mut self.master else {
            return;
        };
        match msg {
            SynthMessage::NoteOn { .. } => master.trigger_filter_envelope(),
            SynthMessage::NoteOff { .. }
            | SynthMessage::NoteEnd { .. }
            | SynthMessage::NoteChoke { .. }
            | SynthMessage::AllNotesOff
            | SynthMessage::AllSoundOff => {
                if self.voices.read().held_voice_count() == 0 {
                    master.release_filter_envelope();
                }
            }
            _ => {}
        }
    }

    /// Handle to the voice pool, for querying or feeding it from elsewhere.
    pub fn voices(&self) -> &SharedVoiceManager {
        &self.voices
    }

    pub fn router_mut(&mut self) -> &mut NoteRouter {
        &mut self.router
    }

    pub fn renderer_mut(&mut self) -> &mut PolyOscillator {
        &mut self.renderer
    }

    pub fn master_filter_mut(&mut self) -> Option<&mut SynthProcessor> {
        self.master.as_mut()
    }

    pub fn active_voice_count(&self) -> usize {
        self.voices.active_voice_count()
    }

    /// Safe-mode counters summed over every voice filter.
    pub fn voice_filter_statistics(&self) -> FilterStatistics {
        self.voices.read().filter_statistics()
    }

    /// No voice is sounding; the host may skip processing.
    pub fn is_sleeping(&self) -> bool {
        self.active_voice_count() == 0
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn set_volume(&mut self, volume: f64) {
        self.volume = volume;
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
        self.voices.write().set_sample_rate(sample_rate);
        if let Some(master) = &mut self.master {
            master.set_sample_rate(sample_rate);
        }
    }

    /// Total frames rendered since creation.
    pub fn frames_rendered(&self) -> u64 {
        self.frame_counter
    }

    /// Silence everything and clear filter state.
    pub fn reset(&mut self) {
        self.voices.reset();
        if let Some(master) = &mut self.master {
            master.reset();
        }
    }
}
