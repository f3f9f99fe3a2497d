// Purpose: voice pool, per-voice rendering, event routing
// This layer sits above the dsp primitives and turns note events into audio

pub mod manager;
pub mod message;
pub mod poly;
pub mod processor;
pub mod render;
pub mod router;
pub mod voice;

pub use manager::{SharedVoiceManager, StealPolicy, VoiceInfo, VoiceManager, VoiceRenderer};
pub use message::{MessageReceiver, NoteExpression, SynthMessage};
pub use poly::PolySynth;
pub use render::{FilterSettings, PolyOscillator};
pub use router::{ModulationSink, NoteRouter};
pub use voice::Voice;
