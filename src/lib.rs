pub mod config;
pub mod dsp;
pub mod error;
pub mod io; // MIDI decoding and unit conversions
pub mod synth; // Voice management and polyphony

pub use config::SynthConfig;
pub use error::{Error, Result};

pub const MAX_BLOCK_SIZE: usize = 2048;
/// Upper bound on `SynthConfig::max_voices`.
pub const MAX_VOICES: usize = 128;
