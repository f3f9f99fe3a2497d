//! Low-level DSP primitives used by the voice engine.
//!
//! These components are allocation-free and realtime-safe, making them safe to
//! embed directly inside voice structs. They stay focused on the
//! signal-processing math; the synth layer owns orchestration and modulation.

/// Attack/decay/sustain/release envelope generator.
pub mod envelope;
/// State-variable filter implementation with multiple responses.
pub mod filter;
/// Oscillator waveforms and band-limited corrections.
pub mod oscillator;
/// Filter response selection with NaN/Inf protection.
pub mod selectable;

pub use envelope::{AdsrParams, Envelope, EnvelopeStage};
pub use filter::{FilterType, StateVariableFilter};
pub use oscillator::Waveform;
pub use selectable::{FilterStatistics, SelectableFilter};
