//! Engine scenario benchmarks.
//!
//! These model how a host drives the engine: a pool of sounding voices,
//! constant note churn that forces stealing, and complete synth blocks.

mod synth;
mod voices;

pub use synth::bench_synth;
pub use voices::bench_voices;
