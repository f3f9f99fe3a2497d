use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Construction-time failures. Once a synth is running, bad input is
/// clamped, dropped or self-healed instead of reported.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Audio device or stream setup.
    #[error("Audio stream error: {0}")]
    Stream(String),
}
