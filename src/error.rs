use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("MIDI is not supported in this environment")]
    Unsupported,

    #[error("no MIDI output devices found")]
    NoDevices,

    #[error("no MIDI output connected")]
    NotConnected,

    #[error("MIDI initialization failed: {0}")]
    Init(String),

    #[error("no pad {pad} in group {group}")]
    InvalidPad { group: usize, pad: usize },

    #[error("failed to send MIDI message: {0}")]
    Send(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("invalid configuration value: {0}")]
    InvalidValue(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// True for failures that leave the engine without an output device.
    /// The engine stays usable; sends become no-ops until a reconnect.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            EngineError::Unsupported | EngineError::NoDevices | EngineError::Init(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
