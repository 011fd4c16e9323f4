//! Error types for the fan control indicator

use thiserror::Error;

/// Result type alias for the fan control indicator
pub type Result<T> = std::result::Result<T, FanCtrlError>;

/// Main error type for the fan control indicator
#[derive(Error, Debug)]
pub enum FanCtrlError {
    /// The executable could not be located or the OS refused to start it
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Output of a started process could not be read to completion
    #[error("Failed to communicate with process: {0}")]
    Communication(#[source] std::io::Error),

    /// Command output did not have the expected shape
    #[error("Unexpected command output: {0}")]
    Parse(String),

    /// The caller stopped waiting for the command
    #[error("Command cancelled")]
    Cancelled,

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl FanCtrlError {
    /// True when the executable itself could not be run
    pub fn is_spawn_failure(&self) -> bool {
        matches!(self, FanCtrlError::Spawn { .. })
    }
}
