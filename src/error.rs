//! Error types for the gesture stabilizer
//!
//! Nothing in here is fatal to a running engine except `ConfigError`, which is
//! only produced while building one.

/// Malformed configuration, rejected at construction time
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("history length must be at least 1")]
    ZeroHistory,
    #[error("history length {0} exceeds the maximum of {max}", max = crate::stabilizer::MAX_HISTORY_LENGTH)]
    HistoryTooLong(usize),
    #[error("confidence threshold must be within [0, 1], got {0}")]
    Threshold(f32),
    #[error("volume percent must be within 0..=100, got {0}")]
    VolumePercent(u32),
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
    #[error("unknown platform {0:?} (expected linux, macos or windows)")]
    UnknownPlatform(String),
}

/// The OS-level side effect could not be performed
#[derive(Debug, thiserror::Error)]
pub enum ActuatorError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{program} exited with {status}")]
    ExitStatus {
        program: String,
        status: std::process::ExitStatus,
    },
    #[error("dispatch worker has shut down")]
    Disconnected,
    #[error("{0}")]
    Backend(String),
}

/// A stabilized gesture could not be turned into an action
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("no command mapped for gesture {0:?}")]
    UnmappedGesture(String),
    #[error("actuator failed: {0}")]
    Actuator(#[from] ActuatorError),
}

/// A frame message from the classifier could not be parsed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IngestError {
    #[error("empty frame message")]
    Empty,
    #[error("malformed frame message: {0:?}")]
    Malformed(String),
    #[error("confidence {0:?} is not a number")]
    BadConfidence(String),
}
