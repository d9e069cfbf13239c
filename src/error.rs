use std::path::PathBuf;
use thiserror::Error;

use crate::scheduler::Pid;

/// Configuration errors. All of them are fatal and surface before the first tick.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown scheduling algorithm: {0}")]
    UnknownAlgorithm(String),

    #[error("Time quantum must be specified for Round Robin scheduling")]
    MissingTimeQuantum,

    #[error("{field} must be positive and finite, got {value}")]
    NonPositive { field: &'static str, value: f64 },

    #[error("Real-time pacing of {seconds} seconds per tick cannot be slept")]
    PacingOutOfRange { seconds: f64 },

    #[error("Invalid weights for {0}")]
    InvalidWeights(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while building the arrival list fed to the clock driver.
#[derive(Error, Debug)]
pub enum WorkloadError {
    #[error("Failed to read process list {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed process list: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Process {pid}: {reason}")]
    InvalidProcess { pid: Pid, reason: String },

    #[error("Duplicate pid {0} in process list")]
    DuplicatePid(Pid),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type WorkloadResult<T> = Result<T, WorkloadError>;

/// Rejects zero, negative, infinite and NaN values for a named parameter.
pub(crate) fn ensure_positive(field: &'static str, value: f64) -> ConfigResult<f64> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}
