use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    /// A batch was requested with no trials in it.
    #[error("simulation count must be at least 1")]
    InvalidSampleSize,

    #[error("cost per pull must be a finite, non-negative number (got {0})")]
    InvalidCostPerPull(f64),

    #[error("simulation cancelled before the batch completed")]
    Cancelled,

    #[error("worker pool failure: {0}")]
    Worker(String),

    #[error("failed to read config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown preset '{0}' (run `pity-sim presets` to list them)")]
    UnknownPreset(String),

    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
