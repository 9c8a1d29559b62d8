//! Error types for seeded multi-object tracking.

use thiserror::Error;

/// Result type alias for the tracking library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading inputs or running a tracking session
#[derive(Error, Debug)]
pub enum Error {
    #[error("{extension} format not supported, expected one of .mkv .avi .mp4 .mov")]
    UnsupportedVideoFormat { extension: String },

    #[error("{extension} format not supported, expected a .json seed file")]
    UnsupportedSeedFormat { extension: String },

    #[error("Invalid seed entry #{index}: {reason}")]
    InvalidSeed { index: usize, reason: String },

    #[error("Failed to parse seed file: {0}")]
    SeedParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tracker pool is already seeded")]
    AlreadySeeded,

    #[error("Tracker pool must be seeded before it can advance")]
    NotSeeded,

    #[error("Tracking pipeline has already run")]
    AlreadyRun,

    #[error("Failed to initialize tracker for object #{index}: {message}")]
    TrackerInit { index: usize, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl Error {
    pub fn backend<S: Into<String>>(msg: S) -> Self {
        Self::Backend(msg.into())
    }

    pub fn invalid_seed<S: Into<String>>(index: usize, reason: S) -> Self {
        Self::InvalidSeed {
            index,
            reason: reason.into(),
        }
    }
}

#[cfg(feature = "opencv")]
impl From<opencv::Error> for Error {
    fn from(err: opencv::Error) -> Self {
        Self::Backend(err.to_string())
    }
}
