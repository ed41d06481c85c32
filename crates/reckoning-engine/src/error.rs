//! Error types for the headless engine binary.
//!
//! [`EngineError`] wraps every failure mode of startup, the turn loop and
//! saving, so `main` can propagate with `?`.

use std::path::PathBuf;

use reckoning_core::{ConfigError, ContentError, DecisionError, SessionError, SnapshotError};

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The species bundle could not be loaded or failed validation.
    #[error("content error: {source}")]
    Content {
        /// The underlying content error.
        #[from]
        source: ContentError,
    },

    /// The session refused an input.
    #[error("session error: {source}")]
    Session {
        /// The underlying session error.
        #[from]
        source: SessionError,
    },

    /// The decision source could not answer.
    #[error("decision error: {source}")]
    Decision {
        /// The underlying decision error.
        #[from]
        source: DecisionError,
    },

    /// A save could not be written or read back.
    #[error("snapshot error: {source}")]
    Snapshot {
        /// The underlying snapshot error.
        #[from]
        source: SnapshotError,
    },

    /// The selection task panicked or was cancelled.
    #[error("selection task failed: {source}")]
    Worker {
        /// The underlying join error.
        #[from]
        source: tokio::task::JoinError,
    },

    /// Reading or writing the save file failed.
    #[error("save file {}: {source}", path.display())]
    SaveFile {
        /// The save path.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },
}
