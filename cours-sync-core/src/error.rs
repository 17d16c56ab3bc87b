//! Error types for the import pipeline.
//!
//! Everything in [`ImportError`] aborts an import. Problems with a single
//! event never surface here; they are collected in the
//! [`ImportReport`](crate::import::ImportReport) instead.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors that stop an import.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("No {pattern} file found in {}", dir.display())]
    MissingClientSecret { dir: PathBuf, pattern: String },

    #[error("Invalid client secret file {}: {reason}", path.display())]
    InvalidClientSecret { path: PathBuf, reason: String },

    #[error("Google authentication failed: {0}")]
    Auth(String),

    #[error("Failed to refresh Google token: {0}")]
    TokenRefresh(String),

    #[error("Calendar provisioning failed: {0}")]
    Provisioning(String),

    #[error("Failed to read {}: {source}", path.display())]
    ReadIcs {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ICS parse error: {0}")]
    IcsParse(String),

    #[error("Batch submission failed: {0}")]
    BatchSubmission(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ImportError {
    /// Whether the failure came from the OAuth side (secret, consent, refresh).
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            ImportError::MissingClientSecret { .. }
                | ImportError::InvalidClientSecret { .. }
                | ImportError::Auth(_)
                | ImportError::TokenRefresh(_)
        )
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(e: serde_json::Error) -> Self {
        ImportError::Serialization(e.to_string())
    }
}

/// Result type alias for import operations.
pub type ImportResult<T> = Result<T, ImportError>;
