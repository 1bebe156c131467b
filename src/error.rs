//! Error types for settings persistence
//!
//! Only the write boundary of the settings store can fail. Every read path and
//! every transformation entry point degrades to defaults instead.

use thiserror::Error;

/// Result type alias for settings writes
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Errors raised by an [`OptionBackend`](crate::store::OptionBackend)
#[derive(Debug, Error)]
pub enum BackendError {
    /// IO error while reading or writing the option file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored document could not be (de)serialized
    #[error("Option document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Option file has an unexpected shape
    #[error("Malformed option document: {0}")]
    Malformed(String),
}

/// Errors returned from settings writes
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Domain could not be normalized into an absolute http(s) URL
    #[error("Invalid custom domain '{value}': {reason}")]
    InvalidDomain { value: String, reason: String },

    /// Network-scoped setting written on a single-site installation
    #[error("Network setting '{0}' cannot be written outside network mode")]
    NotNetworkMode(&'static str),

    /// Storage layer failure
    #[error("Settings backend error: {0}")]
    Backend(#[from] BackendError),
}

impl SettingsError {
    /// Check if the error was caused by the caller's input rather than storage
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            SettingsError::InvalidDomain { .. } | SettingsError::NotNetworkMode(_)
        )
    }
}
