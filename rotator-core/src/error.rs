use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // Configuration errors
    #[error("Config file not found at {path}. A template has been created - please add your catalog API key and restart.")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid config: {message}")]
    ConfigInvalid { message: String },

    #[error("Missing required config field: {field}")]
    ConfigMissingField { field: String },

    #[error("Failed to parse config file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    // Resolution errors
    #[error("{message}")]
    ResolutionFailed { message: String },

    #[error("Video not found: {video_id}")]
    VideoNotFound { video_id: String },

    // Catalog errors
    #[error("Catalog returned status {status}")]
    CatalogStatus { status: u16 },

    #[error("{reason}")]
    CatalogFailed { reason: String },

    // Store errors
    #[error("State store has not been loaded yet")]
    StoreNotHydrated,

    // Session errors
    #[error("{message}")]
    Rejected { message: String },

    #[error("Session has shut down")]
    SessionClosed,

    // Network errors
    #[error("Network request failed: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Network middleware failed: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CoreError {
    /// Convenience constructor for a user-facing rejection message.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: message.into(),
        }
    }

    /// Convenience constructor for a resolution failure.
    #[must_use]
    pub fn resolution(message: impl Into<String>) -> Self {
        Self::ResolutionFailed {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
