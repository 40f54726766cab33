use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use rotator_core::CoreError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Set YOUTUBE_API_KEY or catalog.api_key in the config file")]
    MissingApiKey,

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ProxyError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::MissingApiKey | Self::Bind { .. } | Self::IoError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<CoreError> for ProxyError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::VideoNotFound { .. } => Self::NotFound("Video not found.".into()),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

/// Plain-text error body
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// Error answered as `{ "error": "<message>" }`, used by `/api/videos`.
#[derive(Debug)]
pub struct JsonError(pub ProxyError);

impl From<ProxyError> for JsonError {
    fn from(error: ProxyError) -> Self {
        Self(error)
    }
}

impl From<CoreError> for JsonError {
    fn from(error: CoreError) -> Self {
        Self(error.into())
    }
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        (self.0.status(), Json(json!({ "error": self.0.to_string() }))).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ProxyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_404() {
        let err = ProxyError::from(CoreError::VideoNotFound {
            video_id: "abc".into(),
        });
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Video not found.");
    }

    #[test]
    fn test_resolution_failure_keeps_message() {
        let err = ProxyError::from(CoreError::resolution("Channel not found."));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Channel not found.");
    }

    #[test]
    fn test_missing_key_is_server_error() {
        assert_eq!(
            ProxyError::MissingApiKey.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
