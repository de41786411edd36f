//! Error types for the relay server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use relay_dispatch::DispatchError;
use relay_model::ModelError;
use relay_render::RenderError;
use relay_store::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Result type alias for relay operations.
pub type RelayResult<T> = Result<T, RelayError>;

/// Errors that can occur in the relay server.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The request targeted a platform the relay does not support.
    #[error("unknown platform: {name}")]
    UnknownPlatform {
        /// The unsupported path segment.
        name: String,
    },

    /// The request is malformed or carries no usable credential.
    #[error("invalid request: {reason}")]
    InvalidRequest {
        /// Why the request was rejected.
        reason: String,
    },

    /// The state store failed.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// Message rendering failed.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// Configuration is missing or invalid.
    #[error("configuration error: {reason}")]
    Config {
        /// What was wrong with the configuration.
        reason: String,
    },

    /// Server startup or I/O failure.
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal failure not covered by the variants above.
    #[error("internal error: {reason}")]
    Internal {
        /// Description of the failure.
        reason: String,
    },
}

impl From<ModelError> for RelayError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::UnknownPlatform { name } => Self::UnknownPlatform { name },
            ModelError::InvalidStatus { .. } => Self::InvalidRequest {
                reason: err.to_string(),
            },
        }
    }
}

impl From<DispatchError> for RelayError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::NoCredential { .. } | DispatchError::InvalidUrl { .. } => {
                Self::InvalidRequest {
                    reason: err.to_string(),
                }
            }
            DispatchError::ClientSetup(_) => Self::Internal {
                reason: err.to_string(),
            },
        }
    }
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            Self::UnknownPlatform { .. } => (StatusCode::BAD_REQUEST, "unknown_platform"),
            Self::InvalidRequest { .. } => (StatusCode::BAD_REQUEST, "invalid_request"),
            Self::Storage(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            Self::Render(_) | Self::Config { .. } | Self::Io(_) | Self::Internal { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        };

        let json = serde_json::to_string(&body).unwrap_or_else(|_| {
            r#"{"error":"internal_error","message":"failed to serialize error"}"#.to_string()
        });

        (status, [("content-type", "application/json")], json).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn unknown_platform_maps_to_400() {
        let err = RelayError::UnknownPlatform {
            name: "slack".to_string(),
        };
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["error"], "unknown_platform");
        assert!(json["message"].as_str().unwrap().contains("slack"));
    }

    #[tokio::test]
    async fn missing_credential_maps_to_400() {
        let err = RelayError::from(DispatchError::NoCredential {
            platform: relay_model::Platform::Feishu,
        });
        assert!(matches!(err, RelayError::InvalidRequest { .. }));
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn storage_error_maps_to_500() {
        let err = RelayError::Storage(StoreError::CorruptRecord {
            fingerprint: "ab".to_string(),
            reason: "bad".to_string(),
        });
        assert_eq!(
            err.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
