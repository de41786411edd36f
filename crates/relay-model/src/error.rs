//! Error types for the shared data model.

use thiserror::Error;

/// Errors that can occur while interpreting relay data.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The platform path segment is not one of the supported platforms.
    #[error("unknown platform: {name}")]
    UnknownPlatform {
        /// The path segment that failed to parse.
        name: String,
    },

    /// An alert status string is neither `firing` nor `resolved`.
    #[error("invalid alert status: {value}")]
    InvalidStatus {
        /// The status string that failed to parse.
        value: String,
    },
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_unknown_platform() {
        let err = ModelError::UnknownPlatform {
            name: "slack".to_string(),
        };
        assert_eq!(err.to_string(), "unknown platform: slack");
    }

    #[test]
    fn error_display_invalid_status() {
        let err = ModelError::InvalidStatus {
            value: "pending".to_string(),
        };
        assert_eq!(err.to_string(), "invalid alert status: pending");
    }
}
