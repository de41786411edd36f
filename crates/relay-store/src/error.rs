//! Error types for the state store.

use thiserror::Error;

/// Errors that can occur in the alert state store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// SQLite operation failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Redis operation failed.
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A stored value could not be interpreted.
    #[error("corrupt record for {fingerprint}: {reason}")]
    CorruptRecord {
        /// The fingerprint whose record is damaged.
        fingerprint: String,
        /// What failed to parse.
        reason: String,
    },

    /// Retention policy configuration is invalid.
    #[error("invalid retention policy: {reason}")]
    InvalidPolicy {
        /// Why the policy was rejected.
        reason: String,
    },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_corrupt_record() {
        let err = StoreError::CorruptRecord {
            fingerprint: "ab12".to_string(),
            reason: "bad timestamp".to_string(),
        };
        assert_eq!(err.to_string(), "corrupt record for ab12: bad timestamp");
    }

    #[test]
    fn error_display_invalid_policy() {
        let err = StoreError::InvalidPolicy {
            reason: "unknown timezone".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid retention policy: unknown timezone"
        );
    }
}
