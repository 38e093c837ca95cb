//! Error types for the local store.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in local store operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage substrate error.
    #[error("storage error: {0}")]
    Storage(#[from] akilhane_storage::StorageError),

    /// The payload stored under a key could not be parsed.
    #[error("corrupted collection '{key}': {message}")]
    Corrupted {
        /// Key whose payload is unreadable.
        key: String,
        /// Parser message.
        message: String,
    },

    /// A record could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A record violates a data model invariant.
    #[error("invalid {kind}: {message}")]
    InvalidRecord {
        /// Record kind ("question", "subject", ...).
        kind: &'static str,
        /// What is wrong with it.
        message: String,
    },

    /// No record with the given id exists.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Record kind.
        kind: &'static str,
        /// The missing id.
        id: String,
    },

    /// A flashcard review used a confidence outside 1..=5.
    #[error("confidence {0} is outside 1..=5")]
    InvalidConfidence(u8),

    /// A freshly generated id collided twice with existing records.
    #[error("could not generate a unique {kind} id (last attempt: {id})")]
    IdCollision {
        /// Record kind.
        kind: &'static str,
        /// The colliding id.
        id: String,
    },

    /// Another process holds the store directory lock.
    #[error("store directory is locked by another process")]
    StoreLocked,

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CoreError {
    /// Creates an invalid-record error.
    pub fn invalid_record(kind: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            kind,
            message: message.into(),
        }
    }

    /// Returns true if the error means stored data is unreadable.
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Self::Corrupted { .. } | Self::Storage(akilhane_storage::StorageError::Corrupted { .. })
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corruption_classification() {
        let err = CoreError::Corrupted {
            key: "questions".into(),
            message: "expected value".into(),
        };
        assert!(err.is_corruption());
        assert!(err.to_string().contains("questions"));

        assert!(!CoreError::InvalidConfidence(9).is_corruption());
        assert_eq!(
            CoreError::InvalidConfidence(9).to_string(),
            "confidence 9 is outside 1..=5"
        );
    }
}
