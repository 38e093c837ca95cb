//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Attempted to grow storage through `truncate`.
    #[error("cannot truncate {size} bytes of storage to {requested}")]
    TruncatePastEnd {
        /// The requested length.
        requested: u64,
        /// The current storage size.
        size: u64,
    },

    /// The journal is corrupted.
    #[error("storage corrupted at offset {offset}: {message}")]
    Corrupted {
        /// Offset of the offending record.
        offset: u64,
        /// Description of the corruption.
        message: String,
    },

    /// A key or value exceeds the journal's length fields.
    #[error("entry too large: {0} bytes")]
    EntryTooLarge(usize),
}

impl StorageError {
    /// Creates a corruption error at the given offset.
    pub fn corrupted(offset: u64, message: impl Into<String>) -> Self {
        Self::Corrupted {
            offset,
            message: message.into(),
        }
    }
}
