//! Error types for the ShelfDB engine.

use std::io;
use thiserror::Error;

/// Result type for engine operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in ShelfDB engine operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] shelfdb_storage::StorageError),

    /// Document codec error.
    #[error("codec error: {0}")]
    Codec(#[from] shelfdb_codec::CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A WAL or segment record was structurally invalid.
    #[error("corrupt record: {message}")]
    CorruptRecord {
        /// Description of the corruption.
        message: String,
    },

    /// A WAL update/delete referenced a document id with no live version.
    #[error("unknown document: {id}")]
    UnknownDocument {
        /// The referenced document id.
        id: String,
    },

    /// Database is already open in another process.
    #[error("database locked: another process has exclusive access")]
    DatabaseLocked,

    /// Invalid database layout or file name.
    #[error("invalid format: {message}")]
    InvalidFormat {
        /// Description of the format issue.
        message: String,
    },

    /// Operation not permitted with the given arguments.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why the operation is invalid.
        message: String,
    },
}

impl CoreError {
    /// Creates a corrupt record error.
    pub fn corrupt_record(message: impl Into<String>) -> Self {
        Self::CorruptRecord {
            message: message.into(),
        }
    }

    /// Creates an unknown document error.
    pub fn unknown_document(id: impl Into<String>) -> Self {
        Self::UnknownDocument { id: id.into() }
    }

    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }
}
