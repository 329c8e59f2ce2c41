//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Unexpected end of input while decoding.
    #[error("unexpected end of input")]
    UnexpectedEof,

    /// A record frame failed its CRC check.
    #[error("checksum mismatch: expected {expected:08x}, got {actual:08x}")]
    ChecksumMismatch {
        /// Checksum stored in the frame.
        expected: u32,
        /// Checksum computed over the frame contents.
        actual: u32,
    },

    /// Encountered an unknown value tag byte.
    #[error("unknown value tag: {tag:#04x}")]
    UnknownTag {
        /// The offending tag byte.
        tag: u8,
    },

    /// A string was not valid UTF-8.
    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    /// A frame's payload had bytes left over after the document.
    #[error("trailing bytes after document payload")]
    TrailingBytes,

    /// A record frame was structurally invalid.
    #[error("invalid record frame: {message}")]
    InvalidFrame {
        /// Description of the problem.
        message: String,
    },

    /// The document is too large to fit in a single frame.
    #[error("document too large to frame")]
    DocumentTooLarge,
}

impl CodecError {
    /// Creates an invalid-frame error.
    pub fn invalid_frame(message: impl Into<String>) -> Self {
        Self::InvalidFrame {
            message: message.into(),
        }
    }
}
