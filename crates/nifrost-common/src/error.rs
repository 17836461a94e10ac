//! Error types for nifrost-common.

use thiserror::Error;

/// Common error type for nifrost operations.
#[derive(Debug, Error)]
pub enum Error {
    /// End of buffer reached while reading.
    #[error("unexpected end of buffer at offset {offset:#x}: needed {needed} bytes but only {available} available")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Bytes were present but cannot encode a valid value.
    #[error("invalid encoding at offset {offset:#x}: {reason}")]
    InvalidEncoding { offset: usize, reason: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build an [`Error::InvalidEncoding`] for the given offset.
    pub fn invalid(offset: usize, reason: impl Into<String>) -> Self {
        Self::InvalidEncoding {
            offset,
            reason: reason.into(),
        }
    }

    /// Byte offset the error refers to, if it has one.
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::UnexpectedEof { offset, .. } | Self::InvalidEncoding { offset, .. } => Some(*offset),
            Self::Io(_) => None,
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
