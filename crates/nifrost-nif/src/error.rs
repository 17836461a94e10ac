//! Error and warning types for NIF decoding.

use std::fmt;

use thiserror::Error;

use crate::version::Version;

/// What kind of index a corrupt reference was pointing into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// A block link (ref or ptr) or a root.
    Block,
    /// An index into the header string table.
    String,
    /// A byte offset into an `NiStringPalette`.
    Palette,
    /// An entry of the header block type index.
    BlockType,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Block => "block",
            Self::String => "string",
            Self::Palette => "palette offset",
            Self::BlockType => "block type",
        })
    }
}

/// Errors that can occur when decoding a NIF document.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Low-level read error (EOF or invalid encoding).
    #[error("{0}")]
    Common(#[from] nifrost_common::Error),

    /// The version banner could not be understood.
    #[error("unparseable header: {0}")]
    HeaderUnparseable(String),

    /// The banner parsed but the version is outside the supported range.
    #[error("unsupported version {0}")]
    UnsupportedVersion(Version),

    /// A reference points outside the table it indexes.
    #[error("corrupt {kind} reference {value} (limit {limit})")]
    CorruptReference {
        kind: ReferenceKind,
        value: i64,
        limit: usize,
    },

    /// No known physics fork matches the version pair.
    #[error("no havok layout for version {version} with user version 2 = {user_version_2}")]
    UnknownHavokFork {
        version: Version,
        user_version_2: u32,
    },

    /// Record tag without a decoder, fatal only in strict mode.
    #[error("unsupported record type {0:?}")]
    UnsupportedRecordType(String),

    /// Failure while decoding a specific block.
    #[error("block {index} ({kind}) at offset {offset:#x}: {source}")]
    Block {
        index: u32,
        kind: String,
        offset: usize,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// The innermost error, looking through [`Error::Block`] wrappers.
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::Block { source, .. } => source.root_cause(),
            other => other,
        }
    }

    pub(crate) fn corrupt(kind: ReferenceKind, value: impl Into<i64>, limit: usize) -> Self {
        Self::CorruptReference {
            kind,
            value: value.into(),
            limit,
        }
    }
}

/// Result type for NIF operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Recoverable conditions found while loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A block's tag has no decoder (or its layout does not fit this fork).
    UnsupportedRecordType { index: u32, kind: String },
    /// A decoder consumed a different number of bytes than the size table declares.
    BlockSizeMismatch {
        index: u32,
        kind: String,
        declared: u32,
        consumed: usize,
    },
    /// Without block sizes the table could not continue past this block.
    TableTruncated { index: u32, remaining: u32 },
    /// Bytes left over after the footer.
    TrailingBytes { offset: usize, count: usize },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedRecordType { index, kind } => {
                write!(f, "block {index}: unsupported record type {kind:?}")
            }
            Self::BlockSizeMismatch {
                index,
                kind,
                declared,
                consumed,
            } => write!(
                f,
                "block {index} ({kind}): declared {declared} bytes, decoder consumed {consumed}"
            ),
            Self::TableTruncated { index, remaining } => write!(
                f,
                "block table truncated at block {index}, {remaining} blocks not loaded"
            ),
            Self::TrailingBytes { offset, count } => {
                write!(f, "{count} trailing bytes after footer at {offset:#x}")
            }
        }
    }
}
