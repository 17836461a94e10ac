//! Common utilities for nifrost.
//!
//! This crate provides the foundational reading layer used by the format
//! crates:
//!
//! - [`ByteCursor`] - Endian-aware, bounds-checked reading from byte slices
//! - [`Endian`] - Byte order selector
//! - [`decode_latin1`] - Lossless decoding of undeclared-charset strings

mod cursor;
mod error;

pub use cursor::{bounded_capacity, decode_latin1, ByteCursor, Endian};
pub use error::{Error, Result};

/// Re-export memchr for byte searching in string tables.
pub use memchr;
