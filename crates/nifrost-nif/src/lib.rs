//! NetImmerse/Gamebryo `.nif` decoder.
//!
//! A NIF file is a version banner, a header, a flat table of typed blocks
//! and a footer listing the scene roots. Blocks refer to each other by
//! index, so the scene graph, its properties, controllers and physics are
//! all reachable from the roots through [`Reference`]s.
//!
//! # Quick Start
//!
//! ```no_run
//! use nifrost_nif::{Document, NiNode};
//!
//! let doc = Document::open("meshes/clutter/bucket01.nif")?;
//! println!("{} blocks, version {}", doc.len(), doc.version());
//!
//! for root in doc.roots() {
//!     let Some(record) = doc.resolve(*root) else { continue };
//!     println!("root {} {:?}", record.kind(), record.name());
//!     if let Some(node) = record.downcast::<NiNode>() {
//!         for child in &node.children {
//!             if let Some(child) = doc.resolve(*child) {
//!                 println!("  {}", child.kind());
//!             }
//!         }
//!     }
//! }
//! # Ok::<(), nifrost_nif::Error>(())
//! ```
//!
//! # Versions and forks
//!
//! Every field of every record is guarded by a [`Gate`] over three axes:
//! the file version, the user version and Bethesda's stream version. The
//! same type tag can therefore have many layouts. Layouts for forks this
//! crate does not decode are reported as unsupported rather than misread.
//!
//! # Recoverable problems
//!
//! Unsupported record types, block size mismatches, truncated tables and
//! trailing bytes are collected as [`Warning`]s on the [`Document`]. With
//! [`LoadOptions::strict`] an unsupported record fails the load instead.

pub mod compound;
mod document;
pub mod error;
pub mod gate;
pub mod header;
pub mod reader;
pub mod records;
mod reference;
mod resolve;
mod table;
#[cfg(test)]
mod testing;
pub mod version;

pub use document::{load, Document, LoadOptions, DEFAULT_MAX_BANNER_LEN};
pub use error::{Error, ReferenceKind, Result, Warning};
pub use gate::Gate;
pub use header::{BsStreamHeader, Header};
pub use records::*;
pub use reference::Reference;
pub use version::{Banner, Vendor, Version, VersionContext};
