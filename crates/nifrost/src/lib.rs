//! Nifrost - NetImmerse/Gamebryo asset decoding library.
//!
//! This crate provides a unified interface to the nifrost crates.
//!
//! # Crates
//!
//! - [`nifrost_common`] - Common utilities (endian-aware byte cursor, Latin-1 strings)
//! - [`nifrost_nif`] - `.nif` scene graph decoding
//!
//! # Example
//!
//! ```no_run
//! use nifrost::prelude::*;
//!
//! let doc = Document::open("meshes/furniture/chair01.nif")?;
//! for warning in doc.warnings() {
//!     eprintln!("warning: {warning}");
//! }
//! if let Some(root) = doc.roots().first().and_then(|r| doc.resolve_as::<NiNode>(*r)) {
//!     println!("{}: {} children", root.av.net.name, root.children.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

// Re-export all sub-crates
pub use nifrost_common as common;
pub use nifrost_nif as nif;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use nifrost_common::{ByteCursor, Endian};
    pub use nifrost_nif::{
        load, Document, Error, LoadOptions, NiAvObject, NiNode, NiObjectNet, Record, RecordData,
        Reference, Version, VersionContext, Warning,
    };
}

// Re-export commonly used types at the crate root
pub use nifrost_nif::{load, Document, LoadOptions};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
