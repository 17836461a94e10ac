//! Block links.

use std::fmt;

/// A link to another block, as stored on disk.
///
/// Forward links (children, data) and back links (parent, target) share this
/// type. Negative values mean "no block". Non-negative values are validated
/// against the block count when the document loads, so a [`Reference`]
/// obtained from a loaded document is either none or in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Reference(i32);

impl Reference {
    /// The canonical absent link.
    pub const NONE: Reference = Reference(-1);

    pub const fn new(raw: i32) -> Self {
        Self(raw)
    }

    /// The raw on-disk value.
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Block index, or `None` for absent links.
    pub const fn index(self) -> Option<u32> {
        if self.0 < 0 {
            None
        } else {
            Some(self.0 as u32)
        }
    }

    pub const fn is_none(self) -> bool {
        self.0 < 0
    }
}

impl Default for Reference {
    fn default() -> Self {
        Self::NONE
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index() {
            Some(i) => write!(f, "#{i}"),
            None => f.write_str("none"),
        }
    }
}
