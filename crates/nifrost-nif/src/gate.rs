//! Declarative field-presence predicates.
//!
//! Every optional field of every record is guarded by a [`Gate`]. Gates are
//! plain data, so each record module keeps its gates as named constants and
//! the whole version matrix can be tested without reading a byte.

use crate::version::{Version, VersionContext};

/// A predicate over the three version axes. Ranges are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    Always,
    Version(Version, Version),
    UserVersion(u32, u32),
    UserVersion2(u32, u32),
    All(&'static [Gate]),
    Any(&'static [Gate]),
}

impl Gate {
    /// File version at or above `v`.
    pub const fn since(v: Version) -> Self {
        Self::Version(v, Version::MAX)
    }

    /// File version at or below `v`.
    pub const fn until(v: Version) -> Self {
        Self::Version(Version::from_raw(0), v)
    }

    /// File version in `lo..=hi`.
    pub const fn between(lo: Version, hi: Version) -> Self {
        Self::Version(lo, hi)
    }

    /// File version exactly `v`.
    pub const fn exactly(v: Version) -> Self {
        Self::Version(v, v)
    }

    /// User version at or above `n`.
    pub const fn user_at_least(n: u32) -> Self {
        Self::UserVersion(n, u32::MAX)
    }

    /// User version 2 strictly above `n`.
    pub const fn bs_above(n: u32) -> Self {
        Self::UserVersion2(n + 1, u32::MAX)
    }

    /// User version 2 at or below `n`.
    pub const fn bs_at_most(n: u32) -> Self {
        Self::UserVersion2(0, n)
    }

    /// User version 2 in `lo..=hi`.
    pub const fn bs_range(lo: u32, hi: u32) -> Self {
        Self::UserVersion2(lo, hi)
    }

    /// Evaluate against a document's version axes.
    pub fn matches(&self, ctx: &VersionContext) -> bool {
        match *self {
            Self::Always => true,
            Self::Version(lo, hi) => (lo..=hi).contains(&ctx.version()),
            Self::UserVersion(lo, hi) => (lo..=hi).contains(&ctx.user_version()),
            Self::UserVersion2(lo, hi) => (lo..=hi).contains(&ctx.user_version_2()),
            Self::All(gates) => gates.iter().all(|g| g.matches(ctx)),
            Self::Any(gates) => gates.iter().any(|g| g.matches(ctx)),
        }
    }
}

/// Version constants shared by gates across modules.
pub mod v {
    use crate::version::Version;

    pub const V3_3_0_13: Version = Version::new(3, 3, 0, 13);
    pub const V4_0_0_0: Version = Version::new(4, 0, 0, 0);
    pub const V4_0_0_1: Version = Version::new(4, 0, 0, 1);
    pub const V4_0_0_2: Version = Version::new(4, 0, 0, 2);
    pub const V4_1_0_1: Version = Version::new(4, 1, 0, 1);
    pub const V4_1_0_12: Version = Version::new(4, 1, 0, 12);
    pub const V4_2_0_2: Version = Version::new(4, 2, 0, 2);
    pub const V4_2_1_0: Version = Version::new(4, 2, 1, 0);
    pub const V4_2_2_0: Version = Version::new(4, 2, 2, 0);
    pub const V5_0_0_1: Version = Version::new(5, 0, 0, 1);
    pub const V5_0_0_6: Version = Version::new(5, 0, 0, 6);
    pub const V10_0_1_0: Version = Version::new(10, 0, 1, 0);
    pub const V10_0_1_2: Version = Version::new(10, 0, 1, 2);
    pub const V10_0_1_3: Version = Version::new(10, 0, 1, 3);
    pub const V10_0_1_4: Version = Version::new(10, 0, 1, 4);
    pub const V10_0_1_8: Version = Version::new(10, 0, 1, 8);
    pub const V10_1_0_0: Version = Version::new(10, 1, 0, 0);
    pub const V10_1_0_101: Version = Version::new(10, 1, 0, 101);
    pub const V10_1_0_103: Version = Version::new(10, 1, 0, 103);
    pub const V10_1_0_104: Version = Version::new(10, 1, 0, 104);
    pub const V10_1_0_105: Version = Version::new(10, 1, 0, 105);
    pub const V10_1_0_106: Version = Version::new(10, 1, 0, 106);
    pub const V10_1_0_108: Version = Version::new(10, 1, 0, 108);
    pub const V10_1_0_109: Version = Version::new(10, 1, 0, 109);
    pub const V10_1_0_110: Version = Version::new(10, 1, 0, 110);
    pub const V10_1_0_112: Version = Version::new(10, 1, 0, 112);
    pub const V10_1_0_113: Version = Version::new(10, 1, 0, 113);
    pub const V10_1_0_114: Version = Version::new(10, 1, 0, 114);
    pub const V10_2_0_0: Version = Version::new(10, 2, 0, 0);
    pub const V10_4_0_1: Version = Version::new(10, 4, 0, 1);
    pub const V10_2_0_1: Version = Version::new(10, 2, 0, 1);
    pub const V20_0_0_3: Version = Version::new(20, 0, 0, 3);
    pub const V20_0_0_4: Version = Version::new(20, 0, 0, 4);
    pub const V20_0_0_5: Version = Version::new(20, 0, 0, 5);
    pub const V20_1_0_0: Version = Version::new(20, 1, 0, 0);
    pub const V20_1_0_1: Version = Version::new(20, 1, 0, 1);
    pub const V20_1_0_2: Version = Version::new(20, 1, 0, 2);
    pub const V20_1_0_3: Version = Version::new(20, 1, 0, 3);
    pub const V20_2_0_4: Version = Version::new(20, 2, 0, 4);
    pub const V20_2_0_5: Version = Version::new(20, 2, 0, 5);
    pub const V20_2_0_7: Version = Version::new(20, 2, 0, 7);
    pub const V20_3_0_9: Version = Version::new(20, 3, 0, 9);
}
