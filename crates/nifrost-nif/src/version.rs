//! File versions, the version banner, and the three-axis version context.
//!
//! A NIF version is four bytes packed most significant first, so integer
//! order is version order. The first line of every file is a banner such as
//! `Gamebryo File Format, Version 20.2.0.7`.

use std::fmt;

use crate::{Error, Result};

/// A packed NIF file version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version(u32);

impl Version {
    /// Oldest version whose block links are indices.
    pub const MIN_SUPPORTED: Version = Version::new(3, 3, 0, 13);
    /// Newest version decoded.
    pub const MAX_SUPPORTED: Version = Version::new(20, 2, 0, 8);
    /// Below this, versions may use the two-segment banner form.
    pub const LEGACY_THRESHOLD: Version = Version::new(3, 3, 0, 13);
    /// Version used by NeoSteam's `NS` banner.
    pub const NEOSTEAM: Version = Version::new(10, 1, 0, 0);
    /// Highest representable version.
    pub const MAX: Version = Version(u32::MAX);

    /// Pack four version segments.
    pub const fn new(major: u8, minor: u8, patch: u8, build: u8) -> Self {
        Self(u32::from_be_bytes([major, minor, patch, build]))
    }

    /// Wrap an already packed value.
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// The packed integer.
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// The four segments, most significant first.
    pub const fn segments(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// Whether this version lies in the decodable range.
    pub fn is_supported(self) -> bool {
        (Self::MIN_SUPPORTED..=Self::MAX_SUPPORTED).contains(&self)
    }

    /// Decode a dotted version string.
    ///
    /// Two-segment strings with a major below 4 use the legacy form, where
    /// each digit after the dot is its own byte (`"3.03"` is `0x03000300`).
    /// Otherwise each of one to four segments is one byte.
    pub fn parse(s: &str) -> Result<Self> {
        let unparseable = || Error::HeaderUnparseable(format!("bad version string {s:?}"));
        let segments: Vec<&str> = s.split('.').collect();
        if segments.is_empty() || segments.len() > 4 {
            return Err(unparseable());
        }

        let major: u8 = segments[0].parse().map_err(|_| unparseable())?;
        if segments.len() == 2 && major < 4 {
            let digits = segments[1].as_bytes();
            if digits.is_empty() || digits.len() > 3 || !digits.iter().all(u8::is_ascii_digit) {
                return Err(unparseable());
            }
            let mut bytes = [major, 0, 0, 0];
            for (slot, digit) in bytes[1..].iter_mut().zip(digits) {
                *slot = digit - b'0';
            }
            return Ok(Self(u32::from_be_bytes(bytes)));
        }

        let mut bytes = [0u8; 4];
        for (slot, segment) in bytes.iter_mut().zip(&segments) {
            *slot = segment.parse().map_err(|_| unparseable())?;
        }
        Ok(Self(u32::from_be_bytes(bytes)))
    }

    /// Whether [`fmt::Display`] writes this version in the legacy form.
    fn is_legacy(self) -> bool {
        let [_, a, b, c] = self.segments();
        self < Self::LEGACY_THRESHOLD && a <= 9 && b <= 9 && c <= 9
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [major, a, b, c] = self.segments();
        if self.is_legacy() {
            let mut digits = [a, b, c].map(|d| (b'0' + d) as char).iter().collect::<String>();
            while digits.len() > 1 && digits.ends_with('0') {
                digits.pop();
            }
            write!(f, "{major}.{digits}")
        } else {
            write!(f, "{major}.{a}.{b}.{c}")
        }
    }
}

impl std::str::FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Who wrote the banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vendor {
    NetImmerse,
    Gamebryo,
    /// Ndoors (`NDSNIF....@....@....`).
    Ndoors,
    /// Joymaster (`Joymaster HS1 Object Format - (JMI)`).
    Joymaster,
    /// NeoSteam's bare `NS` banner.
    NeoSteam,
    Other,
}

impl Vendor {
    fn detect(line: &str) -> Self {
        if line.starts_with("NetImmerse") {
            Self::NetImmerse
        } else if line.starts_with("Gamebryo") {
            Self::Gamebryo
        } else if line.starts_with("NDSNIF") {
            Self::Ndoors
        } else if line.starts_with("Joymaster") {
            Self::Joymaster
        } else if line.starts_with("NS") {
            Self::NeoSteam
        } else {
            Self::Other
        }
    }
}

/// The parsed first line of a NIF file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    /// The line as written, without its newline.
    pub text: String,
    pub vendor: Vendor,
    pub version: Version,
}

impl Banner {
    /// Parse the banner line (without its newline).
    pub fn parse(line: &str) -> Result<Self> {
        let vendor = Vendor::detect(line);
        let version = match line.find("Version") {
            Some(at) => {
                let tail = line[at + "Version".len()..].trim_start();
                let end = tail
                    .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                    .unwrap_or(tail.len());
                let digits = &tail[..end];
                if digits.is_empty() {
                    return Err(Error::HeaderUnparseable(format!(
                        "no version number in banner {line:?}"
                    )));
                }
                Version::parse(digits)?
            }
            None if vendor == Vendor::NeoSteam => Version::NEOSTEAM,
            None => {
                return Err(Error::HeaderUnparseable(format!(
                    "banner has no version: {line:?}"
                )))
            }
        };

        Ok(Self {
            text: line.to_owned(),
            vendor,
            version,
        })
    }
}

/// The three version axes every field gate is evaluated against.
///
/// Fixed once the header has been read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VersionContext {
    version: Version,
    user_version: u32,
    user_version_2: u32,
}

impl VersionContext {
    pub const fn new(version: Version, user_version: u32, user_version_2: u32) -> Self {
        Self {
            version,
            user_version,
            user_version_2,
        }
    }

    /// The file version.
    pub const fn version(&self) -> Version {
        self.version
    }

    /// The fork ("user") version.
    pub const fn user_version(&self) -> u32 {
        self.user_version
    }

    /// The second fork version (Bethesda stream version).
    pub const fn user_version_2(&self) -> u32 {
        self.user_version_2
    }
}
