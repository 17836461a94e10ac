//! The NIF file header.
//!
//! The header is everything between the banner line and the first block:
//! version fields, the optional Bethesda stream header, and the tables that
//! describe the blocks (type names, type index, sizes, shared strings).

use log::debug;
use nifrost_common::{bounded_capacity, decode_latin1, ByteCursor, Endian};

use crate::error::ReferenceKind;
use crate::gate::{v, Gate};
use crate::version::{Banner, Version, VersionContext};
use crate::{Error, Result};

const ENDIAN_BYTE: Gate = Gate::since(v::V20_0_0_3);
const USER_VERSION: Gate = Gate::since(v::V10_0_1_8);
const BLOCK_TYPES: Gate = Gate::since(v::V5_0_0_1);
const BLOCK_SIZES: Gate = Gate::since(v::V20_2_0_5);
const STRING_TABLE: Gate = Gate::since(v::V20_1_0_1);
const GROUPS: Gate = Gate::since(v::V5_0_0_6);

/// High bit of a block type index entry flags PhysX blocks.
const BLOCK_TYPE_INDEX_MASK: u16 = 0x7FFF;

/// Bethesda's export metadata.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BsStreamHeader {
    /// Second fork version (`user_version_2`).
    pub bs_version: u32,
    pub author: String,
    pub unknown: Option<u32>,
    pub process_script: Option<String>,
    pub export_script: String,
    pub max_filepath: Option<String>,
}

impl BsStreamHeader {
    /// Whether a file with these versions carries a stream header.
    pub fn is_present(version: Version, user_version: u32) -> bool {
        if version == v::V10_0_1_2 {
            return true;
        }
        let bethesda = version == v::V20_2_0_7
            || version == v::V20_0_0_5
            || ((v::V10_1_0_0..=v::V20_0_0_4).contains(&version) && user_version <= 11);
        bethesda && user_version >= 3
    }

    fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let bs_version = cursor.read_u32()?;
        let author = export_string(cursor)?;
        let unknown = if bs_version > 130 {
            Some(cursor.read_u32()?)
        } else {
            None
        };
        let process_script = if bs_version < 131 {
            Some(export_string(cursor)?)
        } else {
            None
        };
        let export_script = export_string(cursor)?;
        let max_filepath = if bs_version >= 103 {
            Some(export_string(cursor)?)
        } else {
            None
        };
        Ok(Self {
            bs_version,
            author,
            unknown,
            process_script,
            export_script,
            max_filepath,
        })
    }
}

/// u8 length, bytes including a NUL terminator.
fn export_string(cursor: &mut ByteCursor<'_>) -> Result<String> {
    let bytes = cursor.read_l8_bytes()?;
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    Ok(decode_latin1(&bytes[..end]))
}

fn sized_string(cursor: &mut ByteCursor<'_>) -> Result<String> {
    Ok(decode_latin1(cursor.read_l32_bytes()?))
}

/// Parsed file header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub banner: Banner,
    /// The version as stored in binary, which may disagree with the banner.
    pub binary_version: Version,
    pub endian: Endian,
    pub user_version: u32,
    pub num_blocks: u32,
    pub bs_header: Option<BsStreamHeader>,
    /// Distinct block type names (5.0.0.1+).
    pub block_types: Vec<String>,
    /// Per block, an index into `block_types`.
    pub block_type_index: Vec<u16>,
    /// Per block, its size in bytes (20.2.0.5+).
    pub block_sizes: Vec<u32>,
    /// Shared string table (20.1.0.1+).
    pub strings: Vec<String>,
    pub max_string_length: u32,
    pub groups: Vec<u32>,
}

impl Header {
    /// Read the header. Leaves the cursor at the first block and switched
    /// to the file's byte order.
    pub fn read(cursor: &mut ByteCursor<'_>, max_banner_len: usize) -> Result<Self> {
        let line = cursor
            .read_line(max_banner_len)
            .map_err(|e| Error::HeaderUnparseable(e.to_string()))?;
        let banner = Banner::parse(&decode_latin1(line))?;
        let version = banner.version;
        if !version.is_supported() {
            return Err(Error::UnsupportedVersion(version));
        }

        let binary_version = Version::from_raw(cursor.read_u32()?);
        if binary_version != version {
            debug!("binary version {binary_version} differs from banner version {version}");
        }

        let gated = |gate: Gate| gate.matches(&VersionContext::new(version, 0, 0));

        let endian = if gated(ENDIAN_BYTE) {
            let at = cursor.position();
            match cursor.read_u8()? {
                0 => Endian::Big,
                1 => Endian::Little,
                other => {
                    return Err(Error::Common(nifrost_common::Error::invalid(
                        at,
                        format!("invalid endian byte {other}"),
                    )))
                }
            }
        } else {
            Endian::Little
        };
        cursor.set_endian(endian);

        let user_version = if gated(USER_VERSION) {
            cursor.read_u32()?
        } else {
            0
        };
        let num_blocks = cursor.read_u32()?;

        let bs_header = if BsStreamHeader::is_present(version, user_version) {
            Some(BsStreamHeader::read(cursor)?)
        } else {
            None
        };

        let (block_types, block_type_index) = if gated(BLOCK_TYPES) {
            let count = cursor.read_u16()? as usize;
            let types = cursor.read_array(count, |c| Ok(decode_latin1(c.read_l32_bytes()?)))?;
            let index = cursor.read_array(num_blocks as usize, |c| {
                Ok(c.read_u16()? & BLOCK_TYPE_INDEX_MASK)
            })?;
            if let Some(&bad) = index.iter().find(|&&i| i as usize >= types.len()) {
                return Err(Error::corrupt(ReferenceKind::BlockType, bad, types.len()));
            }
            (types, index)
        } else {
            (Vec::new(), Vec::new())
        };

        let block_sizes = if gated(BLOCK_SIZES) {
            cursor.read_array(num_blocks as usize, ByteCursor::read_u32)?
        } else {
            Vec::new()
        };

        let (strings, max_string_length) = if gated(STRING_TABLE) {
            let count = cursor.read_u32()? as usize;
            let max_len = cursor.read_u32()?;
            let mut strings = Vec::with_capacity(bounded_capacity::<String>(count, cursor.remaining()));
            for _ in 0..count {
                strings.push(sized_string(cursor)?);
            }
            (strings, max_len)
        } else {
            (Vec::new(), 0)
        };

        let groups = if gated(GROUPS) {
            let count = cursor.read_u32()? as usize;
            cursor.read_array(count, ByteCursor::read_u32)?
        } else {
            Vec::new()
        };

        Ok(Self {
            banner,
            binary_version,
            endian,
            user_version,
            num_blocks,
            bs_header,
            block_types,
            block_type_index,
            block_sizes,
            strings,
            max_string_length,
            groups,
        })
    }

    pub fn version(&self) -> Version {
        self.banner.version
    }

    /// The version axes for gating every field of this document.
    pub fn context(&self) -> VersionContext {
        VersionContext::new(
            self.version(),
            self.user_version,
            self.bs_header.as_ref().map_or(0, |bs| bs.bs_version),
        )
    }

    /// Type name of block `index`, when the header lists them.
    pub fn block_type(&self, index: usize) -> Option<&str> {
        let ty = *self.block_type_index.get(index)?;
        self.block_types.get(ty as usize).map(String::as_str)
    }

    /// Declared size of block `index`, when the header lists them.
    pub fn block_size(&self, index: usize) -> Option<u32> {
        self.block_sizes.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::DocBuilder;

    fn read(bytes: &[u8]) -> Result<(Header, usize)> {
        let mut cursor = ByteCursor::new(bytes);
        let header = Header::read(&mut cursor, 128)?;
        Ok((header, cursor.position()))
    }

    #[test]
    fn test_skyrim_header() {
        let bytes = DocBuilder::new(v::V20_2_0_7, 12, 83)
            .raw_block("NiNode", &[])
            .raw_block("NiNode", &[])
            .raw_block("BSXFlags", &[])
            .author("nifrost")
            .build();
        let (h, _) = read(&bytes).unwrap();

        assert_eq!(h.version(), v::V20_2_0_7);
        assert_eq!(h.binary_version, v::V20_2_0_7);
        assert_eq!(h.endian, Endian::Little);
        assert_eq!(h.user_version, 12);
        assert_eq!(h.num_blocks, 3);
        let bs = h.bs_header.as_ref().unwrap();
        assert_eq!(bs.bs_version, 83);
        assert_eq!(bs.author, "nifrost");
        assert_eq!(bs.max_filepath, None);
        assert_eq!(h.block_types, vec!["NiNode", "BSXFlags"]);
        assert_eq!(h.block_type_index, vec![0, 0, 1]);
        assert_eq!(h.block_type(2), Some("BSXFlags"));
        assert_eq!(h.block_sizes, vec![0, 0, 0]);
        assert_eq!(h.context(), VersionContext::new(v::V20_2_0_7, 12, 83));
    }

    #[test]
    fn test_morrowind_header_has_no_tables() {
        let bytes = DocBuilder::new(v::V4_0_0_2, 0, 0)
            .raw_block("NiNode", &[])
            .build();
        let (h, pos) = read(&bytes).unwrap();

        assert_eq!(h.banner.text, "NetImmerse File Format, Version 4.0.0.2");
        assert!(h.bs_header.is_none());
        assert!(h.block_types.is_empty());
        assert!(h.block_sizes.is_empty());
        assert_eq!(h.num_blocks, 1);
        assert_eq!(pos, h.banner.text.len() + 1 + 8);
    }

    #[test]
    fn test_big_endian_switch() {
        let bytes = DocBuilder::new(v::V20_1_0_3, 0, 0)
            .big_endian()
            .raw_block("NiNode", &[])
            .build();
        let (h, _) = read(&bytes).unwrap();
        assert_eq!(h.endian, Endian::Big);
        assert_eq!(h.num_blocks, 1);
        assert_eq!(h.block_types, vec!["NiNode"]);
    }

    #[test]
    fn test_stream_header_presence() {
        assert!(BsStreamHeader::is_present(v::V20_2_0_7, 12));
        assert!(BsStreamHeader::is_present(v::V20_0_0_5, 11));
        assert!(BsStreamHeader::is_present(v::V10_0_1_2, 0));
        assert!(BsStreamHeader::is_present(Version::new(10, 2, 0, 0), 10));
        assert!(!BsStreamHeader::is_present(v::V20_2_0_7, 0));
        assert!(!BsStreamHeader::is_present(Version::new(20, 0, 0, 4), 12));
        assert!(!BsStreamHeader::is_present(v::V20_1_0_3, 11));
    }

    #[test]
    fn test_unsupported_version() {
        let mut bytes = b"NetImmerse File Format, Version 3.1\n".to_vec();
        bytes.extend_from_slice(&[0; 16]);
        assert!(matches!(read(&bytes), Err(Error::UnsupportedVersion(v)) if v.raw() == 0x03010000));
    }

    #[test]
    fn test_banner_without_newline() {
        let bytes = [b'x'; 200];
        assert!(matches!(read(&bytes), Err(Error::HeaderUnparseable(_))));
    }

    #[test]
    fn test_bad_block_type_index() {
        let mut bytes = DocBuilder::new(v::V20_0_0_5, 11, 11)
            .raw_block("NiNode", &[])
            .build();
        // The type index directly follows the last type name.
        let name_at = bytes.windows(6).position(|w| w == b"NiNode").unwrap();
        bytes[name_at + 6] = 5;
        assert!(matches!(
            read(&bytes),
            Err(Error::CorruptReference {
                kind: ReferenceKind::BlockType,
                value: 5,
                limit: 1
            })
        ));
    }
}
