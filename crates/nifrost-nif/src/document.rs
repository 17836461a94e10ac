//! Loaded NIF documents.

use std::fs::File;
use std::path::Path;

use log::{debug, warn};
use memmap2::Mmap;
use nifrost_common::ByteCursor;

use crate::error::Warning;
use crate::header::Header;
use crate::records::{BlockNames, ControlledNames, Record, RecordType};
use crate::reference::Reference;
use crate::resolve;
use crate::table::{BlockTable, Slot};
use crate::version::{Version, VersionContext};
use crate::Result;

/// Default bound on the search for the banner's newline.
pub const DEFAULT_MAX_BANNER_LEN: usize = 128;

/// Knobs for [`Document::load_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Fail on record types without a decoder instead of leaving the slot
    /// empty.
    pub strict: bool,
    /// Compare the bytes each decoder consumed against the header's size
    /// table (20.2.0.5+) and realign on mismatch.
    pub check_block_sizes: bool,
    pub max_banner_len: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            strict: false,
            check_block_sizes: true,
            max_banner_len: DEFAULT_MAX_BANNER_LEN,
        }
    }
}

impl LoadOptions {
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn check_block_sizes(mut self, check: bool) -> Self {
        self.check_block_sizes = check;
        self
    }

    pub fn max_banner_len(mut self, len: usize) -> Self {
        self.max_banner_len = len;
        self
    }
}

/// Load a document from a complete buffer with default options.
pub fn load(bytes: &[u8]) -> Result<Document> {
    Document::load_with(bytes, &LoadOptions::default())
}

/// A decoded NIF file: header, block table and root list.
///
/// All links inside a document have been validated against its block
/// count, so every [`Reference`] obtained from it is either absent or in
/// range.
///
/// # Example
///
/// ```no_run
/// use nifrost_nif::{Document, NiNode};
///
/// let doc = Document::open("meshes/chair.nif")?;
/// for root in doc.roots() {
///     if let Some(node) = doc.resolve_as::<NiNode>(*root) {
///         println!("{} has {} children", node.av.net.name, node.children.len());
///     }
/// }
/// # Ok::<(), nifrost_nif::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    header: Header,
    slots: Vec<Slot>,
    roots: Vec<Reference>,
    warnings: Vec<Warning>,
}

impl Document {
    /// Memory-map and load a file with default options.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, &LoadOptions::default())
    }

    /// Memory-map and load a file.
    pub fn open_with<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the mapping is only read during the load and dropped
        // before returning. The document owns everything it decoded.
        let mmap = unsafe { Mmap::map(&file)? };
        Self::load_with(&mmap, options)
    }

    /// Load a document from a complete buffer.
    pub fn load_with(bytes: &[u8], options: &LoadOptions) -> Result<Self> {
        let mut cursor = ByteCursor::new(bytes);
        let header = Header::read(&mut cursor, options.max_banner_len)?;
        let ctx = header.context();
        debug!(
            "{:?} {} (user {}, bs {}): {} blocks, {} types, {} strings",
            header.banner.vendor,
            ctx.version(),
            ctx.user_version(),
            ctx.user_version_2(),
            header.num_blocks,
            header.block_types.len(),
            header.strings.len()
        );

        let table = BlockTable::read(&mut cursor, &header, options)?;
        let mut warnings = table.warnings;

        let roots = if table.complete {
            let count = cursor.read_u32()? as usize;
            let roots = cursor.read_array(count, |c| Ok(Reference::new(c.read_i32()?)))?;
            if !cursor.is_empty() {
                let (offset, count) = (cursor.position(), cursor.remaining());
                warn!("{count} trailing bytes after footer at {offset:#x}");
                warnings.push(Warning::TrailingBytes { offset, count });
            }
            roots
        } else {
            Vec::new()
        };

        resolve::validate(&table.slots, &roots)?;

        Ok(Self {
            header,
            slots: table.slots,
            roots,
            warnings,
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn version(&self) -> Version {
        self.header.version()
    }

    pub fn context(&self) -> VersionContext {
        self.header.context()
    }

    /// Number of block slots, including empty ones.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The footer's root list, in file order.
    pub fn roots(&self) -> &[Reference] {
        &self.roots
    }

    /// Recoverable problems found while loading.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// The record at `index`, or `None` when out of range or unsupported.
    pub fn get(&self, index: u32) -> Option<&Record> {
        self.slots.get(index as usize)?.record.as_ref()
    }

    /// The type tag of block `index` as written in the file, also for
    /// blocks that were not decoded.
    pub fn kind(&self, index: u32) -> Option<&str> {
        let tag = &self.slots.get(index as usize)?.tag;
        (!tag.is_empty()).then_some(tag.as_str())
    }

    pub fn resolve(&self, link: Reference) -> Option<&Record> {
        self.get(link.index()?)
    }

    pub fn resolve_as<T: RecordType>(&self, link: Reference) -> Option<&T> {
        self.resolve(link)?.downcast()
    }

    /// Every block link held by record `index`, absent ones included.
    pub fn links(&self, index: u32) -> &[Reference] {
        self.slots
            .get(index as usize)
            .map_or(&[], |slot| slot.links.as_slice())
    }

    /// Indices of the scene graph children of node `index`.
    pub fn children(&self, index: u32) -> impl Iterator<Item = u32> + '_ {
        self.get(index)
            .and_then(Record::node)
            .into_iter()
            .flat_map(|node| node.children.iter().filter_map(|c| c.index()))
    }

    /// Decoded records with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &Record)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| Some((i as u32, slot.record.as_ref()?)))
    }

    /// Names of each controlled block of the sequence at `index`, looking
    /// through string palettes where the file uses them.
    ///
    /// Empty when `index` is not a sequence. Blocks that store no names
    /// get [`BlockNames::default`].
    pub fn block_names(&self, index: u32) -> Vec<BlockNames> {
        let Some(record) = self.get(index) else {
            return Vec::new();
        };
        let Some(sequence) = resolve::sequence_of(record) else {
            return Vec::new();
        };
        sequence
            .controlled_blocks
            .iter()
            .map(|block| {
                let palette = match &block.names {
                    ControlledNames::Palette { palette, .. } => {
                        resolve::palette_for(record, *palette, &self.slots)
                    }
                    _ => None,
                };
                block.names(palette).unwrap_or_default()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compound::havok::{Fallout3Material, OblivionMaterial, SkyrimMaterial};
    use crate::compound::HavokFork;
    use crate::error::ReferenceKind;
    use crate::gate::v;
    use crate::records::object::tests::write_node;
    use crate::records::sequence::tests::palette_bytes;
    use crate::records::{BhkSphereShape, NiFloatData, NiIntegerExtraData, NiNode};
    use crate::records::NiControllerSequence;
    use crate::testing::{hex, DocBuilder};
    use crate::Error;

    fn skyrim_scene() -> Vec<u8> {
        let mut doc = DocBuilder::new(v::V20_2_0_7, 12, 83);
        let c = doc.context();
        doc.block("BSFadeNode", |w| write_node(w, c, "Scene Root", &[1, 2]))
            .block("NiNode", |w| write_node(w, c, "Arm", &[0]))
            .block("BSXFlags", |w| {
                w.string("BSX").u32(0xC2);
            })
            .author("nifrost");
        doc.build()
    }

    #[test]
    fn test_empty_document() {
        let bytes = DocBuilder::new(v::V20_2_0_7, 12, 83).build();
        let doc = load(&bytes).unwrap();

        assert!(doc.is_empty());
        assert!(doc.roots().is_empty());
        assert!(doc.warnings().is_empty());
        assert_eq!(doc.version(), v::V20_2_0_7);
    }

    #[test]
    fn test_scene_traversal() {
        let doc = load(&skyrim_scene()).unwrap();

        assert_eq!(doc.len(), 3);
        assert_eq!(doc.roots(), &[Reference::new(0)]);
        let root = doc.resolve(doc.roots()[0]).unwrap();
        assert_eq!(root.kind(), "BSFadeNode");
        assert_eq!(root.name(), Some("Scene Root"));
        assert_eq!(doc.children(0).collect::<Vec<_>>(), vec![1, 2]);
        // Back-edge from the child to the root is legal.
        assert_eq!(doc.children(1).collect::<Vec<_>>(), vec![0]);
        assert_eq!(doc.children(2).count(), 0);
        assert_eq!(doc.resolve_as::<NiIntegerExtraData>(Reference::new(2)).map(|x| x.value), Some(0xC2));
        assert!(doc.resolve_as::<NiNode>(Reference::new(2)).is_none());
        assert!(doc.resolve(Reference::NONE).is_none());
        assert_eq!(doc.links(0).len(), 4);
        assert!(doc.links(9).is_empty());
        assert_eq!(doc.iter().count(), 3);
    }

    #[test]
    fn test_load_is_deterministic() {
        let bytes = skyrim_scene();
        assert_eq!(load(&bytes).unwrap(), load(&bytes).unwrap());
    }

    #[test]
    fn test_roots_keep_declared_length() {
        let mut doc = DocBuilder::new(v::V20_0_0_5, 11, 11);
        let c = doc.context();
        doc.block("NiNode", |w| write_node(w, c, "A", &[]))
            .block("NiNode", |w| write_node(w, c, "B", &[]))
            .roots(&[1, -1, 1, 0]);
        let doc = load(&doc.build()).unwrap();

        assert_eq!(doc.roots().len(), 4);
        assert!(doc.resolve(doc.roots()[1]).is_none());
        assert_eq!(doc.resolve(doc.roots()[2]).and_then(Record::name), Some("B"));
    }

    #[test]
    fn test_unknown_tag_leaves_empty_slot() {
        let mut doc = DocBuilder::new(v::V20_2_0_7, 12, 83);
        let c = doc.context();
        doc.block("NiNode", |w| write_node(w, c, "Scene Root", &[1]))
            .raw_block("NiMadeUpThing", &[1, 2, 3, 4, 5]);
        let doc = load(&doc.build()).unwrap();

        assert_eq!(doc.len(), 2);
        assert!(doc.get(1).is_none());
        assert_eq!(doc.kind(1), Some("NiMadeUpThing"));
        assert_eq!(doc.children(0).collect::<Vec<_>>(), vec![1]);
        assert_eq!(
            doc.warnings(),
            &[Warning::UnsupportedRecordType {
                index: 1,
                kind: "NiMadeUpThing".into()
            }]
        );
    }

    #[test]
    fn test_sole_unknown_record_truncates_table() {
        let mut doc = DocBuilder::new(v::V20_0_0_5, 11, 11);
        doc.raw_block("NiMadeUpThing", &[7; 12]);
        let doc = load(&doc.build()).unwrap();

        assert_eq!(doc.len(), 1);
        assert!(doc.get(0).is_none());
        assert_eq!(doc.kind(0), Some("NiMadeUpThing"));
        assert!(doc.roots().is_empty());
        assert_eq!(
            doc.warnings(),
            &[
                Warning::UnsupportedRecordType {
                    index: 0,
                    kind: "NiMadeUpThing".into()
                },
                Warning::TableTruncated {
                    index: 0,
                    remaining: 0
                },
            ]
        );
    }

    /// A complete 10.1.0.104 animation file with one sequence block.
    const EARLY_KF: &str = "
        47 61 6D 65 62 72 79 6F 20 46 69 6C 65 20 46 6F
        72 6D 61 74 2C 20 56 65 72 73 69 6F 6E 20 31 30
        2E 31 2E 30 2E 31 30 34 0A                       # banner
        68 00 01 0A                                      # binary version
        00 00 00 00                                      # user version
        01 00 00 00                                      # block count
        01 00                                            # block type count
        14 00 00 00 4E 69 43 6F 6E 74 72 6F 6C 6C 65 72
        53 65 71 75 65 6E 63 65                          # NiControllerSequence
        00 00                                            # type index
        00 00 00 00                                      # groups
        00 00 00 00                                      # block marker
        04 00 00 00 49 64 6C 65                          # name: Idle
        00 00 00 00                                      # controlled block count
        01 00 00 00                                      # footer root count
        00 00 00 00                                      # root 0
    ";

    #[test]
    fn test_early_sequence_file_reaches_footer() {
        let doc = load(&hex(EARLY_KF)).unwrap();

        assert_eq!(doc.version(), v::V10_1_0_104);
        assert!(doc.warnings().is_empty());
        assert_eq!(doc.roots(), &[Reference::new(0)]);
        let seq = doc.resolve_as::<NiControllerSequence>(Reference::new(0)).unwrap();
        assert_eq!(seq.sequence.name, "Idle");
        assert!(seq.sequence.controlled_blocks.is_empty());
        assert_eq!(seq.stop_time, None);
        assert_eq!(seq.manager, None);
    }

    #[test]
    fn test_truncated_table_has_no_roots() {
        let mut doc = DocBuilder::new(v::V10_0_1_0, 0, 0);
        let c = doc.context();
        doc.block("NiNode", |w| write_node(w, c, "Scene Root", &[]))
            .raw_block("NiMadeUpThing", &[0; 8])
            .block("NiNode", |w| write_node(w, c, "Lost", &[]));
        let doc = load(&doc.build()).unwrap();

        assert_eq!(doc.len(), 3);
        assert!(doc.roots().is_empty());
        assert!(doc.get(2).is_none());
        assert_eq!(doc.kind(2), None);
        assert!(matches!(doc.warnings().last(), Some(Warning::TableTruncated { index: 1, remaining: 1 })));
    }

    #[test]
    fn test_out_of_range_link_fails() {
        let mut doc = DocBuilder::new(v::V20_2_0_7, 12, 83);
        let c = doc.context();
        doc.block("NiNode", |w| write_node(w, c, "Scene Root", &[3]));
        let err = load(&doc.build()).unwrap_err();

        assert!(matches!(
            err.root_cause(),
            Error::CorruptReference {
                kind: ReferenceKind::Block,
                value: 3,
                limit: 1
            }
        ));
    }

    #[test]
    fn test_out_of_range_root_fails() {
        let mut doc = DocBuilder::new(v::V20_2_0_7, 12, 83);
        let c = doc.context();
        doc.block("NiNode", |w| write_node(w, c, "Scene Root", &[])).roots(&[1]);
        let err = load(&doc.build()).unwrap_err();
        assert!(matches!(err, Error::CorruptReference { value: 1, .. }));
    }

    #[test]
    fn test_trailing_bytes_warning() {
        let bytes = DocBuilder::new(v::V20_2_0_7, 12, 83)
            .block("BSXFlags", |w| {
                w.string("BSX").u32(0);
            })
            .trailing(&[0xFF; 3])
            .build();
        let doc = load(&bytes).unwrap();

        match doc.warnings() {
            [Warning::TrailingBytes { count, offset }] => {
                assert_eq!(*count, 3);
                assert_eq!(*offset, bytes.len() - 3);
            }
            other => panic!("unexpected warnings {other:?}"),
        }
    }

    #[test]
    fn test_key_groups_consume_by_interpolation() {
        // Two keys each: linear keys are 8 bytes, quadratic keys 16.
        let build = |interpolation: u32| {
            DocBuilder::new(v::V20_2_0_7, 12, 83)
                .block("NiFloatData", |w| {
                    w.u32(2).u32(interpolation);
                    for t in [0.0, 1.0] {
                        w.f32(t).f32(t * 2.0);
                        if interpolation == 2 {
                            w.f32(0.5).f32(-0.5);
                        }
                    }
                })
                .build()
        };
        let linear = build(1);
        let quadratic = build(2);
        assert_eq!(quadratic.len() - linear.len(), 16);

        for bytes in [linear, quadratic] {
            let doc = load(&bytes).unwrap();
            assert!(doc.warnings().is_empty());
            let data = doc.resolve_as::<NiFloatData>(Reference::new(0)).unwrap();
            assert_eq!(data.keys.keys[1].value, 2.0);
        }
    }

    #[test]
    fn test_skyrim_havok_material() {
        let bytes = DocBuilder::new(v::V20_2_0_7, 12, 83)
            .block("bhkSphereShape", |w| {
                w.u32(SkyrimMaterial::BROKEN_STONE.0).f32(0.25);
            })
            .build();
        let doc = load(&bytes).unwrap();
        let shape = doc.resolve_as::<BhkSphereShape>(Reference::new(0)).unwrap();

        let material = shape.material;
        assert_eq!(material.fork, HavokFork::Skyrim);
        assert_eq!(material.skyrim, SkyrimMaterial::BROKEN_STONE);
        assert_eq!(material.oblivion, OblivionMaterial::default());
        assert_eq!(material.fallout3, Fallout3Material::default());
        assert_eq!(shape.radius, 0.25);
    }

    #[test]
    fn test_block_names_through_palette() {
        let mut doc = DocBuilder::new(v::V20_0_0_5, 11, 11);
        doc.raw_block("NiStringPalette", &{
            let mut body = (palette_bytes().len() as u32).to_le_bytes().to_vec();
            body.extend_from_slice(palette_bytes());
            body.extend_from_slice(&(palette_bytes().len() as u32).to_le_bytes());
            body
        });
        let bytes = doc
            .block("NiControllerSequence", |w| {
                w.sized_string("Idle").u32(1).u32(1);
                // Controlled block: interpolator, controller, priority,
                // palette, five offsets.
                w.link(-1).link(-1).u8(26).link(0);
                w.u32(0).u32(u32::MAX).u32(6).u32(u32::MAX).u32(u32::MAX);
                w.f32(1.0).link(-1).u32(0).f32(1.0);
                w.f32(0.0).f32(1.0).link(-1).sized_string("Bip01").link(0);
            })
            .roots(&[1])
            .build();
        let doc = load(&bytes).unwrap();

        let names = doc.block_names(1);
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].node, "Bip01");
        assert_eq!(names[0].controller_type, "NiTransformController");
        assert_eq!(names[0].property_type, "");
        assert!(doc.block_names(0).is_empty());
    }

    #[test]
    fn test_open_missing_file() {
        let err = Document::open("/nonexistent/nifrost/test.nif").unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_options_builder() {
        let options = LoadOptions::default().strict(true).max_banner_len(64);
        assert!(options.strict);
        assert!(options.check_block_sizes);
        assert_eq!(options.max_banner_len, 64);
    }
}
