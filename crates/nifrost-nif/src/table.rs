//! The block loop between header and footer.

use log::{debug, trace, warn};
use nifrost_common::{bounded_capacity, decode_latin1, ByteCursor};

use crate::document::LoadOptions;
use crate::error::{ReferenceKind, Warning};
use crate::gate::{v, Gate};
use crate::header::Header;
use crate::reader::NifReader;
use crate::records::{self, Lookup, Record};
use crate::reference::Reference;
use crate::{Error, Result};

/// Each block starts with a u32 zero in this range, except physics blocks.
const BLOCK_MARKER: Gate = Gate::between(v::V5_0_0_1, v::V10_1_0_106);

/// Physics blocks carry no marker.
const HAVOK_PREFIX: &str = "bhk";

/// One entry of the block table.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct Slot {
    /// Type tag as written in the file. Empty when the table was truncated
    /// before this block.
    pub(crate) tag: String,
    /// Offset of the block's first byte, tag and marker included.
    pub(crate) offset: usize,
    /// `None` when the tag has no decoder for this fork.
    pub(crate) record: Option<Record>,
    /// Every block link the record holds, in read order.
    pub(crate) links: Vec<Reference>,
}

/// Result of reading every block between header and footer.
#[derive(Debug, Default)]
pub(crate) struct BlockTable {
    pub(crate) slots: Vec<Slot>,
    pub(crate) warnings: Vec<Warning>,
    /// False when an unsupported block without a declared size cut the
    /// table short. The footer cannot be located in that case.
    pub(crate) complete: bool,
}

impl BlockTable {
    /// Read `header.num_blocks` blocks starting at the cursor.
    pub(crate) fn read(
        cursor: &mut ByteCursor<'_>,
        header: &Header,
        options: &LoadOptions,
    ) -> Result<Self> {
        let ctx = header.context();
        let num_blocks = header.num_blocks;
        let inline_tags = ctx.version() < v::V5_0_0_1;
        let marker = BLOCK_MARKER.matches(&ctx);

        let mut table = Self {
            slots: Vec::with_capacity(bounded_capacity::<Slot>(num_blocks as usize, cursor.remaining())),
            warnings: Vec::new(),
            complete: true,
        };

        for index in 0..num_blocks {
            let offset = cursor.position();
            let tag = if inline_tags {
                decode_latin1(cursor.read_l32_bytes()?)
            } else {
                header
                    .block_type(index as usize)
                    .ok_or_else(|| {
                        Error::corrupt(ReferenceKind::BlockType, index, header.block_type_index.len())
                    })?
                    .to_owned()
            };
            let wrap = |source: Error| Error::Block {
                index,
                kind: tag.clone(),
                offset,
                source: Box::new(source),
            };

            if marker && !tag.starts_with(HAVOK_PREFIX) {
                let value = cursor.read_u32().map_err(|e| wrap(e.into()))?;
                if value != 0 {
                    debug!("block {index} ({tag}): non-zero block marker {value:#x}");
                }
            }

            let body = cursor.position();
            let declared = header.block_size(index as usize);

            match records::lookup(&tag, &ctx) {
                Lookup::Supported(kind, read) => {
                    let mut r = NifReader::new(cursor, ctx, &header.strings);
                    let data = read(&mut r).map_err(wrap)?;
                    let links = r.take_links();
                    let consumed = cursor.position() - body;
                    trace!(
                        "block {index} ({kind}) at {offset:#x}: {consumed} bytes, {} links",
                        links.len()
                    );

                    if let Some(declared) = declared.filter(|_| options.check_block_sizes) {
                        if consumed != declared as usize {
                            warn!(
                                "block {index} ({kind}): declared {declared} bytes, decoder consumed {consumed}"
                            );
                            table.warnings.push(Warning::BlockSizeMismatch {
                                index,
                                kind: tag.clone(),
                                declared,
                                consumed,
                            });
                            cursor
                                .seek(body + declared as usize)
                                .map_err(|e| wrap(e.into()))?;
                        }
                    }

                    table.slots.push(Slot {
                        tag,
                        offset,
                        record: Some(Record::new(kind, data)),
                        links,
                    });
                }
                lookup => {
                    if options.strict {
                        return Err(wrap(Error::UnsupportedRecordType(tag.clone())));
                    }
                    if matches!(lookup, Lookup::OtherFork) {
                        warn!("block {index}: no {tag} layout for {ctx:?}");
                    } else {
                        warn!("block {index}: unsupported record type {tag:?}");
                    }
                    table.warnings.push(Warning::UnsupportedRecordType {
                        index,
                        kind: tag.clone(),
                    });

                    let Some(size) = declared else {
                        let remaining = num_blocks - index - 1;
                        warn!("block table truncated at block {index}, {remaining} blocks not loaded");
                        table.warnings.push(Warning::TableTruncated { index, remaining });
                        table.slots.push(Slot {
                            tag,
                            offset,
                            record: None,
                            links: Vec::new(),
                        });
                        table.slots.resize(num_blocks as usize, Slot::default());
                        table.complete = false;
                        return Ok(table);
                    };

                    cursor.skip(size as usize).map_err(|e| wrap(e.into()))?;
                    table.slots.push(Slot {
                        tag,
                        offset,
                        record: None,
                        links: Vec::new(),
                    });
                }
            }
        }

        debug!("read {} blocks, {} warnings", table.slots.len(), table.warnings.len());
        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::object::tests::write_node;
    use crate::records::{NiIntegerExtraData, NiNode};
    use crate::testing::DocBuilder;

    fn read_table(bytes: &[u8], options: &LoadOptions) -> Result<(BlockTable, usize)> {
        let mut cursor = ByteCursor::new(bytes);
        let header = Header::read(&mut cursor, options.max_banner_len)?;
        let table = BlockTable::read(&mut cursor, &header, options)?;
        Ok((table, cursor.position()))
    }

    #[test]
    fn test_inline_tags_before_type_list() {
        let mut doc = DocBuilder::new(v::V4_0_0_2, 0, 0);
        let c = doc.context();
        doc.block("NiNode", |w| write_node(w, c, "Scene Root", &[1]));
        doc.block("NiNode", |w| write_node(w, c, "Child", &[]));
        let bytes = doc.build();

        let (table, _) = read_table(&bytes, &LoadOptions::default()).unwrap();
        assert!(table.complete);
        assert_eq!(table.slots.len(), 2);
        assert_eq!(table.slots[1].tag, "NiNode");
        assert_eq!(
            table.slots[0].links,
            vec![Reference::NONE, Reference::NONE, Reference::new(1)]
        );
        let child = table.slots[1].record.as_ref().and_then(|r| r.downcast::<NiNode>());
        assert_eq!(child.map(|n| n.av.net.name.as_str()), Some("Child"));
    }

    #[test]
    fn test_block_marker_skips_havok() {
        let mut doc = DocBuilder::new(v::V10_1_0_106, 0, 0);
        doc.block("NiIntegerExtraData", |w| {
            w.sized_string("x").u32(5);
        });
        doc.block("bhkSphereShape", |w| {
            w.u32(7).f32(0.5);
        });
        let bytes = doc.build();
        let (table, _) = read_table(&bytes, &LoadOptions::default()).unwrap();

        let extra = table.slots[0]
            .record
            .as_ref()
            .and_then(|r| r.downcast::<NiIntegerExtraData>());
        assert_eq!(extra.map(|x| x.value), Some(5));
        assert_eq!(table.slots[1].record.as_ref().map(Record::kind), Some("bhkSphereShape"));
    }

    #[test]
    fn test_size_mismatch_realigns() {
        let bytes = DocBuilder::new(v::V20_2_0_7, 12, 83)
            .block("BSXFlags", |w| {
                w.string("BSX").u32(2).u32(0xDEAD);
            })
            .block("BSXFlags", |w| {
                w.string("BSX").u32(3);
            })
            .build();
        let (table, _) = read_table(&bytes, &LoadOptions::default()).unwrap();

        assert_eq!(
            table.warnings,
            vec![Warning::BlockSizeMismatch {
                index: 0,
                kind: "BSXFlags".into(),
                declared: 12,
                consumed: 8,
            }]
        );
        let second = table.slots[1]
            .record
            .as_ref()
            .and_then(|r| r.downcast::<NiIntegerExtraData>());
        assert_eq!(second.map(|x| x.value), Some(3));
    }

    #[test]
    fn test_size_check_disabled() {
        let bytes = DocBuilder::new(v::V20_2_0_7, 12, 83)
            .block("BSXFlags", |w| {
                w.string("BSX").u32(2);
            })
            .declared_size(0, 4)
            .build();
        let options = LoadOptions::default().check_block_sizes(false);
        let (table, _) = read_table(&bytes, &options).unwrap();
        assert!(table.warnings.is_empty());

        let (table, _) = read_table(&bytes, &LoadOptions::default()).unwrap();
        assert_eq!(table.warnings.len(), 1);
    }

    #[test]
    fn test_unsupported_skipped_by_size() {
        let bytes = DocBuilder::new(v::V20_2_0_7, 12, 83)
            .raw_block("NiPSysData", &[0xAB; 9])
            .block("BSXFlags", |w| {
                w.string("BSX").u32(1);
            })
            .build();
        let (table, _) = read_table(&bytes, &LoadOptions::default()).unwrap();

        assert!(table.complete);
        assert!(table.slots[0].record.is_none());
        assert_eq!(table.slots[0].tag, "NiPSysData");
        assert!(table.slots[1].record.is_some());
        assert_eq!(
            table.warnings,
            vec![Warning::UnsupportedRecordType {
                index: 0,
                kind: "NiPSysData".into()
            }]
        );
    }

    #[test]
    fn test_unsized_unsupported_truncates() {
        let mut doc = DocBuilder::new(v::V20_0_0_5, 11, 11);
        let c = doc.context();
        doc.block("NiNode", |w| write_node(w, c, "Scene Root", &[1, 2]))
            .raw_block("NiPSysData", &[0; 16])
            .block("NiNode", |w| write_node(w, c, "Lost", &[]));
        let bytes = doc.build();
        let (table, _) = read_table(&bytes, &LoadOptions::default()).unwrap();

        assert!(!table.complete);
        assert_eq!(table.slots.len(), 3);
        assert!(table.slots[0].record.is_some());
        assert!(table.slots[2].record.is_none());
        assert_eq!(table.warnings[1], Warning::TableTruncated { index: 1, remaining: 1 });
    }

    #[test]
    fn test_strict_rejects_unsupported() {
        let bytes = DocBuilder::new(v::V20_2_0_7, 12, 83)
            .raw_block("NiPSysData", &[0; 4])
            .build();
        let err = read_table(&bytes, &LoadOptions::default().strict(true)).unwrap_err();

        assert!(matches!(err, Error::Block { index: 0, .. }));
        assert!(matches!(err.root_cause(), Error::UnsupportedRecordType(t) if t == "NiPSysData"));
    }

    #[test]
    fn test_decode_error_names_block() {
        let bytes = DocBuilder::new(v::V20_2_0_7, 12, 83)
            .block("BSXFlags", |w| {
                w.u32(99).u32(1);
            })
            .build();
        let err = read_table(&bytes, &LoadOptions::default()).unwrap_err();

        match &err {
            Error::Block { index, kind, .. } => {
                assert_eq!(*index, 0);
                assert_eq!(kind, "BSXFlags");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(matches!(
            err.root_cause(),
            Error::CorruptReference {
                kind: ReferenceKind::String,
                ..
            }
        ));
    }
}
