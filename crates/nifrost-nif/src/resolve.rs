//! Link validation once the block count is final.
//!
//! Records keep their links as raw [`Reference`]s. Before a document is
//! handed out, every link, every root and every string palette offset is
//! checked against the table it points into, so later lookups only ever
//! see absent or in-range references.

use crate::error::ReferenceKind;
use crate::records::{ControlledNames, NiControllerSequence, NiSequence, NiStringPalette, Record};
use crate::reference::Reference;
use crate::table::Slot;
use crate::{Error, Result};

/// Check every link, root and palette offset of a loaded table.
pub(crate) fn validate(slots: &[Slot], roots: &[Reference]) -> Result<()> {
    let limit = slots.len();

    for (index, slot) in slots.iter().enumerate() {
        let wrap = |source: Error| Error::Block {
            index: index as u32,
            kind: slot.tag.clone(),
            offset: slot.offset,
            source: Box::new(source),
        };
        for &link in &slot.links {
            check_link(link, limit).map_err(wrap)?;
        }
        if let Some(record) = &slot.record {
            check_palette_offsets(record, slots).map_err(wrap)?;
        }
    }

    for &root in roots {
        check_link(root, limit)?;
    }
    Ok(())
}

fn check_link(link: Reference, limit: usize) -> Result<()> {
    match link.index() {
        Some(i) if i as usize >= limit => Err(Error::corrupt(ReferenceKind::Block, link.raw(), limit)),
        _ => Ok(()),
    }
}

/// The sequence part of a record, for either sequence flavour.
pub(crate) fn sequence_of(record: &Record) -> Option<&NiSequence> {
    record
        .downcast::<NiControllerSequence>()
        .map(|s| &s.sequence)
        .or_else(|| record.downcast::<NiSequence>())
}

/// The palette a controlled block's offsets point into.
///
/// Each block names its own palette. Files that leave it empty share the
/// one on the owning controller sequence.
pub(crate) fn palette_for<'a>(
    record: &Record,
    own: Reference,
    slots: &'a [Slot],
) -> Option<&'a NiStringPalette> {
    let shared = record
        .downcast::<NiControllerSequence>()
        .and_then(|s| s.string_palette);
    let link = if own.is_none() { shared? } else { own };
    slots
        .get(link.index()? as usize)?
        .record
        .as_ref()?
        .downcast::<NiStringPalette>()
}

fn check_palette_offsets(record: &Record, slots: &[Slot]) -> Result<()> {
    let Some(sequence) = sequence_of(record) else {
        return Ok(());
    };
    for block in &sequence.controlled_blocks {
        let ControlledNames::Palette { palette, offsets } = &block.names else {
            continue;
        };
        let Some(strings) = palette_for(record, *palette, slots) else {
            continue;
        };
        if let Some(&bad) = offsets.iter().find(|&&o| !strings.contains(o)) {
            return Err(Error::corrupt(ReferenceKind::Palette, bad, strings.palette.len()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::{ControlledBlock, RecordData};
    use crate::records::sequence::tests::palette_bytes;

    fn slot(tag: &'static str, record: Option<RecordData>, links: &[i32]) -> Slot {
        Slot {
            tag: tag.to_owned(),
            offset: 0,
            record: record.map(|data| Record::new(tag, data)),
            links: links.iter().copied().map(Reference::new).collect(),
        }
    }

    fn sequence(palette: i32, offsets: [u32; 5]) -> RecordData {
        NiControllerSequence {
            sequence: NiSequence {
                controlled_blocks: vec![ControlledBlock {
                    names: ControlledNames::Palette {
                        palette: Reference::new(palette),
                        offsets,
                    },
                    ..Default::default()
                }],
                ..Default::default()
            },
            ..Default::default()
        }
        .into()
    }

    fn string_palette() -> RecordData {
        NiStringPalette {
            palette: palette_bytes().to_vec(),
            length: palette_bytes().len() as u32,
        }
        .into()
    }

    #[test]
    fn test_links_in_range() {
        let slots = vec![slot("NiNode", None, &[1, -1]), slot("NiNode", None, &[0])];
        assert!(validate(&slots, &[Reference::new(0)]).is_ok());
    }

    #[test]
    fn test_link_out_of_range() {
        let slots = vec![slot("NiNode", None, &[0, 2])];
        let err = validate(&slots, &[]).unwrap_err();

        assert!(matches!(err, Error::Block { index: 0, .. }));
        assert!(matches!(
            err.root_cause(),
            Error::CorruptReference {
                kind: ReferenceKind::Block,
                value: 2,
                limit: 1
            }
        ));
    }

    #[test]
    fn test_root_out_of_range() {
        let slots = vec![slot("NiNode", None, &[])];
        let err = validate(&slots, &[Reference::new(0), Reference::new(5)]).unwrap_err();
        assert!(matches!(err, Error::CorruptReference { value: 5, .. }));
    }

    #[test]
    fn test_palette_offsets() {
        let good = [0, 6, u32::MAX, u32::MAX, u32::MAX];
        let slots = vec![
            slot("NiControllerSequence", Some(sequence(1, good)), &[1]),
            slot("NiStringPalette", Some(string_palette()), &[]),
        ];
        assert!(validate(&slots, &[]).is_ok());

        let bad = [0, 6, 300, u32::MAX, u32::MAX];
        let slots = vec![
            slot("NiControllerSequence", Some(sequence(1, bad)), &[1]),
            slot("NiStringPalette", Some(string_palette()), &[]),
        ];
        let err = validate(&slots, &[]).unwrap_err();
        assert!(matches!(
            err.root_cause(),
            Error::CorruptReference {
                kind: ReferenceKind::Palette,
                value: 300,
                ..
            }
        ));
    }

    #[test]
    fn test_palette_falls_back_to_sequence() {
        let mut data = sequence(-1, [6, 0, 0, 0, 0]);
        if let RecordData::ControllerSequence(s) = &mut data {
            s.string_palette = Some(Reference::new(1));
        }
        let slots = vec![
            slot("NiControllerSequence", Some(data), &[1]),
            slot("NiStringPalette", Some(string_palette()), &[]),
        ];
        let record = slots[0].record.as_ref().unwrap();
        let palette = palette_for(record, Reference::NONE, &slots).unwrap();
        assert_eq!(palette.lookup(6).as_deref(), Some("NiTransformController"));
    }
}
