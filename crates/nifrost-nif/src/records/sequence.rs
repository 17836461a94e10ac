//! Animation sequences and the palettes they name objects through.

use nifrost_common::decode_latin1;

use crate::gate::{v, Gate};
use crate::reader::{NifRead, NifReader};
use crate::reference::Reference;
use crate::records::base;
use crate::Result;

const TARGET_NAME: Gate = Gate::until(v::V10_1_0_103);
const INTERPOLATOR: Gate = Gate::since(v::V10_1_0_104);
const BLEND: Gate = Gate::between(v::V10_1_0_104, v::V10_1_0_110);
const PRIORITY: Gate = Gate::All(&[Gate::since(v::V10_1_0_106), Gate::bs_above(0)]);
const DIRECT_NAMES: Gate = Gate::Any(&[
    Gate::between(v::V10_1_0_104, v::V10_1_0_113),
    Gate::since(v::V20_1_0_1),
]);
const PALETTE_NAMES: Gate = Gate::between(v::V10_2_0_0, v::V20_1_0_0);

const SEQUENCE_LEGACY: Gate = Gate::until(v::V10_1_0_103);
const SINCE_106: Gate = Gate::since(v::V10_1_0_106);
const PHASE: Gate = Gate::between(v::V10_1_0_106, v::V10_4_0_1);
const PLAY_BACKWARDS: Gate = Gate::exactly(v::V10_1_0_106);
const SEQUENCE_PALETTE: Gate = Gate::between(v::V10_1_0_113, v::V20_1_0_0);
const ANIM_NOTE: Gate = Gate::All(&[Gate::since(v::V20_2_0_7), Gate::bs_range(24, 28)]);
const ANIM_NOTE_ARRAYS: Gate = Gate::All(&[Gate::since(v::V20_2_0_7), Gate::bs_above(28)]);

/// Offset meaning "no string" in a string palette.
pub const NO_OFFSET: u32 = u32::MAX;

/// Identifies the object, property and controller a block animates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BlockNames {
    pub node: String,
    pub property_type: String,
    pub controller_type: String,
    pub controller_id: String,
    pub interpolator_id: String,
}

/// How a controlled block stores its names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ControlledNames {
    #[default]
    None,
    Direct(BlockNames),
    /// Offsets into a shared `NiStringPalette`, in [`BlockNames`] field order.
    Palette {
        palette: Reference,
        offsets: [u32; 5],
    },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ControlledBlock {
    pub target_name: Option<String>,
    pub interpolator: Option<Reference>,
    pub controller: Reference,
    pub blend_interpolator: Option<Reference>,
    pub blend_index: Option<u16>,
    pub priority: Option<u8>,
    pub names: ControlledNames,
}

impl ControlledBlock {
    /// Resolve the names of this block, looking palette offsets up in
    /// `palette` when the names are stored there.
    pub fn names(&self, palette: Option<&NiStringPalette>) -> Option<BlockNames> {
        match &self.names {
            ControlledNames::None => None,
            ControlledNames::Direct(names) => Some(names.clone()),
            ControlledNames::Palette { offsets, .. } => {
                let palette = palette?;
                let get = |i: usize| palette.lookup(offsets[i]).unwrap_or_default();
                Some(BlockNames {
                    node: get(0),
                    property_type: get(1),
                    controller_type: get(2),
                    controller_id: get(3),
                    interpolator_id: get(4),
                })
            }
        }
    }
}

impl NifRead for ControlledBlock {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let target_name = r.read_if(TARGET_NAME)?;
        let (interpolator, controller) = if r.gated(INTERPOLATOR) {
            (Some(r.read_ref()?), r.read_ref()?)
        } else {
            (None, r.read_ref()?)
        };
        let blend_interpolator = r.read_if(BLEND)?;
        let blend_index = r.read_if(BLEND)?;
        let priority = r.read_if(PRIORITY)?;
        let names = if r.gated(PALETTE_NAMES) {
            ControlledNames::Palette {
                palette: r.read_ref()?,
                offsets: r.read_array()?,
            }
        } else if r.gated(DIRECT_NAMES) {
            ControlledNames::Direct(BlockNames {
                node: r.read_string()?,
                property_type: r.read_string()?,
                controller_type: r.read_string()?,
                controller_id: r.read_string()?,
                interpolator_id: r.read_string()?,
            })
        } else {
            ControlledNames::None
        };
        Ok(Self {
            target_name,
            interpolator,
            controller,
            blend_interpolator,
            blend_index,
            priority,
            names,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiSequence {
    pub name: String,
    pub accum_root_name: Option<String>,
    pub text_keys: Option<Reference>,
    pub array_grow_by: Option<u32>,
    pub controlled_blocks: Vec<ControlledBlock>,
}

impl NifRead for NiSequence {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let name = r.read_string()?;
        let accum_root_name = r.read_if(SEQUENCE_LEGACY)?;
        let text_keys = r.read_if(SEQUENCE_LEGACY)?;
        let count = r.read_count()?;
        let array_grow_by = r.read_if(SINCE_106)?;
        Ok(Self {
            name,
            accum_root_name,
            text_keys,
            array_grow_by,
            controlled_blocks: r.read_vec(count)?,
        })
    }
}

/// Fields added by `NiControllerSequence` from 10.1.0.106 on.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SequenceTiming {
    pub weight: f32,
    pub text_keys: Reference,
    pub cycle_type: u32,
    pub frequency: f32,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiControllerSequence {
    pub sequence: NiSequence,
    pub timing: Option<SequenceTiming>,
    pub phase: Option<f32>,
    pub start_time: Option<f32>,
    pub stop_time: Option<f32>,
    pub play_backwards: Option<bool>,
    pub manager: Option<Reference>,
    pub accum_root_name: Option<String>,
    pub string_palette: Option<Reference>,
    pub anim_notes: Vec<Reference>,
}

impl NiControllerSequence {
    pub fn cycle_type(&self) -> Option<u32> {
        self.timing.as_ref().map(|t| t.cycle_type)
    }
}

impl NifRead for NiControllerSequence {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let sequence = r.read()?;
        let timing = r.read_if_with(SINCE_106, |r| {
            Ok(SequenceTiming {
                weight: r.read_f32()?,
                text_keys: r.read_ref()?,
                cycle_type: r.read_u32()?,
                frequency: r.read_f32()?,
            })
        })?;
        let phase = r.read_if(PHASE)?;
        let start_time = r.read_if(SINCE_106)?;
        let stop_time = r.read_if(SINCE_106)?;
        let play_backwards = r.read_if(PLAY_BACKWARDS)?;
        let manager = r.read_if(SINCE_106)?;
        let accum_root_name = r.read_if(SINCE_106)?;
        let string_palette = r.read_if(SEQUENCE_PALETTE)?;
        let anim_notes = if r.gated(ANIM_NOTE) {
            vec![r.read_ref()?]
        } else if r.gated(ANIM_NOTE_ARRAYS) {
            let count = r.read_count16()?;
            r.read_refs(count)?
        } else {
            Vec::new()
        };
        Ok(Self {
            sequence,
            timing,
            phase,
            start_time,
            stop_time,
            play_backwards,
            manager,
            accum_root_name,
            string_palette,
            anim_notes,
        })
    }
}

/// NUL-separated string storage addressed by byte offset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiStringPalette {
    pub palette: Vec<u8>,
    /// Declared length, normally equal to `palette.len()`.
    pub length: u32,
}

impl NiStringPalette {
    /// Whether `offset` is either absent or inside the palette.
    pub fn contains(&self, offset: u32) -> bool {
        offset == NO_OFFSET || (offset as usize) < self.palette.len()
    }

    /// The string starting at `offset`, up to the next NUL.
    pub fn lookup(&self, offset: u32) -> Option<String> {
        if offset == NO_OFFSET {
            return None;
        }
        let tail = self.palette.get(offset as usize..)?;
        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        Some(decode_latin1(&tail[..end]))
    }
}

impl NifRead for NiStringPalette {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            palette: r.cursor().read_l32_bytes()?.to_vec(),
            length: r.read_u32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AvObjectEntry {
    pub name: String,
    pub object: Reference,
}

impl NifRead for AvObjectEntry {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            name: r.read_sized_string()?,
            object: r.read_ref()?,
        })
    }
}

/// Name to object lookup used when binding sequences.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiDefaultAvObjectPalette {
    pub scene: Reference,
    pub objects: Vec<AvObjectEntry>,
}

impl NiDefaultAvObjectPalette {
    pub fn find(&self, name: &str) -> Option<Reference> {
        self.objects.iter().find(|e| e.name == name).map(|e| e.object)
    }
}

impl NifRead for NiDefaultAvObjectPalette {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            scene: r.read_ref()?,
            objects: r.read_list()?,
        })
    }
}

base!(NiSequence, NiControllerSequence, NiStringPalette, NiDefaultAvObjectPalette => none);

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::testing::{ctx, decode, decode_bytes, hex, NifWriter};

    pub(crate) fn palette_bytes() -> &'static [u8] {
        b"Bip01\0NiTransformController\0\0"
    }

    #[test]
    fn test_palette_lookup() {
        let p = NiStringPalette {
            palette: palette_bytes().to_vec(),
            length: 30,
        };
        assert_eq!(p.lookup(0).as_deref(), Some("Bip01"));
        assert_eq!(p.lookup(6).as_deref(), Some("NiTransformController"));
        assert_eq!(p.lookup(NO_OFFSET), None);
        assert_eq!(p.lookup(99), None);
        assert!(p.contains(NO_OFFSET));
        assert!(!p.contains(30));
    }

    #[test]
    fn test_oblivion_sequence_with_palette_names() {
        let c = ctx(v::V20_0_0_5, 11, 11);
        let mut w = NifWriter::new(c);
        w.string("Idle").u32(1).u32(1);
        w.link(4).link(5).u8(26);
        w.link(9).u32(0).u32(NO_OFFSET).u32(6).u32(NO_OFFSET).u32(NO_OFFSET);
        w.f32(1.0).link(3).u32(0).f32(1.0);
        w.f32(0.0).f32(2.5).link(0).string("Bip01").link(9);
        let (s, rest): (NiControllerSequence, _) = decode(&mut w).unwrap();

        assert_eq!(rest, 0);
        assert_eq!(s.sequence.name, "Idle");
        assert_eq!(s.sequence.array_grow_by, Some(1));
        assert_eq!(s.cycle_type(), Some(0));
        assert_eq!(s.phase, None);
        assert_eq!(s.stop_time, Some(2.5));
        assert_eq!(s.manager, Some(Reference::new(0)));
        assert_eq!(s.accum_root_name.as_deref(), Some("Bip01"));
        assert_eq!(s.string_palette, Some(Reference::new(9)));
        let block = &s.sequence.controlled_blocks[0];
        assert_eq!(block.priority, Some(26));
        assert_eq!(block.blend_index, None);

        let palette = NiStringPalette {
            palette: palette_bytes().to_vec(),
            length: 30,
        };
        let names = block.names(Some(&palette)).unwrap();
        assert_eq!(names.node, "Bip01");
        assert_eq!(names.controller_type, "NiTransformController");
        assert_eq!(names.property_type, "");
        assert_eq!(block.names(None), None);
    }

    #[test]
    fn test_skyrim_sequence_direct_names() {
        let c = ctx(v::V20_2_0_7, 12, 83);
        let mut w = NifWriter::new(c);
        w.string("Open").u32(1).u32(1);
        w.link(2).link(-1).u8(0);
        w.string("Door").string("").string("NiTransformController").string("").string("");
        w.f32(1.0).link(-1).u32(2).f32(1.0);
        w.f32(0.0).f32(1.0).link(0).string("Door");
        w.u16(0);
        let (s, rest): (NiControllerSequence, _) = decode(&mut w).unwrap();

        assert_eq!(rest, 0);
        assert_eq!(s.string_palette, None);
        assert!(s.anim_notes.is_empty());
        let names = s.sequence.controlled_blocks[0].names(None).unwrap();
        assert_eq!(names.node, "Door");
        assert_eq!(names.controller_type, "NiTransformController");
    }

    #[test]
    fn test_legacy_sequence() {
        let c = ctx(v::V4_0_0_2, 0, 0);
        let mut w = NifWriter::new(c);
        w.string("Walk").string("Bip01").link(1).u32(1);
        w.string("Bip01 Spine").link(3);
        let (s, rest): (NiSequence, _) = decode(&mut w).unwrap();

        assert_eq!(rest, 0);
        assert_eq!(s.accum_root_name.as_deref(), Some("Bip01"));
        let block = &s.controlled_blocks[0];
        assert_eq!(block.target_name.as_deref(), Some("Bip01 Spine"));
        assert_eq!(block.interpolator, None);
        assert_eq!(block.names, ControlledNames::None);
    }

    #[test]
    fn test_default_av_object_palette() {
        let c = ctx(v::V20_2_0_7, 12, 83);
        let mut w = NifWriter::new(c);
        w.link(0).u32(2).sized_string("Scene Root").link(0).sized_string("Door").link(3);
        let (p, rest): (NiDefaultAvObjectPalette, _) = decode(&mut w).unwrap();
        assert_eq!(rest, 0);
        assert_eq!(p.find("Door"), Some(Reference::new(3)));
        assert_eq!(p.find("Lid"), None);
    }

    /// A Skyrim `NiControllerSequence` body. Strings index the table
    /// `["Open", "Door", "NiTransformController"]`.
    const SKYRIM_SEQUENCE: &str = "
        00 00 00 00              # name: string 0
        01 00 00 00              # controlled block count
        01 00 00 00              # array grow by
        02 00 00 00              # block: interpolator
        FF FF FF FF              # block: controller
        05                       # block: priority
        01 00 00 00              # block: node name
        FF FF FF FF              # block: property type
        02 00 00 00              # block: controller type
        FF FF FF FF              # block: controller id
        FF FF FF FF              # block: interpolator id
        00 00 80 3F              # weight
        FF FF FF FF              # text keys
        02 00 00 00              # cycle type: clamp
        00 00 80 3F              # frequency
        00 00 00 00              # start time
        00 00 00 40              # stop time
        00 00 00 00              # manager
        01 00 00 00              # accum root name
        00 00                    # anim note array count
    ";

    /// A 10.1.0.104 `NiControllerSequence` body. The sequence fields that
    /// arrived in 10.1.0.106 are absent.
    const EARLY_SEQUENCE: &str = "
        04 00 00 00 49 64 6C 65                    # name: Idle
        01 00 00 00                                # controlled block count
        03 00 00 00                                # block: interpolator
        FF FF FF FF                                # block: controller
        FF FF FF FF                                # block: blend interpolator
        07 00                                      # block: blend index
        05 00 00 00 42 69 70 30 31                 # block: node name
        00 00 00 00                                # block: property type
        15 00 00 00 4E 69 54 72 61 6E 73 66 6F 72
        6D 43 6F 6E 74 72 6F 6C 6C 65 72           # block: controller type
        00 00 00 00                                # block: controller id
        00 00 00 00                                # block: interpolator id
    ";

    #[test]
    fn test_skyrim_sequence_byte_layout() {
        let strings: Vec<String> = ["Open", "Door", "NiTransformController"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let bytes = hex(SKYRIM_SEQUENCE);
        let (s, rest): (NiControllerSequence, _) =
            decode_bytes(&bytes, ctx(v::V20_2_0_7, 12, 83), &strings).unwrap();

        assert_eq!(rest, 0);
        assert_eq!(s.sequence.name, "Open");
        assert_eq!(s.sequence.array_grow_by, Some(1));
        let block = &s.sequence.controlled_blocks[0];
        assert_eq!(block.interpolator, Some(Reference::new(2)));
        assert_eq!(block.priority, Some(5));
        assert_eq!(block.blend_index, None);
        let names = block.names(None).unwrap();
        assert_eq!(names.node, "Door");
        assert_eq!(names.controller_type, "NiTransformController");
        assert_eq!(names.property_type, "");
        assert_eq!(s.cycle_type(), Some(2));
        assert_eq!(s.start_time, Some(0.0));
        assert_eq!(s.stop_time, Some(2.0));
        assert_eq!(s.play_backwards, None);
        assert_eq!(s.manager, Some(Reference::new(0)));
        assert_eq!(s.accum_root_name.as_deref(), Some("Door"));
        assert_eq!(s.string_palette, None);
        assert!(s.anim_notes.is_empty());
    }

    #[test]
    fn test_early_sequence_byte_layout() {
        let bytes = hex(EARLY_SEQUENCE);
        let (s, rest): (NiControllerSequence, _) =
            decode_bytes(&bytes, ctx(v::V10_1_0_104, 0, 0), &[]).unwrap();

        assert_eq!(rest, 0);
        assert_eq!(s.sequence.name, "Idle");
        assert_eq!(s.sequence.array_grow_by, None);
        assert_eq!(s.timing, None);
        assert_eq!(s.start_time, None);
        assert_eq!(s.stop_time, None);
        assert_eq!(s.manager, None);
        assert_eq!(s.accum_root_name, None);
        let block = &s.sequence.controlled_blocks[0];
        assert_eq!(block.target_name, None);
        assert_eq!(block.interpolator, Some(Reference::new(3)));
        assert_eq!(block.blend_interpolator, Some(Reference::NONE));
        assert_eq!(block.blend_index, Some(7));
        assert_eq!(block.priority, None);
        let names = block.names(None).unwrap();
        assert_eq!(names.node, "Bip01");
        assert_eq!(names.controller_type, "NiTransformController");
    }
}
