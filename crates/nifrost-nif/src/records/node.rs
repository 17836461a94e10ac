//! Specialised scene graph nodes.

use crate::compound::{Vector3, Vector4};
use crate::gate::{v, Gate};
use crate::reader::{NifRead, NifReader};
use crate::reference::Reference;
use crate::records::{base, NiNode};
use crate::Result;

const BILLBOARD_MODE: Gate = Gate::since(v::V10_1_0_0);
const CULLING_MODE: Gate = Gate::bs_above(82);
const SWITCH_FLAGS: Gate = Gate::since(v::V10_1_0_0);
const LOD_CENTER: Gate = Gate::between(v::V4_0_0_2, v::V10_0_1_0);
const LOD_LEVELS: Gate = Gate::until(v::V10_0_1_0);
const LOD_LEVEL_DATA: Gate = Gate::since(v::V10_1_0_0);
const SORT_ACCUMULATOR: Gate = Gate::until(v::V20_0_0_3);

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiBillboardNode {
    pub node: NiNode,
    pub billboard_mode: Option<u16>,
}

impl NifRead for NiBillboardNode {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            node: r.read()?,
            billboard_mode: r.read_if(BILLBOARD_MODE)?,
        })
    }
}

/// Tree node with two bone lists driving leaf animation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BsTreeNode {
    pub node: NiNode,
    pub bones_1: Vec<Reference>,
    pub bones: Vec<Reference>,
}

impl NifRead for BsTreeNode {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            node: r.read()?,
            bones_1: r.read_ref_list()?,
            bones: r.read_ref_list()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BsMultiBoundNode {
    pub node: NiNode,
    pub multi_bound: Reference,
    pub culling_mode: Option<u32>,
}

impl NifRead for BsMultiBoundNode {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            node: r.read()?,
            multi_bound: r.read_ref()?,
            culling_mode: r.read_if(CULLING_MODE)?,
        })
    }
}

/// Shows exactly one child at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiSwitchNode {
    pub node: NiNode,
    pub switch_flags: Option<u16>,
    pub index: u32,
}

impl NifRead for NiSwitchNode {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            node: r.read()?,
            switch_flags: r.read_if(SWITCH_FLAGS)?,
            index: r.read_u32()?,
        })
    }
}

/// Distance range for one level of detail.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LodRange {
    pub near_extent: f32,
    pub far_extent: f32,
}

impl NifRead for LodRange {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            near_extent: r.read_f32()?,
            far_extent: r.read_f32()?,
        })
    }
}

/// A switch node that picks its child by camera distance. Ranges are
/// inline up to 10.0.1.0 and in a separate LOD data record after.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiLodNode {
    pub switch: NiSwitchNode,
    pub lod_center: Option<Vector3>,
    pub lod_levels: Vec<LodRange>,
    pub lod_level_data: Option<Reference>,
}

impl NifRead for NiLodNode {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let switch = r.read()?;
        let lod_center = r.read_if(LOD_CENTER)?;
        let lod_levels = if r.gated(LOD_LEVELS) {
            r.read_list()?
        } else {
            Vec::new()
        };
        Ok(Self {
            switch,
            lod_center,
            lod_levels,
            lod_level_data: r.read_if(LOD_LEVEL_DATA)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BsOrderedNode {
    pub node: NiNode,
    pub alpha_sort_bound: Vector4,
    pub static_bound: bool,
}

impl NifRead for BsOrderedNode {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            node: r.read()?,
            alpha_sort_bound: r.read()?,
            static_bound: r.read_bool()?,
        })
    }
}

/// `BSRangeNode` and its blast, damage and debris subtypes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BsRangeNode {
    pub node: NiNode,
    pub min: u8,
    pub max: u8,
    pub current: u8,
}

impl NifRead for BsRangeNode {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            node: r.read()?,
            min: r.read_u8()?,
            max: r.read_u8()?,
            current: r.read_u8()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiSortAdjustNode {
    pub node: NiNode,
    pub sorting_mode: u32,
    pub accumulator: Option<Reference>,
}

impl NifRead for NiSortAdjustNode {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            node: r.read()?,
            sorting_mode: r.read_u32()?,
            accumulator: r.read_if(SORT_ACCUMULATOR)?,
        })
    }
}

base!(
    NiBillboardNode,
    BsTreeNode,
    BsMultiBoundNode,
    NiSwitchNode,
    BsOrderedNode,
    BsRangeNode,
    NiSortAdjustNode => node.node
);
base!(NiLodNode => node.switch.node);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::object::tests::write_node;
    use crate::testing::{ctx, decode, NifWriter};

    #[test]
    fn test_lod_node_inline_ranges() {
        let c = ctx(v::V4_0_0_2, 0, 0);
        let mut w = NifWriter::new(c);
        write_node(&mut w, c, "LOD", &[1, 2]);
        w.u32(0);
        w.f32s(&[1.0, 2.0, 3.0]);
        w.u32(2).f32s(&[0.0, 100.0, 100.0, 500.0]);
        let (lod, rest): (NiLodNode, _) = decode(&mut w).unwrap();

        assert_eq!(rest, 0);
        assert_eq!(lod.switch.switch_flags, None);
        assert_eq!(lod.lod_center, Some(Vector3::new(1.0, 2.0, 3.0)));
        assert_eq!(lod.lod_levels[1].far_extent, 500.0);
        assert_eq!(lod.lod_level_data, None);
    }

    #[test]
    fn test_lod_node_data_link() {
        let c = ctx(v::V20_0_0_5, 11, 11);
        let mut w = NifWriter::new(c);
        write_node(&mut w, c, "LOD", &[]);
        w.u16(0).u32(1).link(7);
        let (lod, rest): (NiLodNode, _) = decode(&mut w).unwrap();

        assert_eq!(rest, 0);
        assert_eq!(lod.switch.index, 1);
        assert!(lod.lod_levels.is_empty());
        assert_eq!(lod.lod_level_data, Some(Reference::new(7)));
    }

    #[test]
    fn test_multi_bound_culling_mode() {
        for (bs, expect) in [(34, None), (83, Some(2))] {
            let c = ctx(v::V20_2_0_7, 11, bs);
            let mut w = NifWriter::new(c);
            write_node(&mut w, c, "MultiBound", &[]);
            w.link(3);
            if expect.is_some() {
                w.u32(2);
            }
            let (node, rest): (BsMultiBoundNode, _) = decode(&mut w).unwrap();
            assert_eq!(rest, 0);
            assert_eq!(node.culling_mode, expect);
        }
    }

    #[test]
    fn test_range_node_bytes() {
        let c = ctx(v::V20_2_0_7, 12, 83);
        let mut w = NifWriter::new(c);
        write_node(&mut w, c, "Blast", &[]);
        w.u8(0).u8(3).u8(1);
        let (node, rest): (BsRangeNode, _) = decode(&mut w).unwrap();
        assert_eq!(rest, 0);
        assert_eq!((node.min, node.max, node.current), (0, 3, 1));
    }
}
