//! The base field groups shared by most scene records.
//!
//! `NiObjectNET` (name, extra data, controller) is the root of every named
//! record. `NiAVObject` adds a transform and is the root of everything that
//! lives in the scene graph. `NiNode` adds children.

use crate::compound::{BoundingVolume, Matrix33, Vector3};
use crate::gate::{v, Gate};
use crate::reader::{NifRead, NifReader};
use crate::reference::Reference;
use crate::Result;

pub(crate) const EXTRA_DATA_LINK: Gate = Gate::until(v::V4_2_2_0);
pub(crate) const EXTRA_DATA_LIST: Gate = Gate::since(v::V10_0_1_0);
pub(crate) const WIDE_FLAGS: Gate = Gate::bs_above(26);
pub(crate) const VELOCITY: Gate = Gate::until(v::V4_2_2_0);
pub(crate) const PROPERTY_LIST: Gate = Gate::bs_at_most(34);
pub(crate) const BOUNDING_VOLUME: Gate = Gate::until(v::V4_2_2_0);
pub(crate) const COLLISION_OBJECT: Gate = Gate::since(v::V10_0_1_0);
pub(crate) const EFFECT_LIST: Gate = Gate::bs_at_most(129);

/// Name, extra data and controller.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiObjectNet {
    pub name: String,
    /// Head of the extra data chain (up to 4.2.2.0).
    pub extra_data: Option<Reference>,
    /// Extra data list (10.0.1.0+).
    pub extra_data_list: Vec<Reference>,
    pub controller: Reference,
}

impl NifRead for NiObjectNet {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let name = r.read_string()?;
        let extra_data = r.read_if(EXTRA_DATA_LINK)?;
        let extra_data_list = if r.gated(EXTRA_DATA_LIST) {
            r.read_ref_list()?
        } else {
            Vec::new()
        };
        Ok(Self {
            name,
            extra_data,
            extra_data_list,
            controller: r.read_ref()?,
        })
    }
}

/// A positioned scene object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiAvObject {
    pub net: NiObjectNet,
    pub flags: u32,
    pub translation: Vector3,
    pub rotation: Matrix33,
    pub scale: f32,
    pub velocity: Option<Vector3>,
    pub properties: Vec<Reference>,
    pub bounding_volume: Option<BoundingVolume>,
    pub collision_object: Option<Reference>,
}

impl NifRead for NiAvObject {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let net = r.read()?;
        let flags = if r.gated(WIDE_FLAGS) {
            r.read_u32()?
        } else {
            u32::from(r.read_u16()?)
        };
        let translation = r.read()?;
        let rotation = r.read()?;
        let scale = r.read_f32()?;
        let velocity = r.read_if(VELOCITY)?;
        let properties = if r.gated(PROPERTY_LIST) {
            r.read_ref_list()?
        } else {
            Vec::new()
        };
        let bounding_volume = if r.gated(BOUNDING_VOLUME) && r.read_bool()? {
            Some(r.read()?)
        } else {
            None
        };
        Ok(Self {
            net,
            flags,
            translation,
            rotation,
            scale,
            velocity,
            properties,
            bounding_volume,
            collision_object: r.read_if(COLLISION_OBJECT)?,
        })
    }
}

/// A scene graph interior node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiNode {
    pub av: NiAvObject,
    pub children: Vec<Reference>,
    pub effects: Vec<Reference>,
}

impl NifRead for NiNode {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let av = r.read()?;
        let children = r.read_ref_list()?;
        let effects = if r.gated(EFFECT_LIST) {
            r.read_ref_list()?
        } else {
            Vec::new()
        };
        Ok(Self {
            av,
            children,
            effects,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::testing::{ctx, decode, decode_bytes, hex, NifWriter};
    use crate::version::VersionContext;

    /// Write an `NiAVObject` with identity transform and no links.
    pub(crate) fn write_av(w: &mut NifWriter, c: VersionContext, name: &str) {
        w.string(name);
        if EXTRA_DATA_LINK.matches(&c) {
            w.link(-1);
        }
        if EXTRA_DATA_LIST.matches(&c) {
            w.links(&[]);
        }
        w.link(-1);
        if WIDE_FLAGS.matches(&c) {
            w.u32(14);
        } else {
            w.u16(14);
        }
        w.f32s(&[0.0, 0.0, 0.0]);
        w.f32s(&[1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]);
        w.f32(1.0);
        if VELOCITY.matches(&c) {
            w.f32s(&[0.0, 0.0, 0.0]);
        }
        if PROPERTY_LIST.matches(&c) {
            w.links(&[]);
        }
        if BOUNDING_VOLUME.matches(&c) {
            w.bool(false);
        }
        if COLLISION_OBJECT.matches(&c) {
            w.link(-1);
        }
    }

    /// Write an `NiNode` with the given children.
    pub(crate) fn write_node(w: &mut NifWriter, c: VersionContext, name: &str, children: &[i32]) {
        write_av(w, c, name);
        w.links(children);
        if EFFECT_LIST.matches(&c) {
            w.links(&[]);
        }
    }

    #[test]
    fn test_node_layouts_across_versions() {
        for c in [
            ctx(v::V4_0_0_2, 0, 0),
            ctx(v::V10_0_1_0, 0, 0),
            ctx(v::V20_0_0_5, 11, 11),
            ctx(v::V20_2_0_7, 11, 34),
            ctx(v::V20_2_0_7, 12, 83),
            ctx(v::V20_2_0_7, 12, 130),
        ] {
            let mut w = NifWriter::new(c);
            write_node(&mut w, c, "Scene Root", &[1, 2]);
            let (node, rest): (NiNode, _) = decode(&mut w).unwrap();

            assert_eq!(rest, 0, "{c:?}");
            assert_eq!(node.av.net.name, "Scene Root");
            assert_eq!(node.av.flags, 14);
            assert_eq!(node.av.scale, 1.0);
            assert_eq!(node.children, vec![Reference::new(1), Reference::new(2)]);
            assert_eq!(node.av.velocity.is_some(), c.version() <= v::V4_2_2_0);
            assert_eq!(node.av.collision_object.is_some(), c.version() >= v::V10_0_1_0);
        }
    }

    #[test]
    fn test_legacy_bounding_volume() {
        let c = ctx(v::V4_0_0_2, 0, 0);
        let mut w = NifWriter::new(c);
        w.string("box").link(-1).link(-1).u16(0);
        w.f32s(&[0.0; 3]).f32s(&[0.0; 9]).f32(1.0).f32s(&[0.0; 3]);
        w.links(&[]);
        w.bool(true).u32(0).f32s(&[1.0, 2.0, 3.0, 4.0]);
        let (av, rest): (NiAvObject, _) = decode(&mut w).unwrap();

        assert_eq!(rest, 0);
        assert_eq!(av.net.extra_data, Some(Reference::NONE));
        assert!(matches!(av.bounding_volume, Some(BoundingVolume::Sphere(b)) if b.radius == 4.0));
    }

    /// An Oblivion `NiNode` body, field by field.
    const OBLIVION_NODE: &str = "
        0A 00 00 00 53 63 65 6E 65 20 52 6F 6F 74  # name: sized string
        01 00 00 00 05 00 00 00                    # extra data list: [5]
        FF FF FF FF                                # controller
        0E 00                                      # flags: u16
        00 00 80 3F 00 00 00 40 00 00 40 C0        # translation
        00 00 00 00 00 00 80 3F 00 00 00 00        # rotation column 1
        00 00 80 BF 00 00 00 00 00 00 00 00        # rotation column 2
        00 00 00 00 00 00 00 00 00 00 80 3F        # rotation column 3
        00 00 C0 3F                                # scale
        01 00 00 00 02 00 00 00                    # properties: [2]
        06 00 00 00                                # collision object
        02 00 00 00 03 00 00 00 04 00 00 00        # children: [3, 4]
        00 00 00 00                                # effects: []
    ";

    #[test]
    fn test_oblivion_node_byte_layout() {
        let bytes = hex(OBLIVION_NODE);
        let (node, rest): (NiNode, _) =
            decode_bytes(&bytes, ctx(v::V20_0_0_5, 11, 11), &[]).unwrap();

        assert_eq!(rest, 0);
        let av = &node.av;
        assert_eq!(av.net.name, "Scene Root");
        assert_eq!(av.net.extra_data, None);
        assert_eq!(av.net.extra_data_list, vec![Reference::new(5)]);
        assert!(av.net.controller.is_none());
        assert_eq!(av.flags, 14);
        assert_eq!(av.translation, Vector3 { x: 1.0, y: 2.0, z: -3.0 });
        assert_eq!(av.rotation.rows[0], [0.0, -1.0, 0.0]);
        assert_eq!(av.rotation.rows[1], [1.0, 0.0, 0.0]);
        assert_eq!(av.rotation.rows[2], [0.0, 0.0, 1.0]);
        assert_eq!(av.scale, 1.5);
        assert_eq!(av.velocity, None);
        assert_eq!(av.properties, vec![Reference::new(2)]);
        assert_eq!(av.bounding_volume, None);
        assert_eq!(av.collision_object, Some(Reference::new(6)));
        assert_eq!(node.children, vec![Reference::new(3), Reference::new(4)]);
        assert!(node.effects.is_empty());
    }
}
