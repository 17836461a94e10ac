//! Keyframe data referenced by interpolators and legacy controllers.

use crate::compound::{Color4, Key, KeyGroup, KeyType, QuatKey, RotationKeys, Vector3};
use crate::gate::{v, Gate};
use crate::reader::{NifRead, NifReader};
use crate::records::base;
use crate::{Error, Result};

const EULER_ORDER: Gate = Gate::until(v::V10_1_0_0);
const MORPH_NAME: Gate = Gate::since(v::V10_1_0_106);
const MORPH_KEYS: Gate = Gate::until(v::V10_1_0_0);
const MORPH_LEGACY_WEIGHT: Gate = Gate::All(&[
    Gate::between(v::V10_1_0_104, v::V20_1_0_2),
    Gate::bs_at_most(9),
]);

/// Rotation, translation and scale tracks. Also read for `NiTransformData`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiKeyframeData {
    pub rotations: RotationKeys,
    pub translations: KeyGroup<Vector3>,
    pub scales: KeyGroup<f32>,
}

impl NifRead for NiKeyframeData {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let count = r.read_count()?;
        let rotations = if count == 0 {
            RotationKeys::None
        } else {
            match r.read::<KeyType>()? {
                KeyType::XyzRotation => RotationKeys::Xyz {
                    order: r.read_if(EULER_ORDER)?,
                    curves: [r.read()?, r.read()?, r.read()?],
                },
                interpolation => RotationKeys::Quaternion {
                    interpolation,
                    keys: r.read_vec_with(count, |r| QuatKey::read(r, interpolation))?,
                },
            }
        };
        Ok(Self {
            rotations,
            translations: r.read()?,
            scales: r.read()?,
        })
    }
}

macro_rules! single_group {
    ($($name:ident($ty:ty)),+ $(,)?) => {
        $(
            #[derive(Debug, Clone, PartialEq, Default)]
            pub struct $name {
                pub keys: KeyGroup<$ty>,
            }

            impl NifRead for $name {
                fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
                    Ok(Self { keys: r.read()? })
                }
            }
        )+
    };
}

single_group!(
    NiFloatData(f32),
    NiPosData(Vector3),
    NiColorData(Color4),
    NiBoolData(u8),
);

/// Visibility track. Keys are always linear and carry no type tag.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiVisData {
    pub keys: Vec<Key<u8>>,
}

impl NifRead for NiVisData {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let count = r.read_count()?;
        Ok(Self {
            keys: r.read_vec_with(count, |r| Key::read(r, KeyType::Linear))?,
        })
    }
}

/// Texture coordinate tracks: u offset, v offset, u tiling, v tiling.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiUvData {
    pub groups: [KeyGroup<f32>; 4],
}

impl NifRead for NiUvData {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            groups: [r.read()?, r.read()?, r.read()?, r.read()?],
        })
    }
}

/// One morph target.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Morph {
    pub frame_name: Option<String>,
    /// Weight track, stored inline up to 10.1.0.0.
    pub keys: Option<KeyGroup<f32>>,
    pub legacy_weight: Option<f32>,
    pub vectors: Vec<Vector3>,
}

impl Morph {
    fn read(r: &mut NifReader<'_, '_>, num_vertices: usize) -> Result<Self> {
        let frame_name = r.read_if(MORPH_NAME)?;
        let keys = if r.gated(MORPH_KEYS) {
            // Unlike a plain key group the interpolation is stored even
            // when there are no keys.
            let count = r.read_count()?;
            let at = r.position();
            let raw = r.read_u32()?;
            let interpolation = match (count, KeyType::from_raw(raw)) {
                (0, kind) => kind,
                (_, Some(kind)) => Some(kind),
                (_, None) => {
                    return Err(Error::Common(nifrost_common::Error::invalid(
                        at,
                        format!("unknown key type {raw}"),
                    )))
                }
            };
            let kind = interpolation.unwrap_or_default();
            Some(KeyGroup {
                interpolation,
                keys: r.read_vec_with(count, |r| Key::read(r, kind))?,
            })
        } else {
            None
        };
        Ok(Self {
            frame_name,
            keys,
            legacy_weight: r.read_if(MORPH_LEGACY_WEIGHT)?,
            vectors: r.read_vec(num_vertices)?,
        })
    }
}

/// Vertex morph targets. The first morph is the base shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiMorphData {
    pub num_vertices: u32,
    pub relative_targets: u8,
    pub morphs: Vec<Morph>,
}

impl NifRead for NiMorphData {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let num_morphs = r.read_count()?;
        let num_vertices = r.read_u32()?;
        let relative_targets = r.read_u8()?;
        let n = num_vertices as usize;
        Ok(Self {
            num_vertices,
            relative_targets,
            morphs: r.read_vec_with(num_morphs, |r| Morph::read(r, n))?,
        })
    }
}

base!(
    NiKeyframeData,
    NiFloatData,
    NiPosData,
    NiColorData,
    NiBoolData,
    NiVisData,
    NiUvData,
    NiMorphData => none
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ctx, decode, NifWriter};

    #[test]
    fn test_quaternion_rotation_keys() {
        let c = ctx(v::V20_0_0_5, 11, 11);
        let mut w = NifWriter::new(c);
        w.u32(2).u32(1);
        w.f32(0.0).f32s(&[1.0, 0.0, 0.0, 0.0]);
        w.f32(1.0).f32s(&[0.0, 1.0, 0.0, 0.0]);
        w.u32(1).u32(1).f32(0.0).f32s(&[5.0, 0.0, 0.0]);
        w.u32(0);
        let (d, rest): (NiKeyframeData, _) = decode(&mut w).unwrap();

        assert_eq!(rest, 0);
        match &d.rotations {
            RotationKeys::Quaternion { interpolation, keys } => {
                assert_eq!(*interpolation, KeyType::Linear);
                assert_eq!(keys[1].value.x, 1.0);
            }
            other => panic!("unexpected rotations {other:?}"),
        }
        assert_eq!(d.translations.keys[0].value, Vector3::new(5.0, 0.0, 0.0));
        assert!(d.scales.is_empty());
    }

    #[test]
    fn test_xyz_rotation_curves() {
        let c = ctx(v::V10_0_1_0, 0, 0);
        let mut w = NifWriter::new(c);
        w.u32(1).u32(4).f32(0.0);
        w.u32(1).u32(5).f32(0.0).f32(0.5);
        w.u32(0).u32(0);
        w.u32(0).u32(0);
        let (d, rest): (NiKeyframeData, _) = decode(&mut w).unwrap();

        assert_eq!(rest, 0);
        match &d.rotations {
            RotationKeys::Xyz { order, curves } => {
                assert_eq!(*order, Some(0.0));
                assert_eq!(curves[0].interpolation, Some(KeyType::Constant));
                assert!(curves[2].is_empty());
            }
            other => panic!("unexpected rotations {other:?}"),
        }
    }

    #[test]
    fn test_tbc_float_keys_and_vis_data() {
        let c = ctx(v::V20_2_0_7, 12, 83);
        let mut w = NifWriter::new(c);
        w.u32(1).u32(3).f32(0.0).f32(1.0).f32s(&[0.1, 0.2, 0.3]);
        let (d, rest): (NiFloatData, _) = decode(&mut w).unwrap();
        assert_eq!(rest, 0);
        assert_eq!(d.keys.keys[0].tbc.map(|t| t.continuity), Some(0.3));

        let mut w = NifWriter::new(c);
        w.u32(2).f32(0.0).u8(1).f32(1.0).u8(0);
        let (d, rest): (NiVisData, _) = decode(&mut w).unwrap();
        assert_eq!(rest, 0);
        assert_eq!(d.keys[1].value, 0);
    }

    #[test]
    fn test_morph_data_legacy_keys() {
        let c = ctx(v::V4_0_0_2, 0, 0);
        let mut w = NifWriter::new(c);
        w.u32(2).u32(1).u8(1);
        w.u32(0).u32(0).f32s(&[0.0, 0.0, 0.0]);
        w.u32(1).u32(2).f32(0.0).f32(1.0).f32(0.0).f32(0.0);
        w.f32s(&[0.0, 1.0, 0.0]);
        let (d, rest): (NiMorphData, _) = decode(&mut w).unwrap();

        assert_eq!(rest, 0);
        assert_eq!(d.morphs[0].keys.as_ref().map(|k| k.interpolation), Some(None));
        let second = d.morphs[1].keys.as_ref().map(|k| k.keys[0].forward);
        assert_eq!(second, Some(Some(0.0)));
        assert_eq!(d.morphs[1].vectors[0], Vector3::new(0.0, 1.0, 0.0));
    }

    #[test]
    fn test_morph_data_named_frames() {
        let c = ctx(v::V20_2_0_7, 11, 34);
        let mut w = NifWriter::new(c);
        w.u32(1).u32(2).u8(0);
        w.string("Base").f32s(&[0.0; 6]);
        let (d, rest): (NiMorphData, _) = decode(&mut w).unwrap();
        assert_eq!(rest, 0);
        assert_eq!(d.morphs[0].frame_name.as_deref(), Some("Base"));
        assert_eq!(d.morphs[0].keys, None);
        assert_eq!(d.morphs[0].legacy_weight, None);
    }
}
