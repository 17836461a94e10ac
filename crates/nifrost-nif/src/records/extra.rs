//! Extra data records hung off scene objects.

use crate::compound::{Color4, TextKey, Vector3, Vector4};
use crate::gate::{v, Gate};
use crate::reader::{NifRead, NifReader};
use crate::reference::Reference;
use crate::records::{base, RecordData};
use crate::Result;

const NAME: Gate = Gate::since(v::V10_0_1_0);
const NEXT: Gate = Gate::until(v::V4_2_2_0);
const BYTES_REMAINING: Gate = Gate::until(v::V4_2_2_0);
const TEXT_KEYS_UNKNOWN: Gate = Gate::until(v::V4_2_2_0);
const FURNITURE_LEGACY: Gate = Gate::bs_at_most(34);

/// Fields common to every extra data record.
///
/// Old files chain extra data through `next`; newer ones list it on the
/// owner and name each entry instead.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiExtraData {
    pub name: Option<String>,
    pub next: Option<Reference>,
}

impl NifRead for NiExtraData {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            name: r.read_if(NAME)?,
            next: r.read_if(NEXT)?,
        })
    }
}

macro_rules! value_extra {
    ($($(#[$doc:meta])* $name:ident { $field:ident: $ty:ty })+) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, PartialEq, Default)]
            pub struct $name {
                pub extra: NiExtraData,
                pub $field: $ty,
            }

            impl NifRead for $name {
                fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
                    Ok(Self {
                        extra: r.read()?,
                        $field: r.read()?,
                    })
                }
            }
        )+
    };
}

value_extra! {
    /// Also used for `BSXFlags`.
    NiIntegerExtraData { value: u32 }
    NiFloatExtraData { value: f32 }
    NiBooleanExtraData { value: u8 }
    NiVectorExtraData { value: Vector4 }
    NiColorExtraData { value: Color4 }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiStringExtraData {
    pub extra: NiExtraData,
    pub bytes_remaining: Option<u32>,
    pub value: String,
}

impl NifRead for NiStringExtraData {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            extra: r.read()?,
            bytes_remaining: r.read_if(BYTES_REMAINING)?,
            value: r.read_string()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiBinaryExtraData {
    pub extra: NiExtraData,
    pub data: Vec<u8>,
}

impl NifRead for NiBinaryExtraData {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let extra = r.read()?;
        let len = r.read_count()?;
        Ok(Self {
            extra,
            data: r.read_bytes(len)?,
        })
    }
}

/// Named time markers of an animation (`start`, `end`, sound cues).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiTextKeyExtraData {
    pub extra: NiExtraData,
    pub unknown: Option<u32>,
    pub keys: Vec<TextKey>,
}

impl NifRead for NiTextKeyExtraData {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            extra: r.read()?,
            unknown: r.read_if(TEXT_KEYS_UNKNOWN)?,
            keys: r.read_list()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiStringsExtraData {
    pub extra: NiExtraData,
    pub values: Vec<String>,
}

impl NifRead for NiStringsExtraData {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let extra = r.read()?;
        let count = r.read_count()?;
        Ok(Self {
            extra,
            values: r.read_vec_with(count, |r| r.read_sized_string())?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiIntegersExtraData {
    pub extra: NiExtraData,
    pub values: Vec<u32>,
}

impl NifRead for NiIntegersExtraData {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            extra: r.read()?,
            values: r.read_list()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiFloatsExtraData {
    pub extra: NiExtraData,
    pub values: Vec<f32>,
}

impl NifRead for NiFloatsExtraData {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            extra: r.read()?,
            values: r.read_list()?,
        })
    }
}

/// Axis-aligned box around a whole model.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BsBound {
    pub extra: NiExtraData,
    pub center: Vector3,
    pub dimensions: Vector3,
}

impl NifRead for BsBound {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            extra: r.read()?,
            center: r.read()?,
            dimensions: r.read()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FurnitureEntry {
    Legacy {
        orientation: u16,
        position_ref_1: u8,
        position_ref_2: u8,
    },
    Skyrim {
        heading: f32,
        animation_type: u16,
        entry_properties: u16,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FurniturePosition {
    pub offset: Vector3,
    pub entry: FurnitureEntry,
}

impl NifRead for FurniturePosition {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let offset = r.read()?;
        let entry = if r.gated(FURNITURE_LEGACY) {
            FurnitureEntry::Legacy {
                orientation: r.read_u16()?,
                position_ref_1: r.read_u8()?,
                position_ref_2: r.read_u8()?,
            }
        } else {
            FurnitureEntry::Skyrim {
                heading: r.read_f32()?,
                animation_type: r.read_u16()?,
                entry_properties: r.read_u16()?,
            }
        };
        Ok(Self { offset, entry })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BsFurnitureMarker {
    pub extra: NiExtraData,
    pub positions: Vec<FurniturePosition>,
}

impl NifRead for BsFurnitureMarker {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            extra: r.read()?,
            positions: r.read_list()?,
        })
    }
}

/// Inventory display orientation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BsInvMarker {
    pub extra: NiExtraData,
    pub rotation: [u16; 3],
    pub zoom: f32,
}

impl NifRead for BsInvMarker {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            extra: r.read()?,
            rotation: r.read_array()?,
            zoom: r.read_f32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BsBehaviorGraphExtraData {
    pub extra: NiExtraData,
    pub graph_file: String,
    pub controls_base_skeleton: bool,
}

impl NifRead for BsBehaviorGraphExtraData {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            extra: r.read()?,
            graph_file: r.read_string()?,
            controls_base_skeleton: r.read_u8()? != 0,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecalVectorBlock {
    pub points: Vec<Vector3>,
    pub normals: Vec<Vector3>,
}

impl NifRead for DecalVectorBlock {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let n = r.read_count16()?;
        Ok(Self {
            points: r.read_vec(n)?,
            normals: r.read_vec(n)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BsDecalPlacementVectorExtraData {
    pub float: NiFloatExtraData,
    pub blocks: Vec<DecalVectorBlock>,
}

impl NifRead for BsDecalPlacementVectorExtraData {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let float = r.read()?;
        let count = r.read_count16()?;
        Ok(Self {
            float,
            blocks: r.read_vec(count)?,
        })
    }
}

base!(
    NiExtraData,
    NiIntegerExtraData,
    NiFloatExtraData,
    NiBooleanExtraData,
    NiVectorExtraData,
    NiColorExtraData,
    NiStringExtraData,
    NiBinaryExtraData,
    NiTextKeyExtraData,
    NiStringsExtraData,
    NiIntegersExtraData,
    NiFloatsExtraData,
    BsBound,
    BsFurnitureMarker,
    BsInvMarker,
    BsBehaviorGraphExtraData,
    BsDecalPlacementVectorExtraData => none
);

/// The shared extra data fields of `data`, if it is an extra data record.
pub fn extra_data(data: &RecordData) -> Option<&NiExtraData> {
    Some(match data {
        RecordData::ExtraData(x) => x,
        RecordData::StringExtraData(x) => &x.extra,
        RecordData::IntegerExtraData(x) => &x.extra,
        RecordData::FloatExtraData(x) => &x.extra,
        RecordData::BooleanExtraData(x) => &x.extra,
        RecordData::BinaryExtraData(x) => &x.extra,
        RecordData::TextKeyExtraData(x) => &x.extra,
        RecordData::VectorExtraData(x) => &x.extra,
        RecordData::ColorExtraData(x) => &x.extra,
        RecordData::StringsExtraData(x) => &x.extra,
        RecordData::IntegersExtraData(x) => &x.extra,
        RecordData::FloatsExtraData(x) => &x.extra,
        RecordData::Bound(x) => &x.extra,
        RecordData::FurnitureMarker(x) => &x.extra,
        RecordData::InvMarker(x) => &x.extra,
        RecordData::BehaviorGraphExtraData(x) => &x.extra,
        RecordData::DecalPlacementVectorExtraData(x) => &x.float.extra,
        _ => return None,
    })
}

pub(crate) fn name_of(data: &RecordData) -> Option<&str> {
    extra_data(data).and_then(|x| x.name.as_deref())
}
