//! Packed per-vertex records of `BSTriShape`.
//!
//! The vertex descriptor is a 64-bit word whose upper bits say which
//! attributes each vertex carries. Positions are full or half floats, UVs
//! are half floats, and normals and tangents are byte-quantized.

use crate::compound::math::{ByteColor4, TexCoord, Vector3};
use crate::reader::NifReader;
use crate::Result;

/// Attribute flags of a vertex descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VertexAttributes(pub u16);

impl VertexAttributes {
    pub const VERTEX: u16 = 0x001;
    pub const UVS: u16 = 0x002;
    pub const NORMALS: u16 = 0x008;
    pub const TANGENTS: u16 = 0x010;
    pub const COLORS: u16 = 0x020;
    pub const SKINNED: u16 = 0x040;
    pub const EYE_DATA: u16 = 0x100;
    pub const FULL_PRECISION: u16 = 0x400;

    pub fn has(self, flag: u16) -> bool {
        self.0 & flag != 0
    }
}

/// The raw 64-bit vertex descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VertexDesc(pub u64);

impl VertexDesc {
    pub fn attributes(self) -> VertexAttributes {
        VertexAttributes(((self.0 >> 44) & 0xFFF) as u16)
    }

    /// Size of one vertex in bytes, in units of four.
    pub fn vertex_size(self) -> usize {
        ((self.0 & 0xF) * 4) as usize
    }
}

/// One decoded vertex. Attributes absent from the descriptor are `None`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VertexData {
    pub position: Option<Vector3>,
    pub bitangent_x: Option<f32>,
    pub uv: Option<TexCoord>,
    pub normal: Option<[f32; 3]>,
    pub bitangent_y: Option<f32>,
    pub tangent: Option<[f32; 3]>,
    pub bitangent_z: Option<f32>,
    pub color: Option<ByteColor4>,
    pub bone_weights: Option<[f32; 4]>,
    pub bone_indices: Option<[u8; 4]>,
    pub eye_data: Option<f32>,
}

impl VertexData {
    /// Read one vertex. `full_precision` forces float positions, which is
    /// the case for every Skyrim Special Edition vertex.
    pub fn read(
        r: &mut NifReader<'_, '_>,
        attrs: VertexAttributes,
        full_precision: bool,
    ) -> Result<Self> {
        let mut out = Self::default();
        let c = r.cursor();

        if attrs.has(VertexAttributes::VERTEX) {
            if full_precision || attrs.has(VertexAttributes::FULL_PRECISION) {
                out.position = Some(Vector3::new(c.read_f32()?, c.read_f32()?, c.read_f32()?));
                if attrs.has(VertexAttributes::TANGENTS) {
                    out.bitangent_x = Some(c.read_f32()?);
                } else {
                    c.skip(4)?;
                }
            } else {
                out.position = Some(Vector3::new(c.read_f16()?, c.read_f16()?, c.read_f16()?));
                if attrs.has(VertexAttributes::TANGENTS) {
                    out.bitangent_x = Some(c.read_f16()?);
                } else {
                    c.skip(2)?;
                }
            }
        }
        if attrs.has(VertexAttributes::UVS) {
            out.uv = Some(TexCoord {
                x: c.read_f16()?,
                y: c.read_f16()?,
            });
        }
        if attrs.has(VertexAttributes::NORMALS) {
            out.normal = Some(c.read_byte_normal()?);
            out.bitangent_y = Some(c.read_norm_byte()?);
            if attrs.has(VertexAttributes::TANGENTS) {
                out.tangent = Some(c.read_byte_normal()?);
                out.bitangent_z = Some(c.read_norm_byte()?);
            }
        }
        if attrs.has(VertexAttributes::COLORS) {
            let [r_, g, b, a] = c.read_byte_array::<4>()?;
            out.color = Some(ByteColor4 { r: r_, g, b, a });
        }
        if attrs.has(VertexAttributes::SKINNED) {
            out.bone_weights = Some([c.read_f16()?, c.read_f16()?, c.read_f16()?, c.read_f16()?]);
            out.bone_indices = Some(c.read_byte_array::<4>()?);
        }
        if attrs.has(VertexAttributes::EYE_DATA) {
            out.eye_data = Some(c.read_f32()?);
        }
        Ok(out)
    }
}
