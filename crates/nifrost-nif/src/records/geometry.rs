//! Classic triangle geometry: `NiTriShape`/`NiTriStrips` and their data.

use crate::compound::{Color4, TexCoord, Triangle, Vector3};
use crate::gate::{v, Gate};
use crate::reader::{NifRead, NifReader};
use crate::reference::Reference;
use crate::records::{base, NiAvObject};
use crate::Result;

const SHADER_NAME: Gate = Gate::between(v::V10_0_1_0, v::V20_1_0_3);
const MATERIALS: Gate = Gate::since(v::V20_2_0_5);
const MATERIAL_NEEDS_UPDATE: Gate = Gate::since(v::V20_2_0_7);
const BS_PROPERTIES: Gate = Gate::All(&[Gate::since(v::V20_2_0_7), Gate::bs_above(34)]);

const GROUP_ID: Gate = Gate::since(v::V10_1_0_114);
const KEEP_COMPRESS_FLAGS: Gate = Gate::since(v::V10_1_0_0);
const DATA_FLAGS: Gate = Gate::since(v::V10_0_1_0);
const LEGACY_DATA_FLAGS: Gate = Gate::until(v::V4_2_2_0);
const HAS_UV: Gate = Gate::until(v::V4_0_0_2);
const MATERIAL_CRC: Gate = Gate::All(&[Gate::since(v::V20_2_0_7), Gate::bs_above(34)]);
const TANGENT_SPACE: Gate = Gate::since(v::V10_1_0_0);
const CONSISTENCY_FLAGS: Gate = Gate::since(v::V10_0_1_0);
const ADDITIONAL_DATA: Gate = Gate::since(v::V20_0_0_4);
/// Bethesda 20.2.0.7 files store a single UV set flag in bit 0.
const BS_DATA_FLAGS: Gate = Gate::All(&[Gate::exactly(v::V20_2_0_7), Gate::bs_above(0)]);
const HAS_PRIMITIVES: Gate = Gate::since(v::V10_0_1_3);

const UV_SET_MASK: u16 = 0x3F;
const TANGENT_SPACE_MASK: u16 = 0xF000;

/// Shader and material names attached to a geometry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaterialData {
    /// Shader name and implementation (10.0.1.0 ..= 20.1.0.3).
    pub shader: Option<(String, i32)>,
    pub material_names: Vec<String>,
    pub material_extra_data: Vec<i32>,
    pub active_material: Option<i32>,
    pub needs_update: Option<bool>,
}

impl NifRead for MaterialData {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let mut out = Self::default();
        if r.gated(SHADER_NAME) && r.read_bool()? {
            out.shader = Some((r.read_string()?, r.read_i32()?));
        }
        if r.gated(MATERIALS) {
            let count = r.read_count()?;
            out.material_names = r.read_vec(count)?;
            out.material_extra_data = r.read_vec(count)?;
            out.active_material = Some(r.read_i32()?);
        }
        out.needs_update = r.read_if(MATERIAL_NEEDS_UPDATE)?;
        Ok(out)
    }
}

/// `NiTriShape` and `NiTriStrips`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiGeometry {
    pub av: NiAvObject,
    pub data: Reference,
    pub skin_instance: Reference,
    pub material: MaterialData,
    pub shader_property: Option<Reference>,
    pub alpha_property: Option<Reference>,
}

impl NifRead for NiGeometry {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let av = r.read()?;
        let data = r.read_ref()?;
        let skin_instance = r.read_ref()?;
        let material = r.read()?;
        let (shader_property, alpha_property) = if r.gated(BS_PROPERTIES) {
            (Some(r.read_ref()?), Some(r.read_ref()?))
        } else {
            (None, None)
        };
        Ok(Self {
            av,
            data,
            skin_instance,
            material,
            shader_property,
            alpha_property,
        })
    }
}

/// A tri shape with three fixed LOD triangle counts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BsLodTriShape {
    pub geometry: NiGeometry,
    pub lod_sizes: [u32; 3],
}

impl NifRead for BsLodTriShape {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            geometry: r.read()?,
            lod_sizes: r.read_array()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Segment {
    pub flags: u8,
    pub index: u32,
    pub num_triangles: u32,
}

impl NifRead for Segment {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            flags: r.read_u8()?,
            index: r.read_u32()?,
            num_triangles: r.read_u32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BsSegmentedTriShape {
    pub geometry: NiGeometry,
    pub segments: Vec<Segment>,
}

impl NifRead for BsSegmentedTriShape {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            geometry: r.read()?,
            segments: r.read_list()?,
        })
    }
}

/// Per-vertex arrays shared by all geometry data records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiGeometryData {
    pub group_id: Option<i32>,
    pub num_vertices: u16,
    pub keep_flags: Option<u8>,
    pub compress_flags: Option<u8>,
    pub vertices: Vec<Vector3>,
    /// UV set count in the low six bits (bit 0 only in Bethesda files),
    /// tangent space method in the top four.
    pub data_flags: u16,
    pub material_crc: Option<u32>,
    pub normals: Vec<Vector3>,
    pub tangents: Vec<Vector3>,
    pub bitangents: Vec<Vector3>,
    pub center: Vector3,
    pub radius: f32,
    pub vertex_colors: Vec<Color4>,
    pub has_uv: Option<bool>,
    pub uv_sets: Vec<Vec<TexCoord>>,
    pub consistency_flags: Option<u16>,
    pub additional_data: Option<Reference>,
}

impl NiGeometryData {
    fn uv_set_count(&self, bethesda: bool) -> usize {
        if bethesda {
            usize::from(self.data_flags & 1)
        } else {
            usize::from(self.data_flags & UV_SET_MASK)
        }
    }
}

impl NifRead for NiGeometryData {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let mut out = Self {
            group_id: r.read_if(GROUP_ID)?,
            num_vertices: r.read_u16()?,
            ..Self::default()
        };
        let n = usize::from(out.num_vertices);
        if r.gated(KEEP_COMPRESS_FLAGS) {
            out.keep_flags = Some(r.read_u8()?);
            out.compress_flags = Some(r.read_u8()?);
        }
        if r.read_bool()? {
            out.vertices = r.read_vec(n)?;
        }
        if r.gated(DATA_FLAGS) {
            out.data_flags = r.read_u16()?;
        }
        out.material_crc = r.read_if(MATERIAL_CRC)?;
        if r.read_bool()? {
            out.normals = r.read_vec(n)?;
            if r.gated(TANGENT_SPACE) && out.data_flags & TANGENT_SPACE_MASK != 0 {
                out.tangents = r.read_vec(n)?;
                out.bitangents = r.read_vec(n)?;
            }
        }
        out.center = r.read()?;
        out.radius = r.read_f32()?;
        if r.read_bool()? {
            out.vertex_colors = r.read_vec(n)?;
        }
        if r.gated(LEGACY_DATA_FLAGS) {
            out.data_flags = r.read_u16()?;
        }
        out.has_uv = r.read_if(HAS_UV)?;
        let sets = out.uv_set_count(r.gated(BS_DATA_FLAGS));
        out.uv_sets = r.read_vec_with(sets, |r| r.read_vec(n))?;
        out.consistency_flags = r.read_if(CONSISTENCY_FLAGS)?;
        out.additional_data = r.read_if(ADDITIONAL_DATA)?;
        Ok(out)
    }
}

/// Vertices sharing a position, for welding.
pub type MatchGroup = Vec<u16>;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiTriShapeData {
    pub geometry: NiGeometryData,
    pub num_triangles: u16,
    pub num_triangle_points: u32,
    pub triangles: Vec<Triangle>,
    pub match_groups: Vec<MatchGroup>,
}

impl NifRead for NiTriShapeData {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let geometry = r.read()?;
        let num_triangles = r.read_u16()?;
        let num_triangle_points = r.read_u32()?;
        let has_triangles = !r.gated(HAS_PRIMITIVES) || r.read_bool()?;
        let triangles = if has_triangles {
            r.read_vec(usize::from(num_triangles))?
        } else {
            Vec::new()
        };
        let groups = r.read_count16()?;
        let match_groups = r.read_vec_with(groups, |r| {
            let count = r.read_count16()?;
            r.read_vec(count)
        })?;
        Ok(Self {
            geometry,
            num_triangles,
            num_triangle_points,
            triangles,
            match_groups,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiTriStripsData {
    pub geometry: NiGeometryData,
    pub num_triangles: u16,
    pub strip_lengths: Vec<u16>,
    pub strips: Vec<Vec<u16>>,
}

impl NiTriStripsData {
    /// Expand the strips into triangles, dropping degenerate ones and
    /// flipping every other winding.
    pub fn triangles(&self) -> Vec<Triangle> {
        let mut out = Vec::with_capacity(usize::from(self.num_triangles));
        for strip in &self.strips {
            for (i, w) in strip.windows(3).enumerate() {
                let (a, b, c) = (w[0], w[1], w[2]);
                if a == b || b == c || a == c {
                    continue;
                }
                let (v2, v3) = if i % 2 == 0 { (b, c) } else { (c, b) };
                out.push(Triangle { v1: a, v2, v3 });
            }
        }
        out
    }
}

impl NifRead for NiTriStripsData {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let geometry = r.read()?;
        let num_triangles = r.read_u16()?;
        let num_strips = r.read_count16()?;
        let strip_lengths: Vec<u16> = r.read_vec(num_strips)?;
        let has_points = !r.gated(HAS_PRIMITIVES) || r.read_bool()?;
        let strips = if has_points {
            let mut strips = Vec::with_capacity(strip_lengths.len());
            for &len in &strip_lengths {
                strips.push(r.read_vec(usize::from(len))?);
            }
            strips
        } else {
            Vec::new()
        };
        Ok(Self {
            geometry,
            num_triangles,
            strip_lengths,
            strips,
        })
    }
}

base!(NiGeometry => av.av);
base!(BsLodTriShape, BsSegmentedTriShape => av.geometry.av);
base!(NiTriShapeData, NiTriStripsData => none);
