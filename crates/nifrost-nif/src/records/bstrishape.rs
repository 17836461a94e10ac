//! `BSTriShape`: Skyrim SE and Fallout 4 geometry with packed vertices.

use crate::compound::{Bound, Triangle, VertexData, VertexDesc};
use crate::gate::{v, Gate};
use crate::reader::{NifRead, NifReader};
use crate::reference::Reference;
use crate::records::{base, NiAvObject};
use crate::Result;

/// Skyrim SE (100) and Fallout 4 (130) layouts.
pub(crate) const LAYOUT: Gate = Gate::All(&[
    Gate::exactly(v::V20_2_0_7),
    Gate::Any(&[Gate::bs_range(100, 100), Gate::bs_range(130, 130)]),
]);
const WIDE_TRIANGLE_COUNT: Gate = Gate::bs_above(129);
const SSE: Gate = Gate::bs_range(100, 100);

/// Half-float particle geometry carried by Skyrim SE shapes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParticleData {
    pub vertices: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub triangles: Vec<Triangle>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BsTriShape {
    pub av: NiAvObject,
    pub bound: Bound,
    pub skin: Reference,
    pub shader_property: Reference,
    pub alpha_property: Reference,
    pub vertex_desc: VertexDesc,
    pub num_triangles: u32,
    pub num_vertices: u16,
    pub data_size: u32,
    pub vertices: Vec<VertexData>,
    pub triangles: Vec<Triangle>,
    /// Size of the particle block (Skyrim SE only).
    pub particle_data_size: Option<u32>,
    pub particle_data: Option<ParticleData>,
}

fn read_half3(r: &mut NifReader<'_, '_>) -> Result<[f32; 3]> {
    let c = r.cursor();
    Ok([c.read_f16()?, c.read_f16()?, c.read_f16()?])
}

impl NifRead for BsTriShape {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let av = r.read()?;
        let bound = r.read()?;
        let skin = r.read_ref()?;
        let shader_property = r.read_ref()?;
        let alpha_property = r.read_ref()?;
        let vertex_desc = VertexDesc(r.read_u64()?);
        let num_triangles = if r.gated(WIDE_TRIANGLE_COUNT) {
            r.read_u32()?
        } else {
            u32::from(r.read_u16()?)
        };
        let num_vertices = r.read_u16()?;
        let data_size = r.read_u32()?;

        let full_precision = r.gated(SSE);
        let attrs = vertex_desc.attributes();
        let (vertices, triangles) = if data_size > 0 {
            let vertices = r.read_vec_with(usize::from(num_vertices), |r| {
                VertexData::read(r, attrs, full_precision)
            })?;
            let triangles = r.read_vec(num_triangles as usize)?;
            (vertices, triangles)
        } else {
            (Vec::new(), Vec::new())
        };

        let particle_data_size = r.read_if(SSE)?;
        let particle_data = match particle_data_size {
            Some(size) if size > 0 => {
                let n = usize::from(num_vertices);
                Some(ParticleData {
                    vertices: r.read_vec_with(n, read_half3)?,
                    normals: r.read_vec_with(n, read_half3)?,
                    triangles: r.read_vec(num_triangles as usize)?,
                })
            }
            _ => None,
        };

        Ok(Self {
            av,
            bound,
            skin,
            shader_property,
            alpha_property,
            vertex_desc,
            num_triangles,
            num_vertices,
            data_size,
            vertices,
            triangles,
            particle_data_size,
            particle_data,
        })
    }
}

/// A `BSTriShape` with three LOD triangle counts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BsMeshLodTriShape {
    pub shape: BsTriShape,
    pub lod_sizes: [u32; 3],
}

impl NifRead for BsMeshLodTriShape {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            shape: r.read()?,
            lod_sizes: r.read_array()?,
        })
    }
}

base!(BsTriShape => av.av);
base!(BsMeshLodTriShape => av.shape.av);
