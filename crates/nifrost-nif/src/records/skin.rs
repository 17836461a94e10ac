//! Skinning: bone bindings, per-bone weights and hardware partitions.

use crate::compound::{Bound, Transform, Triangle};
use crate::gate::{v, Gate};
use crate::reader::{NifRead, NifReader};
use crate::reference::Reference;
use crate::records::base;
use crate::Result;

const SKIN_PARTITION_LINK: Gate = Gate::since(v::V10_1_0_101);
const SKIN_DATA_PARTITION: Gate = Gate::between(v::V4_0_0_2, v::V10_1_0_0);
const HAS_VERTEX_WEIGHTS: Gate = Gate::since(v::V4_2_1_0);
const PARTITION_FLAGS: Gate = Gate::since(v::V10_1_0_0);
const PARTITION_LOD_SHORT: Gate = Gate::bs_above(34);

/// Skyrim SE stores a shared vertex buffer ahead of the partitions,
/// which is not decoded.
pub(crate) const PARTITION_LAYOUT: Gate = Gate::Any(&[Gate::bs_at_most(99), Gate::bs_above(100)]);

/// Binds a skinned geometry to its skeleton.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiSkinInstance {
    pub data: Reference,
    pub skin_partition: Option<Reference>,
    pub skeleton_root: Reference,
    pub bones: Vec<Reference>,
}

impl NifRead for NiSkinInstance {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            data: r.read_ref()?,
            skin_partition: r.read_if(SKIN_PARTITION_LINK)?,
            skeleton_root: r.read_ref()?,
            bones: r.read_ref_list()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BodyPartition {
    pub part_flag: u16,
    pub body_part: u16,
}

impl NifRead for BodyPartition {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            part_flag: r.read_u16()?,
            body_part: r.read_u16()?,
        })
    }
}

/// Skin instance whose partitions map to dismemberable body parts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BsDismemberSkinInstance {
    pub skin: NiSkinInstance,
    pub partitions: Vec<BodyPartition>,
}

impl NifRead for BsDismemberSkinInstance {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            skin: r.read()?,
            partitions: r.read_list()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct BoneVertData {
    pub index: u16,
    pub weight: f32,
}

impl NifRead for BoneVertData {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            index: r.read_u16()?,
            weight: r.read_f32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoneData {
    pub skin_transform: Transform,
    pub bounding_sphere: Bound,
    pub num_vertices: u16,
    pub vertex_weights: Vec<BoneVertData>,
}

impl BoneData {
    fn read(r: &mut NifReader<'_, '_>, has_weights: bool) -> Result<Self> {
        let skin_transform = r.read()?;
        let bounding_sphere = r.read()?;
        let num_vertices = r.read_u16()?;
        let vertex_weights = if has_weights {
            r.read_vec(usize::from(num_vertices))?
        } else {
            Vec::new()
        };
        Ok(Self {
            skin_transform,
            bounding_sphere,
            num_vertices,
            vertex_weights,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiSkinData {
    pub skin_transform: Transform,
    pub skin_partition: Option<Reference>,
    pub has_vertex_weights: Option<bool>,
    pub bones: Vec<BoneData>,
}

impl NifRead for NiSkinData {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let skin_transform = r.read()?;
        let num_bones = r.read_count()?;
        let skin_partition = r.read_if(SKIN_DATA_PARTITION)?;
        let has_vertex_weights = r.read_if(HAS_VERTEX_WEIGHTS)?;
        let weights = has_vertex_weights.unwrap_or(true);
        let bones = r.read_vec_with(num_bones, |r| BoneData::read(r, weights))?;
        Ok(Self {
            skin_transform,
            skin_partition,
            has_vertex_weights,
            bones,
        })
    }
}

/// One hardware skinning batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkinPartition {
    pub num_vertices: u16,
    pub num_triangles: u16,
    pub num_weights_per_vertex: u16,
    pub bones: Vec<u16>,
    pub vertex_map: Vec<u16>,
    /// `num_vertices` rows of `num_weights_per_vertex` weights.
    pub vertex_weights: Vec<Vec<f32>>,
    pub strip_lengths: Vec<u16>,
    pub strips: Vec<Vec<u16>>,
    pub triangles: Vec<Triangle>,
    pub bone_indices: Vec<Vec<u8>>,
    pub lod_short: Option<u16>,
}

impl NifRead for SkinPartition {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let num_vertices = r.read_u16()?;
        let num_triangles = r.read_u16()?;
        let num_bones = r.read_count16()?;
        let num_strips = r.read_count16()?;
        let num_weights_per_vertex = r.read_u16()?;
        let n = usize::from(num_vertices);
        let per = usize::from(num_weights_per_vertex);
        let flagged = r.gated(PARTITION_FLAGS);

        let bones = r.read_vec(num_bones)?;
        let vertex_map = if !flagged || r.read_bool()? {
            r.read_vec(n)?
        } else {
            Vec::new()
        };
        let vertex_weights = if !flagged || r.read_bool()? {
            r.read_vec_with(n, |r| r.read_vec(per))?
        } else {
            Vec::new()
        };
        let strip_lengths: Vec<u16> = r.read_vec(num_strips)?;
        let has_faces = !flagged || r.read_bool()?;
        let (strips, triangles) = match (has_faces, num_strips) {
            (false, _) => (Vec::new(), Vec::new()),
            (true, 0) => (Vec::new(), r.read_vec(usize::from(num_triangles))?),
            (true, _) => {
                let mut strips = Vec::with_capacity(num_strips);
                for &len in &strip_lengths {
                    strips.push(r.read_vec(usize::from(len))?);
                }
                (strips, Vec::new())
            }
        };
        let bone_indices = if r.read_bool()? {
            r.read_vec_with(n, |r| r.read_vec(per))?
        } else {
            Vec::new()
        };
        Ok(Self {
            num_vertices,
            num_triangles,
            num_weights_per_vertex,
            bones,
            vertex_map,
            vertex_weights,
            strip_lengths,
            strips,
            triangles,
            bone_indices,
            lod_short: r.read_if(PARTITION_LOD_SHORT)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiSkinPartition {
    pub partitions: Vec<SkinPartition>,
}

impl NifRead for NiSkinPartition {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            partitions: r.read_list()?,
        })
    }
}

base!(NiSkinInstance, BsDismemberSkinInstance, NiSkinData, NiSkinPartition => none);
