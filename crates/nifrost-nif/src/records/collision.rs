//! Havok collision objects, rigid bodies and shapes.
//!
//! Layer and material fields decode against the document's Havok fork;
//! see [`HavokFork`](crate::compound::HavokFork).

use crate::compound::{
    HavokFilter, HavokMaterial, Matrix33, Matrix44, Quaternion, Triangle, Vector3, Vector4,
    WorldObjectInfo,
};
use crate::gate::{v, Gate};
use crate::reader::{NifRead, NifReader};
use crate::reference::Reference;
use crate::records::base;
use crate::records::controller::NiTimeController;
use crate::Result;

/// Fallout 4 moved to a different physics format.
pub(crate) const RIGID_BODY_LAYOUT: Gate = Gate::bs_at_most(129);

const BLEND_UNKNOWN_FLOATS: Gate = Gate::bs_at_most(8);
const POST_OBLIVION: Gate = Gate::bs_above(34);
const VELOCITY_LIMITS: Gate = Gate::since(v::V10_1_0_0);
const LEGACY_BODY_FLAGS: Gate = Gate::bs_at_most(75);
const MOPP_ORIGIN: Gate = Gate::since(v::V10_1_0_0);
const STRIPS_SCALE: Gate = Gate::since(v::V10_1_0_0);
const PACKED_SUBSHAPES_IN_SHAPE: Gate = Gate::until(v::V20_0_0_5);
const PACKED_TRIANGLE_NORMAL: Gate = Gate::until(v::V20_0_0_5);
const PACKED_COMPRESSED: Gate = Gate::since(v::V20_2_0_7);

fn skip(r: &mut NifReader<'_, '_>, count: usize) -> Result<()> {
    r.cursor().skip(count)?;
    Ok(())
}

/// Links a scene object to its rigid body or phantom.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BhkCollisionObject {
    /// Back link to the owning scene object.
    pub target: Reference,
    pub flags: u16,
    pub body: Reference,
}

impl NifRead for BhkCollisionObject {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            target: r.read_ref()?,
            flags: r.read_u16()?,
            body: r.read_ref()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BhkBlendCollisionObject {
    pub collision: BhkCollisionObject,
    pub heir_gain: f32,
    pub velocity_gain: f32,
    pub unknown: Option<[f32; 2]>,
}

impl NifRead for BhkBlendCollisionObject {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            collision: r.read()?,
            heir_gain: r.read_f32()?,
            velocity_gain: r.read_f32()?,
            unknown: r.read_if_with(BLEND_UNKNOWN_FLOATS, |r| r.read_array())?,
        })
    }
}

/// Shape, filter and broadphase info shared by bodies and phantoms.
#[derive(Debug, Clone, PartialEq)]
pub struct BhkWorldObject {
    pub shape: Reference,
    pub filter: HavokFilter,
    pub info: WorldObjectInfo,
}

impl NifRead for BhkWorldObject {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            shape: r.read_ref()?,
            filter: r.read()?,
            info: r.read()?,
        })
    }
}

/// Motion fields stored only by Skyrim era bodies.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExtendedMotion {
    pub time_factor: f32,
    pub gravity_factor: f32,
    pub rolling_friction_multiplier: f32,
    pub auto_remove_level: u8,
    pub response_modifier_flags: u8,
    pub num_shape_keys_in_contact_point: u8,
    pub force_collided_onto_ppu: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BhkRigidBody {
    pub world: BhkWorldObject,
    pub collision_response: u8,
    pub process_contact_callback_delay: u16,
    /// Copy of the world object filter kept in the construction info.
    pub body_filter: HavokFilter,
    pub translation: Vector4,
    pub rotation: Quaternion,
    pub linear_velocity: Vector4,
    pub angular_velocity: Vector4,
    pub inertia: Matrix33,
    pub center: Vector4,
    pub mass: f32,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub friction: f32,
    pub restitution: f32,
    pub max_linear_velocity: Option<f32>,
    pub max_angular_velocity: Option<f32>,
    pub penetration_depth: Option<f32>,
    pub motion_system: u8,
    pub deactivator_type: u8,
    pub solver_deactivation: u8,
    pub quality_type: u8,
    pub extended: Option<ExtendedMotion>,
    pub constraints: Vec<Reference>,
    pub body_flags: u32,
}

impl NifRead for BhkRigidBody {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let world = r.read()?;
        let collision_response = r.read_u8()?;
        skip(r, 1)?;
        let process_contact_callback_delay = r.read_u16()?;

        skip(r, 4)?;
        let body_filter = r.read()?;
        skip(r, 4 + 4 + 4)?;

        let translation = r.read()?;
        let rotation = Quaternion::read_xyzw(r)?;
        let linear_velocity = r.read()?;
        let angular_velocity = r.read()?;
        let inertia = Matrix33::read_padded(r)?;
        let center = r.read()?;
        let mass = r.read_f32()?;
        let linear_damping = r.read_f32()?;
        let angular_damping = r.read_f32()?;

        let extended = r.gated(POST_OBLIVION);
        let mut ext = ExtendedMotion::default();
        if extended {
            ext.time_factor = r.read_f32()?;
            ext.gravity_factor = r.read_f32()?;
        }
        let friction = r.read_f32()?;
        if extended {
            ext.rolling_friction_multiplier = r.read_f32()?;
        }
        let restitution = r.read_f32()?;
        let limits = r.gated(VELOCITY_LIMITS);
        let (max_linear_velocity, max_angular_velocity, penetration_depth) = if limits {
            (Some(r.read_f32()?), Some(r.read_f32()?), Some(r.read_f32()?))
        } else {
            (None, None, None)
        };
        let motion_system = r.read_u8()?;
        let deactivator_type = r.read_u8()?;
        let solver_deactivation = r.read_u8()?;
        let quality_type = r.read_u8()?;
        if extended {
            ext.auto_remove_level = r.read_u8()?;
            ext.response_modifier_flags = r.read_u8()?;
            ext.num_shape_keys_in_contact_point = r.read_u8()?;
            ext.force_collided_onto_ppu = r.read_u8()? != 0;
        }
        skip(r, 12)?;

        let constraints = r.read_ref_list()?;
        let body_flags = if r.gated(LEGACY_BODY_FLAGS) {
            r.read_u32()?
        } else {
            u32::from(r.read_u16()?)
        };
        Ok(Self {
            world,
            collision_response,
            process_contact_callback_delay,
            body_filter,
            translation,
            rotation,
            linear_velocity,
            angular_velocity,
            inertia,
            center,
            mass,
            linear_damping,
            angular_damping,
            friction,
            restitution,
            max_linear_velocity,
            max_angular_velocity,
            penetration_depth,
            motion_system,
            deactivator_type,
            solver_deactivation,
            quality_type,
            extended: extended.then_some(ext),
            constraints,
            body_flags,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BhkSimpleShapePhantom {
    pub world: BhkWorldObject,
    pub transform: Matrix44,
}

impl NifRead for BhkSimpleShapePhantom {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let world = r.read()?;
        skip(r, 8)?;
        Ok(Self {
            world,
            transform: r.read()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BhkSphereShape {
    pub material: HavokMaterial,
    pub radius: f32,
}

impl NifRead for BhkSphereShape {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            material: r.read()?,
            radius: r.read_f32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BhkBoxShape {
    pub material: HavokMaterial,
    pub radius: f32,
    /// Half extents.
    pub dimensions: Vector3,
    pub unused_float: f32,
}

impl NifRead for BhkBoxShape {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let material = r.read()?;
        let radius = r.read_f32()?;
        skip(r, 8)?;
        Ok(Self {
            material,
            radius,
            dimensions: r.read()?,
            unused_float: r.read_f32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BhkCapsuleShape {
    pub material: HavokMaterial,
    pub radius: f32,
    pub first_point: Vector3,
    pub radius_1: f32,
    pub second_point: Vector3,
    pub radius_2: f32,
}

impl NifRead for BhkCapsuleShape {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let material = r.read()?;
        let radius = r.read_f32()?;
        skip(r, 8)?;
        Ok(Self {
            material,
            radius,
            first_point: r.read()?,
            radius_1: r.read_f32()?,
            second_point: r.read()?,
            radius_2: r.read_f32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BhkConvexVerticesShape {
    pub material: HavokMaterial,
    pub radius: f32,
    pub vertices: Vec<Vector4>,
    /// Face planes: normal in xyz, distance in w.
    pub normals: Vec<Vector4>,
}

impl NifRead for BhkConvexVerticesShape {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let material = r.read()?;
        let radius = r.read_f32()?;
        skip(r, 12 + 12)?;
        Ok(Self {
            material,
            radius,
            vertices: r.read_list()?,
            normals: r.read_list()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BhkListShape {
    pub sub_shapes: Vec<Reference>,
    pub material: HavokMaterial,
    pub unknown_ints: Vec<u32>,
}

impl NifRead for BhkListShape {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let sub_shapes = r.read_ref_list()?;
        let material = r.read()?;
        skip(r, 12 + 12)?;
        Ok(Self {
            sub_shapes,
            material,
            unknown_ints: r.read_list()?,
        })
    }
}

/// Also read for `bhkConvexTransformShape`.
#[derive(Debug, Clone, PartialEq)]
pub struct BhkTransformShape {
    pub shape: Reference,
    pub material: HavokMaterial,
    pub radius: f32,
    pub transform: Matrix44,
}

impl NifRead for BhkTransformShape {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let shape = r.read_ref()?;
        let material = r.read()?;
        let radius = r.read_f32()?;
        skip(r, 8)?;
        Ok(Self {
            shape,
            material,
            radius,
            transform: r.read()?,
        })
    }
}

/// Shape wrapped in a precomputed MOPP bounding volume tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BhkMoppBvTreeShape {
    pub shape: Reference,
    pub shape_scale: f32,
    pub origin: Option<Vector3>,
    pub mopp_scale: Option<f32>,
    pub build_type: Option<u8>,
    pub mopp_data: Vec<u8>,
}

impl NifRead for BhkMoppBvTreeShape {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let shape = r.read_ref()?;
        skip(r, 12)?;
        let shape_scale = r.read_f32()?;
        let size = r.read_count()?;
        let (origin, mopp_scale) = if r.gated(MOPP_ORIGIN) {
            (Some(r.read()?), Some(r.read_f32()?))
        } else {
            (None, None)
        };
        Ok(Self {
            shape,
            shape_scale,
            origin,
            mopp_scale,
            build_type: r.read_if(POST_OBLIVION)?,
            mopp_data: r.read_bytes(size)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BhkNiTriStripsShape {
    pub material: HavokMaterial,
    pub radius: f32,
    pub grow_by: u32,
    pub scale: Option<Vector4>,
    pub strips_data: Vec<Reference>,
    pub data_layers: Vec<HavokFilter>,
}

impl NifRead for BhkNiTriStripsShape {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let material = r.read()?;
        let radius = r.read_f32()?;
        skip(r, 20)?;
        Ok(Self {
            material,
            radius,
            grow_by: r.read_u32()?,
            scale: r.read_if(STRIPS_SCALE)?,
            strips_data: r.read_ref_list()?,
            data_layers: r.read_list()?,
        })
    }
}

/// Vertex range of a packed shape sharing one filter and material.
#[derive(Debug, Clone, PartialEq)]
pub struct HavokSubShape {
    pub filter: HavokFilter,
    pub num_vertices: u32,
    pub material: HavokMaterial,
}

impl NifRead for HavokSubShape {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            filter: r.read()?,
            num_vertices: r.read_u32()?,
            material: r.read()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BhkPackedNiTriStripsShape {
    pub sub_shapes: Vec<HavokSubShape>,
    pub user_data: u32,
    pub radius: f32,
    pub scale: Vector4,
    pub data: Reference,
}

impl NifRead for BhkPackedNiTriStripsShape {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let sub_shapes = if r.gated(PACKED_SUBSHAPES_IN_SHAPE) {
            let count = r.read_count16()?;
            r.read_vec(count)?
        } else {
            Vec::new()
        };
        let user_data = r.read_u32()?;
        skip(r, 4)?;
        let radius = r.read_f32()?;
        skip(r, 4)?;
        let scale = r.read()?;
        // Radius and scale are stored twice.
        skip(r, 4 + 16)?;
        Ok(Self {
            sub_shapes,
            user_data,
            radius,
            scale,
            data: r.read_ref()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackedTriangle {
    pub triangle: Triangle,
    pub welding_info: u16,
    pub normal: Option<Vector3>,
}

impl NifRead for PackedTriangle {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            triangle: r.read()?,
            welding_info: r.read_u16()?,
            normal: r.read_if(PACKED_TRIANGLE_NORMAL)?,
        })
    }
}

fn read_half_vector(r: &mut NifReader<'_, '_>) -> Result<Vector3> {
    let c = r.cursor();
    Ok(Vector3::new(c.read_f16()?, c.read_f16()?, c.read_f16()?))
}

#[derive(Debug, Clone, PartialEq)]
pub struct HkPackedNiTriStripsData {
    pub triangles: Vec<PackedTriangle>,
    pub compressed: Option<bool>,
    pub vertices: Vec<Vector3>,
    pub sub_shapes: Vec<HavokSubShape>,
}

impl NifRead for HkPackedNiTriStripsData {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let triangles = r.read_list()?;
        let num_vertices = r.read_count()?;
        let compressed = r.read_if(PACKED_COMPRESSED)?;
        let vertices = if compressed == Some(true) {
            r.read_vec_with(num_vertices, read_half_vector)?
        } else {
            r.read_vec(num_vertices)?
        };
        let sub_shapes = if r.gated(PACKED_COMPRESSED) {
            let count = r.read_count16()?;
            r.read_vec(count)?
        } else {
            Vec::new()
        };
        Ok(Self {
            triangles,
            compressed,
            vertices,
            sub_shapes,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BhkBlendController {
    pub controller: NiTimeController,
    pub keys: u32,
}

impl NifRead for BhkBlendController {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            controller: r.read()?,
            keys: r.read_u32()?,
        })
    }
}

base!(
    BhkCollisionObject,
    BhkBlendCollisionObject,
    BhkRigidBody,
    BhkSimpleShapePhantom,
    BhkSphereShape,
    BhkBoxShape,
    BhkCapsuleShape,
    BhkConvexVerticesShape,
    BhkListShape,
    BhkTransformShape,
    BhkMoppBvTreeShape,
    BhkNiTriStripsShape,
    BhkPackedNiTriStripsShape,
    HkPackedNiTriStripsData,
    BhkBlendController => none
);
