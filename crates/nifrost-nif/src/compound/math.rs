//! Geometric and color value types.

use crate::gate::{v, Gate};
use crate::reader::{NifRead, NifReader};
use crate::{Error, Result};

/// `NiQuatTransform` carries per-component validity flags up to 10.1.0.109.
const QUAT_TRANSFORM_VALID_FLAGS: Gate = Gate::until(v::V10_1_0_109);

macro_rules! float_struct {
    ($(#[$doc:meta])* $name:ident { $($field:ident),+ }) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Default)]
        pub struct $name {
            $(pub $field: f32,)+
        }

        impl NifRead for $name {
            fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
                Ok(Self {
                    $($field: r.read_f32()?,)+
                })
            }
        }
    };
}

float_struct!(
    /// Two-component vector, also used for texture coordinates.
    Vector2 { x, y }
);
float_struct!(Vector3 { x, y, z });
float_struct!(Vector4 { x, y, z, w });
float_struct!(Color3 { r, g, b });
float_struct!(Color4 { r, g, b, a });

/// Texture coordinate pair (u, v).
pub type TexCoord = Vector2;

impl Vector3 {
    pub const ZERO: Vector3 = Vector3 {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Rotation quaternion, stored `w, x, y, z` on disk unless noted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Quaternion = Quaternion {
        w: 1.0,
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    /// Havok order: `x, y, z, w`.
    pub fn read_xyzw(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let x = r.read_f32()?;
        let y = r.read_f32()?;
        let z = r.read_f32()?;
        let w = r.read_f32()?;
        Ok(Self { w, x, y, z })
    }
}

impl NifRead for Quaternion {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            w: r.read_f32()?,
            x: r.read_f32()?,
            y: r.read_f32()?,
            z: r.read_f32()?,
        })
    }
}

/// Row-major square matrix. On disk the elements are stored column by
/// column (`m11 m21 m31 m12 ...`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix<const N: usize> {
    pub rows: [[f32; N]; N],
}

pub type Matrix22 = Matrix<2>;
pub type Matrix33 = Matrix<3>;
pub type Matrix44 = Matrix<4>;

impl<const N: usize> Matrix<N> {
    pub fn identity() -> Self {
        let mut rows = [[0.0; N]; N];
        for (i, row) in rows.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        Self { rows }
    }
}

impl<const N: usize> Default for Matrix<N> {
    fn default() -> Self {
        Self::identity()
    }
}

impl<const N: usize> NifRead for Matrix<N> {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let mut rows = [[0.0; N]; N];
        for col in 0..N {
            for row in rows.iter_mut() {
                row[col] = r.read_f32()?;
            }
        }
        Ok(Self { rows })
    }
}

impl Matrix33 {
    /// Havok `hkMatrix3`: three rows of four floats, the fourth ignored.
    pub fn read_padded(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let mut rows = [[0.0; 3]; 3];
        for row in rows.iter_mut() {
            *row = [r.read_f32()?, r.read_f32()?, r.read_f32()?];
            r.read_f32()?;
        }
        Ok(Self { rows })
    }
}

impl Matrix44 {
    /// Embed a rotation, with identity in the last row and column.
    pub fn from_rotation(m: &Matrix33) -> Self {
        let mut out = Self::identity();
        for (dst, src) in out.rows.iter_mut().zip(m.rows.iter()) {
            dst[..3].copy_from_slice(src);
        }
        out
    }
}

/// RGBA color, one byte per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteColor4 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl NifRead for ByteColor4 {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            r: r.read_u8()?,
            g: r.read_u8()?,
            b: r.read_u8()?,
            a: r.read_u8()?,
        })
    }
}

/// Three vertex indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Triangle {
    pub v1: u16,
    pub v2: u16,
    pub v3: u16,
}

impl NifRead for Triangle {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            v1: r.read_u16()?,
            v2: r.read_u16()?,
            v3: r.read_u16()?,
        })
    }
}

/// Rotation, translation, uniform scale.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    pub rotation: Matrix33,
    pub translation: Vector3,
    pub scale: f32,
}

impl NifRead for Transform {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            rotation: r.read()?,
            translation: r.read()?,
            scale: r.read_f32()?,
        })
    }
}

/// Translation, quaternion rotation, uniform scale.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct QuatTransform {
    pub translation: Vector3,
    pub rotation: Quaternion,
    pub scale: f32,
    /// Which of translation, rotation and scale are meaningful.
    pub valid: Option<[bool; 3]>,
}

impl NifRead for QuatTransform {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            translation: r.read()?,
            rotation: r.read()?,
            scale: r.read_f32()?,
            valid: r.read_if_with(QUAT_TRANSFORM_VALID_FLAGS, |r| r.read_array())?,
        })
    }
}

/// Bounding sphere.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bound {
    pub center: Vector3,
    pub radius: f32,
}

impl NifRead for Bound {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            center: r.read()?,
            radius: r.read_f32()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Plane {
    pub normal: Vector3,
    pub constant: f32,
}

impl NifRead for Plane {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            normal: r.read()?,
            constant: r.read_f32()?,
        })
    }
}

/// Legacy collision volume attached to scene objects.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundingVolume {
    Sphere(Bound),
    Box {
        center: Vector3,
        axes: [Vector3; 3],
        extent: [f32; 3],
    },
    Capsule {
        center: Vector3,
        origin: Vector3,
        extent: f32,
        radius: f32,
    },
    Union(Vec<BoundingVolume>),
    HalfSpace {
        plane: Plane,
        center: Vector3,
    },
}

impl NifRead for BoundingVolume {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let at = r.position();
        match r.read_u32()? {
            0 => Ok(Self::Sphere(r.read()?)),
            1 => Ok(Self::Box {
                center: r.read()?,
                axes: r.read_array()?,
                extent: r.read_array()?,
            }),
            2 => Ok(Self::Capsule {
                center: r.read()?,
                origin: r.read()?,
                extent: r.read_f32()?,
                radius: r.read_f32()?,
            }),
            4 => Ok(Self::Union(r.read_list()?)),
            5 => Ok(Self::HalfSpace {
                plane: r.read()?,
                center: r.read()?,
            }),
            other => Err(Error::Common(nifrost_common::Error::invalid(
                at,
                format!("unknown bounding volume type {other}"),
            ))),
        }
    }
}
