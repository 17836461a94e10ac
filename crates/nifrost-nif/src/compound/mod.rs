//! Fixed-shape value types embedded in records.
//!
//! None of these have identity; they are copied into the records that
//! contain them. Several change layout with the version context.

pub mod havok;
pub mod keys;
pub mod math;
pub mod texture;
pub mod vertex;

pub use havok::{HavokFilter, HavokFork, HavokMaterial, WorldObjectInfo};
pub use keys::{Key, KeyGroup, KeyType, QuatKey, RotationKeys, Tbc, TextKey};
pub use math::{
    Bound, BoundingVolume, ByteColor4, Color3, Color4, Matrix22, Matrix33, Matrix44, Plane,
    QuatTransform, Quaternion, TexCoord, Transform, Triangle, Vector2, Vector3, Vector4,
};
pub use texture::{FormatPrefs, ShaderTexDesc, TexDesc};
pub use vertex::{VertexAttributes, VertexData, VertexDesc};
