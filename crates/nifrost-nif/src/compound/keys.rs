//! Animation keyframes.
//!
//! A key group stores its interpolation type once, before the keys, and the
//! type decides how many bytes every key in the group occupies.

use crate::compound::math::Quaternion;
use crate::reader::{NifRead, NifReader};
use crate::{Error, Result};

/// How values between keys are interpolated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyType {
    #[default]
    Linear,
    /// Keys carry forward and backward tangents.
    Quadratic,
    /// Keys carry tension, bias and continuity.
    Tbc,
    /// Rotation split into three float curves.
    XyzRotation,
    /// Step function.
    Constant,
}

impl KeyType {
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            1 => Some(Self::Linear),
            2 => Some(Self::Quadratic),
            3 => Some(Self::Tbc),
            4 => Some(Self::XyzRotation),
            5 => Some(Self::Constant),
            _ => None,
        }
    }
}

impl NifRead for KeyType {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let at = r.position();
        let raw = r.read_u32()?;
        Self::from_raw(raw).ok_or_else(|| {
            Error::Common(nifrost_common::Error::invalid(
                at,
                format!("unknown key type {raw}"),
            ))
        })
    }
}

/// Tension, bias, continuity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Tbc {
    pub tension: f32,
    pub bias: f32,
    pub continuity: f32,
}

impl NifRead for Tbc {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            tension: r.read_f32()?,
            bias: r.read_f32()?,
            continuity: r.read_f32()?,
        })
    }
}

/// One keyframe.
#[derive(Debug, Clone, PartialEq)]
pub struct Key<T> {
    pub time: f32,
    pub value: T,
    /// Tangents, for quadratic groups.
    pub forward: Option<T>,
    pub backward: Option<T>,
    /// For TBC groups.
    pub tbc: Option<Tbc>,
}

impl<T: NifRead> Key<T> {
    pub fn read(r: &mut NifReader<'_, '_>, interpolation: KeyType) -> Result<Self> {
        let time = r.read_f32()?;
        let value = r.read()?;
        let (forward, backward) = if interpolation == KeyType::Quadratic {
            (Some(r.read()?), Some(r.read()?))
        } else {
            (None, None)
        };
        let tbc = if interpolation == KeyType::Tbc {
            Some(r.read()?)
        } else {
            None
        };
        Ok(Self {
            time,
            value,
            forward,
            backward,
            tbc,
        })
    }
}

/// A keyframe track.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyGroup<T> {
    /// Only stored on disk when the group is non-empty.
    pub interpolation: Option<KeyType>,
    pub keys: Vec<Key<T>>,
}

impl<T> Default for KeyGroup<T> {
    fn default() -> Self {
        Self {
            interpolation: None,
            keys: Vec::new(),
        }
    }
}

impl<T> KeyGroup<T> {
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<T: NifRead> NifRead for KeyGroup<T> {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let count = r.read_count()?;
        if count == 0 {
            return Ok(Self::default());
        }
        let interpolation: KeyType = r.read()?;
        let keys = r.read_vec_with(count, |r| Key::read(r, interpolation))?;
        Ok(Self {
            interpolation: Some(interpolation),
            keys,
        })
    }
}

/// Rotation keyframe. Never carries tangents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuatKey {
    pub time: f32,
    pub value: Quaternion,
    pub tbc: Option<Tbc>,
}

impl QuatKey {
    pub fn read(r: &mut NifReader<'_, '_>, interpolation: KeyType) -> Result<Self> {
        Ok(Self {
            time: r.read_f32()?,
            value: r.read()?,
            tbc: if interpolation == KeyType::Tbc {
                Some(r.read()?)
            } else {
                None
            },
        })
    }
}

/// Rotation track: either quaternion keys or three Euler curves.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RotationKeys {
    #[default]
    None,
    Quaternion {
        interpolation: KeyType,
        keys: Vec<QuatKey>,
    },
    Xyz {
        /// Euler order, stored up to 10.1.0.0.
        order: Option<f32>,
        curves: [KeyGroup<f32>; 3],
    },
}

/// A named time marker.
#[derive(Debug, Clone, PartialEq)]
pub struct TextKey {
    pub time: f32,
    pub value: String,
}

impl NifRead for TextKey {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            time: r.read_f32()?,
            value: r.read_string()?,
        })
    }
}
