//! Texture slot descriptors.

use crate::compound::math::TexCoord;
use crate::gate::{v, Gate};
use crate::reader::{NifRead, NifReader};
use crate::reference::Reference;
use crate::Result;

const CLAMP_AND_FILTER: Gate = Gate::until(v::V20_0_0_5);
const PACKED_FLAGS: Gate = Gate::since(v::V20_1_0_3);
const UV_SET: Gate = Gate::until(v::V20_0_0_5);
const PS2: Gate = Gate::until(v::V10_4_0_1);
const UNKNOWN_SHORT: Gate = Gate::until(v::V4_1_0_12);
const TEXTURE_TRANSFORM: Gate = Gate::since(v::V10_1_0_0);

/// UV transform applied to a texture slot.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TexTransform {
    pub translation: TexCoord,
    pub scale: TexCoord,
    pub rotation: f32,
    pub method: u32,
    pub center: TexCoord,
}

impl NifRead for TexTransform {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            translation: r.read()?,
            scale: r.read()?,
            rotation: r.read_f32()?,
            method: r.read_u32()?,
            center: r.read()?,
        })
    }
}

/// One texture slot of `NiTexturingProperty`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TexDesc {
    pub source: Reference,
    pub clamp_mode: Option<u32>,
    pub filter_mode: Option<u32>,
    /// Clamp, filter and UV set packed together (20.1.0.3+).
    pub flags: Option<u16>,
    pub uv_set: Option<u32>,
    pub ps2_l: Option<i16>,
    pub ps2_k: Option<i16>,
    pub unknown: Option<u16>,
    pub transform: Option<TexTransform>,
}

impl NifRead for TexDesc {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let source = r.read_ref()?;
        let clamp_mode = r.read_if(CLAMP_AND_FILTER)?;
        let filter_mode = r.read_if(CLAMP_AND_FILTER)?;
        let flags = r.read_if(PACKED_FLAGS)?;
        let uv_set = r.read_if(UV_SET)?;
        let ps2_l = r.read_if(PS2)?;
        let ps2_k = r.read_if(PS2)?;
        let unknown = r.read_if(UNKNOWN_SHORT)?;
        let transform = if r.gated(TEXTURE_TRANSFORM) && r.read_bool()? {
            Some(r.read()?)
        } else {
            None
        };
        Ok(Self {
            source,
            clamp_mode,
            filter_mode,
            flags,
            uv_set,
            ps2_l,
            ps2_k,
            unknown,
            transform,
        })
    }
}

/// Extra shader map slot.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderTexDesc {
    pub map: Option<(TexDesc, u32)>,
}

impl NifRead for ShaderTexDesc {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let map = if r.read_bool()? {
            let desc = r.read()?;
            let id = r.read_u32()?;
            Some((desc, id))
        } else {
            None
        };
        Ok(Self { map })
    }
}

/// Pixel layout preferences of a source texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatPrefs {
    pub pixel_layout: u32,
    pub use_mipmaps: u32,
    pub alpha_format: u32,
}

impl NifRead for FormatPrefs {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            pixel_layout: r.read_u32()?,
            use_mipmaps: r.read_u32()?,
            alpha_format: r.read_u32()?,
        })
    }
}
