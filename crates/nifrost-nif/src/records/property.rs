//! Fixed-function render state properties.

use crate::compound::Color3;
use crate::gate::{v, Gate};
use crate::reader::{NifRead, NifReader};
use crate::records::{base, NiObjectNet};
use crate::Result;

const MATERIAL_FLAGS: Gate = Gate::until(v::V10_0_1_2);
const AMBIENT_DIFFUSE: Gate = Gate::bs_at_most(21);
const EMISSIVE_MULT: Gate = Gate::bs_above(21);
const ZBUFFER_FUNCTION: Gate = Gate::between(v::V4_1_0_12, v::V20_0_0_5);
const VERTEX_COLOR_MODES: Gate = Gate::until(v::V20_0_0_5);
const STENCIL_LEGACY_FLAGS: Gate = Gate::until(v::V10_0_1_2);
const STENCIL_FULL: Gate = Gate::until(v::V20_0_0_5);
const STENCIL_PACKED: Gate = Gate::since(v::V20_1_0_3);

/// Alpha blending and testing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiAlphaProperty {
    pub net: NiObjectNet,
    /// Bit 0 enables blending, bits 1-4 and 5-8 pick the source and
    /// destination factors, bit 9 enables testing.
    pub flags: u16,
    pub threshold: u8,
}

impl NiAlphaProperty {
    pub fn blending(&self) -> bool {
        self.flags & 1 != 0
    }

    pub fn testing(&self) -> bool {
        self.flags & (1 << 9) != 0
    }
}

impl NifRead for NiAlphaProperty {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            net: r.read()?,
            flags: r.read_u16()?,
            threshold: r.read_u8()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiMaterialProperty {
    pub net: NiObjectNet,
    pub flags: Option<u16>,
    pub ambient_color: Option<Color3>,
    pub diffuse_color: Option<Color3>,
    pub specular_color: Color3,
    pub emissive_color: Color3,
    pub glossiness: f32,
    pub alpha: f32,
    pub emissive_mult: Option<f32>,
}

impl NifRead for NiMaterialProperty {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            net: r.read()?,
            flags: r.read_if(MATERIAL_FLAGS)?,
            ambient_color: r.read_if(AMBIENT_DIFFUSE)?,
            diffuse_color: r.read_if(AMBIENT_DIFFUSE)?,
            specular_color: r.read()?,
            emissive_color: r.read()?,
            glossiness: r.read_f32()?,
            alpha: r.read_f32()?,
            emissive_mult: r.read_if(EMISSIVE_MULT)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiZBufferProperty {
    pub net: NiObjectNet,
    pub flags: u16,
    pub function: Option<u32>,
}

impl NifRead for NiZBufferProperty {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            net: r.read()?,
            flags: r.read_u16()?,
            function: r.read_if(ZBUFFER_FUNCTION)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiVertexColorProperty {
    pub net: NiObjectNet,
    pub flags: u16,
    pub vertex_mode: Option<u32>,
    pub lighting_mode: Option<u32>,
}

impl NifRead for NiVertexColorProperty {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            net: r.read()?,
            flags: r.read_u16()?,
            vertex_mode: r.read_if(VERTEX_COLOR_MODES)?,
            lighting_mode: r.read_if(VERTEX_COLOR_MODES)?,
        })
    }
}

/// Specular, wireframe, dither and shade properties: a name and a flag
/// word.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiFlagProperty {
    pub net: NiObjectNet,
    pub flags: u16,
}

impl NifRead for NiFlagProperty {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            net: r.read()?,
            flags: r.read_u16()?,
        })
    }
}

/// Stencil state. Up to 20.0.0.5 every parameter is a separate field;
/// later versions pack the functions into `flags`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiStencilProperty {
    pub net: NiObjectNet,
    pub flags: Option<u16>,
    pub enabled: Option<u8>,
    pub function: Option<u32>,
    pub reference: u32,
    pub mask: u32,
    pub fail_action: Option<u32>,
    pub z_fail_action: Option<u32>,
    pub pass_action: Option<u32>,
    pub draw_mode: Option<u32>,
}

impl NifRead for NiStencilProperty {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let mut out = Self {
            net: r.read()?,
            flags: r.read_if(STENCIL_LEGACY_FLAGS)?,
            ..Self::default()
        };
        if r.gated(STENCIL_FULL) {
            out.enabled = Some(r.read_u8()?);
            out.function = Some(r.read_u32()?);
            out.reference = r.read_u32()?;
            out.mask = r.read_u32()?;
            out.fail_action = Some(r.read_u32()?);
            out.z_fail_action = Some(r.read_u32()?);
            out.pass_action = Some(r.read_u32()?);
            out.draw_mode = Some(r.read_u32()?);
        }
        if r.gated(STENCIL_PACKED) {
            out.flags = Some(r.read_u16()?);
            out.reference = r.read_u32()?;
            out.mask = r.read_u32()?;
        }
        Ok(out)
    }
}

base!(
    NiAlphaProperty,
    NiMaterialProperty,
    NiZBufferProperty,
    NiVertexColorProperty,
    NiFlagProperty,
    NiStencilProperty => net.net
);
