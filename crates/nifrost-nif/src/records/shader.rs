//! Bethesda shader properties.
//!
//! Fallout 3 era files (`bsver <= 34`) use the `BSShader*Property` family,
//! which keeps the fixed `BSShaderProperty` prefix. Skyrim replaced them
//! with `BSLightingShaderProperty` and `BSEffectShaderProperty`, whose
//! trailing fields depend on the shader type.

use crate::compound::{Color3, Color4, TexCoord, Vector3, Vector4};
use crate::gate::Gate;
use crate::reader::{NifRead, NifReader};
use crate::reference::Reference;
use crate::records::{base, NiObjectNet};
use crate::Result;

pub(crate) const LEGACY_LAYOUT: Gate = Gate::bs_at_most(34);
pub(crate) const SKYRIM_LAYOUT: Gate = Gate::bs_range(83, 129);

const REFRACTION_AND_FIRE: Gate = Gate::bs_above(14);
const PARALLAX: Gate = Gate::bs_above(24);
const NO_LIGHTING_FALLOFF: Gate = Gate::bs_above(26);

/// Prefix shared by the legacy shader properties.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BsShaderProperty {
    pub net: NiObjectNet,
    pub flags: u16,
    pub shader_type: u32,
    pub shader_flags: u32,
    pub shader_flags_2: u32,
    pub env_map_scale: f32,
    pub texture_clamp_mode: u32,
}

impl NifRead for BsShaderProperty {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            net: r.read()?,
            flags: r.read_u16()?,
            shader_type: r.read_u32()?,
            shader_flags: r.read_u32()?,
            shader_flags_2: r.read_u32()?,
            env_map_scale: r.read_f32()?,
            texture_clamp_mode: r.read_u32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BsShaderPpLightingProperty {
    pub shader: BsShaderProperty,
    pub texture_set: Reference,
    pub refraction_strength: Option<f32>,
    pub refraction_fire_period: Option<i32>,
    pub parallax_max_passes: Option<f32>,
    pub parallax_scale: Option<f32>,
}

impl NifRead for BsShaderPpLightingProperty {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            shader: r.read()?,
            texture_set: r.read_ref()?,
            refraction_strength: r.read_if(REFRACTION_AND_FIRE)?,
            refraction_fire_period: r.read_if(REFRACTION_AND_FIRE)?,
            parallax_max_passes: r.read_if(PARALLAX)?,
            parallax_scale: r.read_if(PARALLAX)?,
        })
    }
}

/// Falloff cone used by unlit and effect shaders.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Falloff {
    pub start_angle: f32,
    pub stop_angle: f32,
    pub start_opacity: f32,
    pub stop_opacity: f32,
}

impl NifRead for Falloff {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            start_angle: r.read_f32()?,
            stop_angle: r.read_f32()?,
            start_opacity: r.read_f32()?,
            stop_opacity: r.read_f32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BsShaderNoLightingProperty {
    pub shader: BsShaderProperty,
    pub file_name: String,
    pub falloff: Option<Falloff>,
}

impl NifRead for BsShaderNoLightingProperty {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            shader: r.read()?,
            file_name: r.read_sized_string()?,
            falloff: r.read_if(NO_LIGHTING_FALLOFF)?,
        })
    }
}

/// Trailing fields selected by `BSLightingShaderProperty::shader_type`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ShaderTypeData {
    #[default]
    None,
    EnvironmentMap {
        env_map_scale: f32,
    },
    SkinTint(Color3),
    HairTint(Color3),
    ParallaxOcclusion {
        max_passes: f32,
        scale: f32,
    },
    MultiLayerParallax {
        inner_layer_thickness: f32,
        refraction_scale: f32,
        inner_layer_texture_scale: TexCoord,
        env_map_strength: f32,
    },
    SparkleSnow(Vector4),
    EyeEnvironmentMap {
        eye_cubemap_scale: f32,
        left_reflection_center: Vector3,
        right_reflection_center: Vector3,
    },
}

impl ShaderTypeData {
    fn read(r: &mut NifReader<'_, '_>, shader_type: u32) -> Result<Self> {
        Ok(match shader_type {
            1 => Self::EnvironmentMap {
                env_map_scale: r.read_f32()?,
            },
            5 => Self::SkinTint(r.read()?),
            6 => Self::HairTint(r.read()?),
            7 => Self::ParallaxOcclusion {
                max_passes: r.read_f32()?,
                scale: r.read_f32()?,
            },
            11 => Self::MultiLayerParallax {
                inner_layer_thickness: r.read_f32()?,
                refraction_scale: r.read_f32()?,
                inner_layer_texture_scale: r.read()?,
                env_map_strength: r.read_f32()?,
            },
            14 => Self::SparkleSnow(r.read()?),
            16 => Self::EyeEnvironmentMap {
                eye_cubemap_scale: r.read_f32()?,
                left_reflection_center: r.read()?,
                right_reflection_center: r.read()?,
            },
            _ => Self::None,
        })
    }
}

/// Skyrim's general purpose lit shader.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BsLightingShaderProperty {
    pub shader_type: u32,
    pub net: NiObjectNet,
    pub shader_flags_1: u32,
    pub shader_flags_2: u32,
    pub uv_offset: TexCoord,
    pub uv_scale: TexCoord,
    pub texture_set: Reference,
    pub emissive_color: Color3,
    pub emissive_multiple: f32,
    pub texture_clamp_mode: u32,
    pub alpha: f32,
    pub refraction_strength: f32,
    pub glossiness: f32,
    pub specular_color: Color3,
    pub specular_strength: f32,
    pub lighting_effect_1: f32,
    pub lighting_effect_2: f32,
    pub type_data: ShaderTypeData,
}

impl NifRead for BsLightingShaderProperty {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        // The type precedes the name so readers can pick the layout early.
        let shader_type = r.read_u32()?;
        Ok(Self {
            shader_type,
            net: r.read()?,
            shader_flags_1: r.read_u32()?,
            shader_flags_2: r.read_u32()?,
            uv_offset: r.read()?,
            uv_scale: r.read()?,
            texture_set: r.read_ref()?,
            emissive_color: r.read()?,
            emissive_multiple: r.read_f32()?,
            texture_clamp_mode: r.read_u32()?,
            alpha: r.read_f32()?,
            refraction_strength: r.read_f32()?,
            glossiness: r.read_f32()?,
            specular_color: r.read()?,
            specular_strength: r.read_f32()?,
            lighting_effect_1: r.read_f32()?,
            lighting_effect_2: r.read_f32()?,
            type_data: ShaderTypeData::read(r, shader_type)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct BsEffectShaderProperty {
    pub net: NiObjectNet,
    pub shader_flags_1: u32,
    pub shader_flags_2: u32,
    pub uv_offset: TexCoord,
    pub uv_scale: TexCoord,
    pub source_texture: String,
    pub texture_clamp_mode: u8,
    pub lighting_influence: u8,
    pub env_map_min_lod: u8,
    pub unknown_byte: u8,
    pub falloff: Falloff,
    pub emissive_color: Color4,
    pub emissive_multiple: f32,
    pub soft_falloff_depth: f32,
    pub greyscale_texture: String,
}

impl NifRead for BsEffectShaderProperty {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            net: r.read()?,
            shader_flags_1: r.read_u32()?,
            shader_flags_2: r.read_u32()?,
            uv_offset: r.read()?,
            uv_scale: r.read()?,
            source_texture: r.read_sized_string()?,
            texture_clamp_mode: r.read_u8()?,
            lighting_influence: r.read_u8()?,
            env_map_min_lod: r.read_u8()?,
            unknown_byte: r.read_u8()?,
            falloff: r.read()?,
            emissive_color: r.read()?,
            emissive_multiple: r.read_f32()?,
            soft_falloff_depth: r.read_f32()?,
            greyscale_texture: r.read_sized_string()?,
        })
    }
}

/// Texture paths referenced by a lighting shader, by slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BsShaderTextureSet {
    pub textures: Vec<String>,
}

impl BsShaderTextureSet {
    /// Non-empty paths only.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.textures.iter().map(String::as_str).filter(|t| !t.is_empty())
    }
}

impl NifRead for BsShaderTextureSet {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let count = r.read_count()?;
        Ok(Self {
            textures: r.read_vec_with(count, |r| r.read_sized_string())?,
        })
    }
}

base!(BsShaderPpLightingProperty, BsShaderNoLightingProperty => net.shader.net);
base!(BsLightingShaderProperty, BsEffectShaderProperty => net.net);
base!(BsShaderTextureSet => none);
