//! `NiTexturingProperty` and its texture sources.

use crate::compound::{FormatPrefs, Matrix22, ShaderTexDesc, TexDesc};
use crate::gate::{v, Gate};
use crate::reader::{NifRead, NifReader};
use crate::reference::Reference;
use crate::records::{base, NiObjectNet};
use crate::Result;

const FLAGS: Gate = Gate::Any(&[Gate::until(v::V10_0_1_2), Gate::since(v::V20_1_0_2)]);
const APPLY_MODE: Gate = Gate::between(v::V3_3_0_13, v::V20_1_0_1);
const NORMAL_AND_PARALLAX: Gate = Gate::since(v::V20_2_0_5);
const SHADER_TEXTURES: Gate = Gate::since(v::V10_0_1_0);

const EXTERNAL_LINK: Gate = Gate::since(v::V10_1_0_0);
const INTERNAL_UNKNOWN_BYTE: Gate = Gate::until(v::V10_0_1_0);
const INTERNAL_FILE_NAME: Gate = Gate::since(v::V10_1_0_0);
const DIRECT_RENDER: Gate = Gate::since(v::V10_1_0_103);
const PERSIST_RENDER_DATA: Gate = Gate::since(v::V20_2_0_4);

/// Bump map slot with its luminance and perturbation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct BumpMap {
    pub texture: TexDesc,
    pub luma_scale: f32,
    pub luma_offset: f32,
    pub matrix: Matrix22,
}

/// Multitexturing state: up to a dozen fixed slots plus shader maps.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiTexturingProperty {
    pub net: NiObjectNet,
    pub flags: Option<u16>,
    pub apply_mode: Option<u32>,
    pub texture_count: u32,
    pub base: Option<TexDesc>,
    pub dark: Option<TexDesc>,
    pub detail: Option<TexDesc>,
    pub gloss: Option<TexDesc>,
    pub glow: Option<TexDesc>,
    pub bump: Option<BumpMap>,
    pub normal: Option<TexDesc>,
    pub parallax: Option<(TexDesc, f32)>,
    pub decals: Vec<TexDesc>,
    pub shader_textures: Vec<ShaderTexDesc>,
}

fn slot(r: &mut NifReader<'_, '_>) -> Result<Option<TexDesc>> {
    if r.read_bool()? {
        r.read().map(Some)
    } else {
        Ok(None)
    }
}

impl NifRead for NiTexturingProperty {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let mut out = Self {
            net: r.read()?,
            flags: r.read_if(FLAGS)?,
            apply_mode: r.read_if(APPLY_MODE)?,
            texture_count: r.read_u32()?,
            ..Self::default()
        };
        out.base = slot(r)?;
        out.dark = slot(r)?;
        out.detail = slot(r)?;
        out.gloss = slot(r)?;
        out.glow = slot(r)?;
        if let Some(texture) = slot(r)? {
            out.bump = Some(BumpMap {
                texture,
                luma_scale: r.read_f32()?,
                luma_offset: r.read_f32()?,
                matrix: r.read()?,
            });
        }

        let modern = r.gated(NORMAL_AND_PARALLAX);
        if modern {
            out.normal = slot(r)?;
            if let Some(texture) = slot(r)? {
                out.parallax = Some((texture, r.read_f32()?));
            }
        }

        // The first decal slot always has a flag; the others only when
        // the texture count leaves room for them.
        let first_optional_decal = if modern { 10 } else { 8 };
        if let Some(decal) = slot(r)? {
            out.decals.push(decal);
        }
        for needed in first_optional_decal..first_optional_decal + 3 {
            if out.texture_count >= needed {
                if let Some(decal) = slot(r)? {
                    out.decals.push(decal);
                }
            }
        }

        if r.gated(SHADER_TEXTURES) {
            out.shader_textures = r.read_list()?;
        }
        Ok(out)
    }
}

/// Where the pixels of a source texture live.
#[derive(Debug, Clone, PartialEq)]
pub enum TextureSource {
    External {
        file_name: String,
        unknown_link: Option<Reference>,
    },
    Internal {
        unknown_byte: Option<u8>,
        file_name: Option<String>,
        pixel_data: Reference,
    },
}

impl Default for TextureSource {
    fn default() -> Self {
        Self::External {
            file_name: String::new(),
            unknown_link: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiSourceTexture {
    pub net: NiObjectNet,
    pub source: TextureSource,
    pub format_prefs: FormatPrefs,
    pub is_static: u8,
    pub direct_render: Option<bool>,
    pub persist_render_data: Option<bool>,
}

impl NiSourceTexture {
    /// The external file name, when the texture is not embedded.
    pub fn file_name(&self) -> Option<&str> {
        match &self.source {
            TextureSource::External { file_name, .. } => Some(file_name),
            TextureSource::Internal { .. } => None,
        }
    }
}

impl NifRead for NiSourceTexture {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let net = r.read()?;
        let source = if r.read_u8()? != 0 {
            TextureSource::External {
                file_name: r.read_string()?,
                unknown_link: r.read_if(EXTERNAL_LINK)?,
            }
        } else {
            TextureSource::Internal {
                unknown_byte: r.read_if(INTERNAL_UNKNOWN_BYTE)?,
                file_name: r.read_if(INTERNAL_FILE_NAME)?,
                pixel_data: r.read_ref()?,
            }
        };
        Ok(Self {
            net,
            source,
            format_prefs: r.read()?,
            is_static: r.read_u8()?,
            direct_render: r.read_if(DIRECT_RENDER)?,
            persist_render_data: r.read_if(PERSIST_RENDER_DATA)?,
        })
    }
}

base!(NiTexturingProperty, NiSourceTexture => net.net);
