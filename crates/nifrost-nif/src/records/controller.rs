//! Time controllers.
//!
//! Before 10.1.0.104 controllers link their keyframe data directly; later
//! versions go through an interpolator instead, so most controllers carry
//! both fields as options.

use crate::gate::{v, Gate};
use crate::reader::{NifRead, NifReader};
use crate::reference::Reference;
use crate::records::base;
use crate::Result;

const MANAGER_CONTROLLED: Gate = Gate::between(v::V10_1_0_104, v::V10_1_0_108);
const INTERPOLATOR: Gate = Gate::since(v::V10_1_0_104);
const LEGACY_DATA: Gate = Gate::until(v::V10_1_0_103);
const TARGET_COLOR: Gate = Gate::since(v::V10_1_0_0);
const FLIP_ACCUM_TIME: Gate = Gate::between(v::V4_0_0_0, v::V10_1_0_103);
const MORPH_EXTRA_FLAGS: Gate = Gate::since(v::V10_0_1_2);
const MORPH_UNKNOWN_BYTE: Gate = Gate::exactly(v::V10_1_0_106);
const MORPH_ALWAYS_UPDATE: Gate = Gate::since(v::V4_0_0_1);
const MORPH_INTERPOLATOR_COUNT: Gate = Gate::since(v::V10_1_0_106);
const MORPH_INTERPOLATORS: Gate = Gate::between(v::V10_1_0_106, v::V20_0_0_5);
const MORPH_WEIGHTS: Gate = Gate::since(v::V20_1_0_3);
const MORPH_UNKNOWN_INTS: Gate = Gate::All(&[
    Gate::between(v::V10_2_0_0, v::V20_0_0_5),
    Gate::user_at_least(10),
]);
const PATH_FLAGS: Gate = Gate::since(v::V10_1_0_104);
const LOOK_AT_FLAGS: Gate = Gate::since(v::V10_1_0_0);

/// Fields shared by every controller.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiTimeController {
    pub next_controller: Reference,
    pub flags: u16,
    pub frequency: f32,
    pub phase: f32,
    pub start_time: f32,
    pub stop_time: f32,
    /// Back link to the controlled object.
    pub target: Reference,
}

impl NifRead for NiTimeController {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            next_controller: r.read_ref()?,
            flags: r.read_u16()?,
            frequency: r.read_f32()?,
            phase: r.read_f32()?,
            start_time: r.read_f32()?,
            stop_time: r.read_f32()?,
            target: r.read_ref()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiInterpController {
    pub controller: NiTimeController,
    pub manager_controlled: Option<bool>,
}

impl NifRead for NiInterpController {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            controller: r.read()?,
            manager_controlled: r.read_if(MANAGER_CONTROLLED)?,
        })
    }
}

/// A controller driven by one interpolator. Read for the keyframe,
/// transform, alpha and visibility controllers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiSingleInterpController {
    pub interp: NiInterpController,
    pub interpolator: Option<Reference>,
    pub data: Option<Reference>,
}

impl NiSingleInterpController {
    fn read_head(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            interp: r.read()?,
            interpolator: r.read_if(INTERPOLATOR)?,
            data: None,
        })
    }

    pub fn time(&self) -> &NiTimeController {
        &self.interp.controller
    }
}

impl NifRead for NiSingleInterpController {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let mut out = Self::read_head(r)?;
        out.data = r.read_if(LEGACY_DATA)?;
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiMaterialColorController {
    pub single: NiSingleInterpController,
    /// Which material color is animated (ambient, diffuse, specular, self-illum).
    pub target_color: Option<u16>,
}

impl NifRead for NiMaterialColorController {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let mut single = NiSingleInterpController::read_head(r)?;
        let target_color = r.read_if(TARGET_COLOR)?;
        single.data = r.read_if(LEGACY_DATA)?;
        Ok(Self {
            single,
            target_color,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiTextureTransformController {
    pub single: NiSingleInterpController,
    pub shader_map: bool,
    pub texture_slot: u32,
    pub operation: u32,
}

impl NifRead for NiTextureTransformController {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let mut single = NiSingleInterpController::read_head(r)?;
        let shader_map = r.read_bool()?;
        let texture_slot = r.read_u32()?;
        let operation = r.read_u32()?;
        single.data = r.read_if(LEGACY_DATA)?;
        Ok(Self {
            single,
            shader_map,
            texture_slot,
            operation,
        })
    }
}

/// Cycles a texture slot through a list of source textures.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiFlipController {
    pub single: NiSingleInterpController,
    pub texture_slot: u32,
    pub accum_time: Option<f32>,
    pub delta: Option<f32>,
    pub sources: Vec<Reference>,
}

impl NifRead for NiFlipController {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            single: NiSingleInterpController::read_head(r)?,
            texture_slot: r.read_u32()?,
            accum_time: r.read_if(FLIP_ACCUM_TIME)?,
            delta: r.read_if(LEGACY_DATA)?,
            sources: r.read_ref_list()?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MorphWeight {
    pub interpolator: Reference,
    pub weight: f32,
}

impl NifRead for MorphWeight {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            interpolator: r.read_ref()?,
            weight: r.read_f32()?,
        })
    }
}

/// Drives the morph targets of a `NiMorphData`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiGeomMorpherController {
    pub interp: NiInterpController,
    pub extra_flags: Option<u16>,
    pub unknown_byte: Option<u8>,
    pub data: Reference,
    pub always_update: Option<u8>,
    pub interpolators: Vec<Reference>,
    pub weights: Vec<MorphWeight>,
    pub unknown_ints: Vec<u32>,
}

impl NifRead for NiGeomMorpherController {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let mut out = Self {
            interp: r.read()?,
            extra_flags: r.read_if(MORPH_EXTRA_FLAGS)?,
            unknown_byte: r.read_if(MORPH_UNKNOWN_BYTE)?,
            data: r.read_ref()?,
            always_update: r.read_if(MORPH_ALWAYS_UPDATE)?,
            ..Self::default()
        };
        if r.gated(MORPH_INTERPOLATOR_COUNT) {
            let count = r.read_count()?;
            if r.gated(MORPH_INTERPOLATORS) {
                out.interpolators = r.read_refs(count)?;
            }
            if r.gated(MORPH_WEIGHTS) {
                out.weights = r.read_vec(count)?;
            }
        }
        if r.gated(MORPH_UNKNOWN_INTS) {
            out.unknown_ints = r.read_list()?;
        }
        Ok(out)
    }
}

/// Owns the controller sequences of an animated object.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiControllerManager {
    pub controller: NiTimeController,
    pub cumulative: bool,
    pub sequences: Vec<Reference>,
    pub object_palette: Reference,
}

impl NifRead for NiControllerManager {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            controller: r.read()?,
            cumulative: r.read_bool()?,
            sequences: r.read_ref_list()?,
            object_palette: r.read_ref()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiMultiTargetTransformController {
    pub interp: NiInterpController,
    pub extra_targets: Vec<Reference>,
}

impl NifRead for NiMultiTargetTransformController {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let interp = r.read()?;
        let count = r.read_count16()?;
        Ok(Self {
            interp,
            extra_targets: r.read_refs(count)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiPathController {
    pub controller: NiTimeController,
    pub path_flags: Option<u16>,
    pub bank_dir: i32,
    pub max_bank_angle: f32,
    pub smoothing: f32,
    pub follow_axis: i16,
    pub path_data: Reference,
    pub percent_data: Reference,
}

impl NifRead for NiPathController {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            controller: r.read()?,
            path_flags: r.read_if(PATH_FLAGS)?,
            bank_dir: r.read_i32()?,
            max_bank_angle: r.read_f32()?,
            smoothing: r.read_f32()?,
            follow_axis: r.read_i16()?,
            path_data: r.read_ref()?,
            percent_data: r.read_ref()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiUvController {
    pub controller: NiTimeController,
    pub unknown_short: u16,
    pub data: Reference,
}

impl NifRead for NiUvController {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            controller: r.read()?,
            unknown_short: r.read_u16()?,
            data: r.read_ref()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiLookAtController {
    pub controller: NiTimeController,
    pub look_at_flags: Option<u16>,
    pub look_at: Reference,
}

impl NifRead for NiLookAtController {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            controller: r.read()?,
            look_at_flags: r.read_if(LOOK_AT_FLAGS)?,
            look_at: r.read_ref()?,
        })
    }
}

base!(
    NiSingleInterpController,
    NiMaterialColorController,
    NiTextureTransformController,
    NiFlipController,
    NiGeomMorpherController,
    NiControllerManager,
    NiMultiTargetTransformController,
    NiPathController,
    NiUvController,
    NiLookAtController => none
);
