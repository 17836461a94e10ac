//! Cameras, lights and texture projection effects.

use crate::compound::{Color3, Matrix33, Plane, Vector3};
use crate::gate::{v, Gate};
use crate::reader::{NifRead, NifReader};
use crate::reference::Reference;
use crate::records::{base, NiAvObject};
use crate::Result;

const CAMERA_FLAGS: Gate = Gate::since(v::V10_1_0_0);
const ORTHOGRAPHIC: Gate = Gate::since(v::V10_1_0_0);
const SCREEN_TEXTURES: Gate = Gate::since(v::V4_2_1_0);

const SWITCH_STATE: Gate = Gate::All(&[Gate::since(v::V10_1_0_106), Gate::bs_at_most(129)]);
const AFFECTED_NODE_POINTERS: Gate = Gate::until(v::V4_0_0_2);
const AFFECTED_NODES: Gate = Gate::All(&[Gate::since(v::V10_1_0_0), Gate::bs_at_most(129)]);
const INNER_SPOT_ANGLE: Gate = Gate::since(v::V20_2_0_5);
const SOURCE_TEXTURE: Gate = Gate::since(v::V4_0_0_0);
const PS2_FIELDS: Gate = Gate::until(v::V10_2_0_0);
const EFFECT_UNKNOWN_SHORT: Gate = Gate::until(v::V4_1_0_12);

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiCamera {
    pub av: NiAvObject,
    pub camera_flags: Option<u16>,
    pub frustum_left: f32,
    pub frustum_right: f32,
    pub frustum_top: f32,
    pub frustum_bottom: f32,
    pub frustum_near: f32,
    pub frustum_far: f32,
    pub orthographic: Option<bool>,
    pub viewport_left: f32,
    pub viewport_right: f32,
    pub viewport_top: f32,
    pub viewport_bottom: f32,
    pub lod_adjust: f32,
    pub scene: Reference,
    pub num_screen_polygons: u32,
    pub num_screen_textures: Option<u32>,
}

impl NifRead for NiCamera {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            av: r.read()?,
            camera_flags: r.read_if(CAMERA_FLAGS)?,
            frustum_left: r.read_f32()?,
            frustum_right: r.read_f32()?,
            frustum_top: r.read_f32()?,
            frustum_bottom: r.read_f32()?,
            frustum_near: r.read_f32()?,
            frustum_far: r.read_f32()?,
            orthographic: r.read_if(ORTHOGRAPHIC)?,
            viewport_left: r.read_f32()?,
            viewport_right: r.read_f32()?,
            viewport_top: r.read_f32()?,
            viewport_bottom: r.read_f32()?,
            lod_adjust: r.read_f32()?,
            scene: r.read_ref()?,
            num_screen_polygons: r.read_u32()?,
            num_screen_textures: r.read_if(SCREEN_TEXTURES)?,
        })
    }
}

/// Shared part of lights and texture effects.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiDynamicEffect {
    pub av: NiAvObject,
    pub switch_state: Option<bool>,
    /// Raw pointers written by very old exporters, not block links.
    pub affected_node_pointers: Vec<u32>,
    pub affected_nodes: Vec<Reference>,
}

impl NifRead for NiDynamicEffect {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let av = r.read()?;
        let switch_state = r.read_if(SWITCH_STATE)?;
        let affected_node_pointers = if r.gated(AFFECTED_NODE_POINTERS) {
            r.read_list()?
        } else {
            Vec::new()
        };
        let affected_nodes = if r.gated(AFFECTED_NODES) {
            r.read_ref_list()?
        } else {
            Vec::new()
        };
        Ok(Self {
            av,
            switch_state,
            affected_node_pointers,
            affected_nodes,
        })
    }
}

/// Ambient and directional lights, and the base of point lights.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiLight {
    pub effect: NiDynamicEffect,
    pub dimmer: f32,
    pub ambient_color: Color3,
    pub diffuse_color: Color3,
    pub specular_color: Color3,
}

impl NifRead for NiLight {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            effect: r.read()?,
            dimmer: r.read_f32()?,
            ambient_color: r.read()?,
            diffuse_color: r.read()?,
            specular_color: r.read()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiPointLight {
    pub light: NiLight,
    pub constant_attenuation: f32,
    pub linear_attenuation: f32,
    pub quadratic_attenuation: f32,
}

impl NifRead for NiPointLight {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            light: r.read()?,
            constant_attenuation: r.read_f32()?,
            linear_attenuation: r.read_f32()?,
            quadratic_attenuation: r.read_f32()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiSpotLight {
    pub point: NiPointLight,
    pub outer_spot_angle: f32,
    pub inner_spot_angle: Option<f32>,
    pub exponent: f32,
}

impl NifRead for NiSpotLight {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            point: r.read()?,
            outer_spot_angle: r.read_f32()?,
            inner_spot_angle: r.read_if(INNER_SPOT_ANGLE)?,
            exponent: r.read_f32()?,
        })
    }
}

/// Projects a texture onto the affected nodes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NiTextureEffect {
    pub effect: NiDynamicEffect,
    pub model_projection_matrix: Matrix33,
    pub model_projection_translation: Vector3,
    pub texture_filtering: u32,
    pub texture_clamping: u32,
    pub texture_type: u32,
    pub coordinate_generation_type: u32,
    pub source_texture: Option<Reference>,
    pub enable_plane: bool,
    pub plane: Plane,
    pub ps2_l: Option<i16>,
    pub ps2_k: Option<i16>,
    pub unknown_short: Option<u16>,
}

impl NifRead for NiTextureEffect {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        Ok(Self {
            effect: r.read()?,
            model_projection_matrix: r.read()?,
            model_projection_translation: r.read()?,
            texture_filtering: r.read_u32()?,
            texture_clamping: r.read_u32()?,
            texture_type: r.read_u32()?,
            coordinate_generation_type: r.read_u32()?,
            source_texture: r.read_if(SOURCE_TEXTURE)?,
            enable_plane: r.read_bool()?,
            plane: r.read()?,
            ps2_l: r.read_if(PS2_FIELDS)?,
            ps2_k: r.read_if(PS2_FIELDS)?,
            unknown_short: r.read_if(EFFECT_UNKNOWN_SHORT)?,
        })
    }
}

base!(NiCamera, NiDynamicEffect => av.av);
base!(NiLight, NiTextureEffect => av.effect.av);
base!(NiPointLight => av.light.effect.av);
base!(NiSpotLight => av.point.light.effect.av);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::object::tests::write_av;
    use crate::testing::{ctx, decode, NifWriter};

    fn write_light(w: &mut NifWriter, c: crate::version::VersionContext) {
        write_av(w, c, "Light");
        if SWITCH_STATE.matches(&c) {
            w.bool(true);
        }
        if AFFECTED_NODE_POINTERS.matches(&c) {
            w.u32(1).u32(0xDEAD_BEEF);
        }
        if AFFECTED_NODES.matches(&c) {
            w.links(&[0]);
        }
        w.f32(1.0);
        w.f32s(&[0.1, 0.1, 0.1, 1.0, 0.9, 0.8, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_point_light_oblivion() {
        let c = ctx(v::V20_0_0_5, 11, 11);
        let mut w = NifWriter::new(c);
        write_light(&mut w, c);
        w.f32s(&[1.0, 0.0, 0.01]);
        let (light, rest): (NiPointLight, _) = decode(&mut w).unwrap();

        assert_eq!(rest, 0);
        assert_eq!(light.light.effect.switch_state, None);
        assert_eq!(light.light.effect.affected_nodes, vec![Reference::new(0)]);
        assert_eq!(light.light.diffuse_color, Color3 { r: 1.0, g: 0.9, b: 0.8 });
        assert_eq!(light.quadratic_attenuation, 0.01);
    }

    #[test]
    fn test_spot_light_inner_angle_and_legacy_pointers() {
        let c = ctx(v::V4_0_0_2, 0, 0);
        let mut w = NifWriter::new(c);
        write_light(&mut w, c);
        w.f32s(&[1.0, 0.0, 0.0]).f32(0.7).f32(2.0);
        let (spot, rest): (NiSpotLight, _) = decode(&mut w).unwrap();

        assert_eq!(rest, 0);
        assert_eq!(spot.point.light.effect.affected_node_pointers, vec![0xDEAD_BEEF]);
        assert_eq!(spot.inner_spot_angle, None);
        assert_eq!(spot.exponent, 2.0);

        let c = ctx(v::V20_2_0_7, 12, 83);
        let mut w = NifWriter::new(c);
        write_light(&mut w, c);
        w.f32s(&[1.0, 0.0, 0.0]).f32(0.7).f32(0.3).f32(2.0);
        let (spot, rest): (NiSpotLight, _) = decode(&mut w).unwrap();
        assert_eq!(rest, 0);
        assert_eq!(spot.point.light.effect.switch_state, Some(true));
        assert_eq!(spot.inner_spot_angle, Some(0.3));
    }

    #[test]
    fn test_camera_morrowind() {
        let c = ctx(v::V4_0_0_2, 0, 0);
        let mut w = NifWriter::new(c);
        write_av(&mut w, c, "Camera");
        w.f32s(&[-0.5, 0.5, 0.5, -0.5, 1.0, 5000.0]);
        w.f32s(&[0.0, 1.0, 1.0, 0.0, 0.0]);
        w.link(-1).u32(0);
        let (cam, rest): (NiCamera, _) = decode(&mut w).unwrap();

        assert_eq!(rest, 0);
        assert_eq!(cam.camera_flags, None);
        assert_eq!(cam.orthographic, None);
        assert_eq!(cam.frustum_far, 5000.0);
        assert_eq!(cam.num_screen_textures, None);
    }
}
