//! Physics tags whose meaning depends on the publisher fork.
//!
//! Oblivion, Fallout 3 and Skyrim share one on-disk slot for collision
//! layers and surface materials but number them differently. The fork is a
//! function of the version pair, so exactly one of the three enumerations is
//! decoded per document.

use crate::gate::v;
use crate::reader::{NifRead, NifReader};
use crate::version::VersionContext;
use crate::{Error, Result};

/// Which physics numbering a document uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HavokFork {
    Oblivion,
    Fallout3,
    Skyrim,
}

impl HavokFork {
    /// Pick the fork for a document, or fail with [`Error::UnknownHavokFork`].
    pub fn detect(ctx: &VersionContext) -> Result<Self> {
        let version = ctx.version();
        let bs = ctx.user_version_2();
        if version <= v::V20_0_0_5 || bs <= 16 {
            return Ok(Self::Oblivion);
        }
        if version >= v::V20_2_0_7 {
            match bs {
                17..=34 => return Ok(Self::Fallout3),
                83..=100 => return Ok(Self::Skyrim),
                _ => {}
            }
        }
        Err(Error::UnknownHavokFork {
            version,
            user_version_2: bs,
        })
    }
}

macro_rules! named_values {
    (
        $(#[$doc:meta])*
        $name:ident($repr:ty) { $($value:ident = $raw:literal),+ $(,)? }
    ) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(pub $repr);

        impl $name {
            $(pub const $value: $name = $name($raw);)+

            /// Symbolic name, if the raw value is a known one.
            pub fn name(self) -> Option<&'static str> {
                match self.0 {
                    $($raw => Some(stringify!($value)),)+
                    _ => None,
                }
            }
        }
    };
}

named_values! {
    OblivionLayer(u8) {
        UNIDENTIFIED = 0, STATIC = 1, ANIM_STATIC = 2, TRANSPARENT = 3, CLUTTER = 4,
        WEAPON = 5, PROJECTILE = 6, SPELL = 7, BIPED = 8, TREES = 9, PROPS = 10,
        WATER = 11, TRIGGER = 12, TERRAIN = 13, TRAP = 14, NONCOLLIDABLE = 15,
        CLOUD_TRAP = 16, GROUND = 17, PORTAL = 18, STAIRS = 19, CHAR_CONTROLLER = 20,
        AVOID_BOX = 21, CAMERA_PICK = 24, ITEM_PICK = 25, LINE_OF_SIGHT = 26,
        PATH_PICK = 27, CUSTOM_PICK_1 = 28, CUSTOM_PICK_2 = 29, SPELL_EXPLOSION = 30,
        DROPPING_PICK = 31,
    }
}

named_values! {
    FalloutLayer(u8) {
        UNIDENTIFIED = 0, STATIC = 1, ANIM_STATIC = 2, TRANSPARENT = 3, CLUTTER = 4,
        WEAPON = 5, PROJECTILE = 6, SPELL = 7, BIPED = 8, TREES = 9, PROPS = 10,
        WATER = 11, TRIGGER = 12, TERRAIN = 13, TRAP = 14, NONCOLLIDABLE = 15,
        CLOUD_TRAP = 16, GROUND = 17, PORTAL = 18, DEBRIS_SMALL = 19, DEBRIS_LARGE = 20,
        ACOUSTIC_SPACE = 21, ACTORZONE = 22, PROJECTILEZONE = 23, GASTRAP = 24,
        SHELLCASING = 25, TRANSPARENT_SMALL = 26, INVISIBLE_WALL = 27,
        TRANSPARENT_SMALL_ANIM = 28, DEADBIP = 29, CHARCONTROLLER = 30, AVOIDBOX = 31,
    }
}

named_values! {
    SkyrimLayer(u8) {
        UNIDENTIFIED = 0, STATIC = 1, ANIMSTATIC = 2, TRANSPARENT = 3, CLUTTER = 4,
        WEAPON = 5, PROJECTILE = 6, SPELL = 7, BIPED = 8, TREES = 9, PROPS = 10,
        WATER = 11, TRIGGER = 12, TERRAIN = 13, TRAP = 14, NONCOLLIDABLE = 15,
        CLOUD_TRAP = 16, GROUND = 17, PORTAL = 18, DEBRIS_SMALL = 19, DEBRIS_LARGE = 20,
        ACOUSTIC_SPACE = 21, ACTORZONE = 22, PROJECTILEZONE = 23, GASTRAP = 24,
        SHELLCASING = 25, TRANSPARENT_SMALL = 26, INVISIBLE_WALL = 27,
        TRANSPARENT_SMALL_ANIM = 28, WARD = 29, CHARCONTROLLER = 30, STAIRHELPER = 31,
        DEADBIP = 32, BIPED_NO_CC = 33, AVOIDBOX = 34, COLLISIONBOX = 35,
        CAMERASPHERE = 36, DOORDETECTION = 37, CONEPROJECTILE = 38, CAMERAPICK = 39,
        ITEMPICK = 40, LINEOFSIGHT = 41, PATHPICK = 42, CUSTOMPICK1 = 43,
        CUSTOMPICK2 = 44, SPELLEXPLOSION = 45, DROPPINGPICK = 46,
    }
}

named_values! {
    OblivionMaterial(u32) {
        STONE = 0, CLOTH = 1, DIRT = 2, GLASS = 3, GRASS = 4, METAL = 5, ORGANIC = 6,
        SKIN = 7, WATER = 8, WOOD = 9, HEAVY_STONE = 10, HEAVY_METAL = 11,
        HEAVY_WOOD = 12, CHAIN = 13, SNOW = 14, STONE_STAIRS = 15, CLOTH_STAIRS = 16,
        DIRT_STAIRS = 17, GLASS_STAIRS = 18, GRASS_STAIRS = 19, METAL_STAIRS = 20,
        ORGANIC_STAIRS = 21, SKIN_STAIRS = 22, WATER_STAIRS = 23, WOOD_STAIRS = 24,
        HEAVY_STONE_STAIRS = 25, HEAVY_METAL_STAIRS = 26, HEAVY_WOOD_STAIRS = 27,
        CHAIN_STAIRS = 28, SNOW_STAIRS = 29, ELEVATOR = 30, RUBBER = 31,
    }
}

named_values! {
    Fallout3Material(u32) {
        STONE = 0, CLOTH = 1, DIRT = 2, GLASS = 3, GRASS = 4, METAL = 5, ORGANIC = 6,
        SKIN = 7, WATER = 8, WOOD = 9, HEAVY_STONE = 10, HEAVY_METAL = 11,
        HEAVY_WOOD = 12, CHAIN = 13, BOTTLECAP = 14, ELEVATOR = 15, HOLLOW_METAL = 16,
        SHEET_METAL = 17, SAND = 18, BROKEN_CONCRETE = 19, VEHICLE_BODY = 20,
        VEHICLE_PART_SOLID = 21, VEHICLE_PART_HOLLOW = 22, BARREL = 23, BOTTLE = 24,
        SODA_CAN = 25, PISTOL = 26, RIFLE = 27, SHOPPING_CART = 28, LUNCHBOX = 29,
        BABY_RATTLE = 30, RUBBER_BALL = 31,
    }
}

named_values! {
    /// Skyrim materials are hashes of the material name.
    SkyrimMaterial(u32) {
        BROKEN_STONE = 131151687, LIGHT = 365420259, SNOW = 398949039,
        GRAVEL = 428587608, BOTTLE = 493553910, WOOD = 500811281, SKIN = 591247106,
        BARREL = 732141076, ICE = 873356572, STAIRS_STONE = 899511101,
        WATER = 1024582599, SOLID_METAL = 1288358971, STAIRS_WOOD = 1461712277,
        MUD = 1486385281, STAIRS_SNOW = 1560365355, HEAVY_STONE = 1570821952,
        GRASS = 1848600814, SAND = 2168343821, HEAVY_METAL = 2229413539,
        DRAGON = 2518321175, ORGANIC = 2974920155, HEAVY_WOOD = 3070783559,
        DIRT = 3106094762, GLASS = 3739830338, STONE = 3741512247, CLOTH = 3839073443,
    }
}

impl Default for OblivionLayer {
    fn default() -> Self {
        Self::STATIC
    }
}

impl Default for FalloutLayer {
    fn default() -> Self {
        Self::STATIC
    }
}

impl Default for SkyrimLayer {
    fn default() -> Self {
        Self::STATIC
    }
}

impl Default for OblivionMaterial {
    fn default() -> Self {
        Self::STONE
    }
}

impl Default for Fallout3Material {
    fn default() -> Self {
        Self::STONE
    }
}

impl Default for SkyrimMaterial {
    fn default() -> Self {
        Self::STONE
    }
}

/// Collision layer, flags and group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HavokFilter {
    pub fork: HavokFork,
    pub oblivion_layer: OblivionLayer,
    pub fallout_layer: FalloutLayer,
    pub skyrim_layer: SkyrimLayer,
    /// Flags in the upper three bits, body part number in the lower five.
    pub flags_and_part: u8,
    pub group: u16,
}

impl NifRead for HavokFilter {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let fork = HavokFork::detect(r.ctx())?;
        let layer = r.read_u8()?;
        let mut filter = Self {
            fork,
            oblivion_layer: OblivionLayer::default(),
            fallout_layer: FalloutLayer::default(),
            skyrim_layer: SkyrimLayer::default(),
            flags_and_part: r.read_u8()?,
            group: r.read_u16()?,
        };
        match fork {
            HavokFork::Oblivion => filter.oblivion_layer = OblivionLayer(layer),
            HavokFork::Fallout3 => filter.fallout_layer = FalloutLayer(layer),
            HavokFork::Skyrim => filter.skyrim_layer = SkyrimLayer(layer),
        }
        Ok(filter)
    }
}

/// Surface material of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HavokMaterial {
    pub fork: HavokFork,
    /// Present up to 10.0.1.2.
    pub unknown: Option<u32>,
    pub oblivion: OblivionMaterial,
    pub fallout3: Fallout3Material,
    pub skyrim: SkyrimMaterial,
}

impl NifRead for HavokMaterial {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        let fork = HavokFork::detect(r.ctx())?;
        let unknown = r.read_if(crate::gate::Gate::until(v::V10_0_1_2))?;
        let raw = r.read_u32()?;
        let mut material = Self {
            fork,
            unknown,
            oblivion: OblivionMaterial::default(),
            fallout3: Fallout3Material::default(),
            skyrim: SkyrimMaterial::default(),
        };
        match fork {
            HavokFork::Oblivion => material.oblivion = OblivionMaterial(raw),
            HavokFork::Fallout3 => material.fallout3 = Fallout3Material(raw),
            HavokFork::Skyrim => material.skyrim = SkyrimMaterial(raw),
        }
        Ok(material)
    }
}

/// `hkWorldObjectCinfo` remnants stored after the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorldObjectInfo {
    pub broad_phase_type: u8,
    pub property_data: u32,
    pub property_size: u32,
    pub property_capacity_and_flags: u32,
}

impl NifRead for WorldObjectInfo {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
        r.cursor().skip(4)?;
        let broad_phase_type = r.read_u8()?;
        r.cursor().skip(3)?;
        Ok(Self {
            broad_phase_type,
            property_data: r.read_u32()?,
            property_size: r.read_u32()?,
            property_capacity_and_flags: r.read_u32()?,
        })
    }
}
