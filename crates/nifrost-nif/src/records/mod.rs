//! Concrete record layouts and the tag-keyed registry that reads them.
//!
//! Each record struct embeds its base field group (`NiObjectNet`,
//! `NiAvObject`, `NiNode`, ...) as its first field. [`RecordData`] is the
//! closed union over every struct, and the registry maps each on-disk type
//! tag to a reader for one of them. Several tags share a struct when their
//! layouts are identical (`NiTriShape` and `NiTriStrips` are both
//! [`NiGeometry`]).

use std::sync::LazyLock;

use hashbrown::HashMap as FastHashMap;

use crate::gate::Gate;
use crate::reader::{NifRead, NifReader};
use crate::version::VersionContext;
use crate::Result;

pub mod bstrishape;
pub mod collision;
pub mod controller;
pub mod effect;
pub mod extra;
pub mod geometry;
pub mod interpolator;
pub mod keyframe;
pub mod node;
pub mod object;
pub mod property;
pub mod sequence;
pub mod shader;
pub mod skin;
pub mod texture;

pub use bstrishape::{BsMeshLodTriShape, BsTriShape};
pub use collision::{
    BhkBlendCollisionObject, BhkBlendController, BhkBoxShape, BhkCapsuleShape,
    BhkCollisionObject, BhkConvexVerticesShape, BhkListShape, BhkMoppBvTreeShape,
    BhkNiTriStripsShape, BhkPackedNiTriStripsShape, BhkRigidBody, BhkSimpleShapePhantom,
    BhkSphereShape, BhkTransformShape, HkPackedNiTriStripsData,
};
pub use controller::{
    NiControllerManager, NiFlipController, NiGeomMorpherController, NiInterpController,
    NiLookAtController, NiMaterialColorController, NiMultiTargetTransformController,
    NiPathController, NiSingleInterpController, NiTextureTransformController, NiTimeController,
    NiUvController,
};
pub use effect::{NiCamera, NiDynamicEffect, NiLight, NiPointLight, NiSpotLight, NiTextureEffect};
pub use extra::{
    BsBehaviorGraphExtraData, BsBound, BsDecalPlacementVectorExtraData, BsFurnitureMarker,
    BsInvMarker, NiBinaryExtraData, NiBooleanExtraData, NiColorExtraData, NiExtraData,
    NiFloatExtraData, NiFloatsExtraData, NiIntegerExtraData, NiIntegersExtraData,
    NiStringExtraData, NiStringsExtraData, NiTextKeyExtraData, NiVectorExtraData,
};
pub use geometry::{
    BsLodTriShape, BsSegmentedTriShape, NiGeometry, NiGeometryData, NiTriShapeData,
    NiTriStripsData,
};
pub use interpolator::{
    NiBoolInterpolator, NiFloatInterpolator, NiPoint3Interpolator, NiTransformInterpolator,
};
pub use keyframe::{
    NiBoolData, NiColorData, NiFloatData, NiKeyframeData, NiMorphData, NiPosData, NiUvData,
    NiVisData,
};
pub use node::{
    BsMultiBoundNode, BsOrderedNode, BsRangeNode, BsTreeNode, NiBillboardNode, NiLodNode,
    NiSortAdjustNode, NiSwitchNode,
};
pub use object::{NiAvObject, NiNode, NiObjectNet};
pub use property::{
    NiAlphaProperty, NiFlagProperty, NiMaterialProperty, NiStencilProperty,
    NiVertexColorProperty, NiZBufferProperty,
};
pub use sequence::{
    BlockNames, ControlledBlock, ControlledNames, NiControllerSequence, NiDefaultAvObjectPalette,
    NiSequence, NiStringPalette,
};
pub use shader::{
    BsEffectShaderProperty, BsLightingShaderProperty, BsShaderNoLightingProperty,
    BsShaderPpLightingProperty, BsShaderTextureSet,
};
pub use skin::{BsDismemberSkinInstance, NiSkinData, NiSkinInstance, NiSkinPartition};
pub use texture::{NiSourceTexture, NiTexturingProperty};

type FxHashMap<K, V> = FastHashMap<K, V, std::hash::BuildHasherDefault<rustc_hash::FxHasher>>;

/// Read-only access to the shared base field groups of a record.
///
/// The defaults chain downwards, so a type that provides `node` gets
/// `av_object` and `object_net` for free.
pub trait ObjectBase {
    fn object_net(&self) -> Option<&NiObjectNet> {
        self.av_object().map(|av| &av.net)
    }

    fn av_object(&self) -> Option<&NiAvObject> {
        self.node().map(|node| &node.av)
    }

    fn node(&self) -> Option<&NiNode> {
        None
    }
}

/// Implements [`ObjectBase`] by pointing at the embedded base group.
macro_rules! base {
    ($($ty:ty),+ => none) => {
        $(impl $crate::records::ObjectBase for $ty {})+
    };
    ($ty:ty => net $(.$field:ident)*) => {
        impl $crate::records::ObjectBase for $ty {
            fn object_net(&self) -> Option<&$crate::records::NiObjectNet> {
                Some(&(*self) $(.$field)*)
            }
        }
    };
    ($ty:ty => av $(.$field:ident)*) => {
        impl $crate::records::ObjectBase for $ty {
            fn av_object(&self) -> Option<&$crate::records::NiAvObject> {
                Some(&(*self) $(.$field)*)
            }
        }
    };
    ($ty:ty => node $(.$field:ident)*) => {
        impl $crate::records::ObjectBase for $ty {
            fn node(&self) -> Option<&$crate::records::NiNode> {
                Some(&(*self) $(.$field)*)
            }
        }
    };
    // Several types sharing one path: peel off the first and recurse.
    ($ty:ty, $($rest:ty),+ => $kind:ident $(.$field:ident)*) => {
        $crate::records::base!($ty => $kind $(.$field)*);
        $crate::records::base!($($rest),+ => $kind $(.$field)*);
    };
}
pub(crate) use base;

/// A concrete record struct that can be pulled back out of [`RecordData`].
pub trait RecordType: ObjectBase + Sized {
    fn from_data(data: &RecordData) -> Option<&Self>;
}

macro_rules! records {
    ($($variant:ident($ty:ty)),+ $(,)?) => {
        /// Every record layout this crate decodes.
        #[derive(Debug, Clone, PartialEq)]
        pub enum RecordData {
            $($variant($ty),)+
        }

        impl RecordData {
            pub fn base(&self) -> &dyn ObjectBase {
                match self {
                    $(Self::$variant(x) => x as &dyn ObjectBase,)+
                }
            }
        }

        $(
            impl From<$ty> for RecordData {
                fn from(x: $ty) -> Self {
                    Self::$variant(x)
                }
            }

            impl RecordType for $ty {
                fn from_data(data: &RecordData) -> Option<&Self> {
                    match data {
                        RecordData::$variant(x) => Some(x),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            }
        )+
    };
}

records! {
    ObjectNet(NiObjectNet),
    Node(NiNode),
    BillboardNode(NiBillboardNode),
    TreeNode(BsTreeNode),
    MultiBoundNode(BsMultiBoundNode),
    SwitchNode(NiSwitchNode),
    LodNode(NiLodNode),
    OrderedNode(BsOrderedNode),
    RangeNode(BsRangeNode),
    SortAdjustNode(NiSortAdjustNode),
    Camera(NiCamera),
    Light(NiLight),
    PointLight(NiPointLight),
    SpotLight(NiSpotLight),
    TextureEffect(NiTextureEffect),
    Geometry(NiGeometry),
    LodTriShape(BsLodTriShape),
    SegmentedTriShape(BsSegmentedTriShape),
    TriShapeData(NiTriShapeData),
    TriStripsData(NiTriStripsData),
    TriShape(BsTriShape),
    MeshLodTriShape(BsMeshLodTriShape),
    SkinInstance(NiSkinInstance),
    DismemberSkinInstance(BsDismemberSkinInstance),
    SkinData(NiSkinData),
    SkinPartition(NiSkinPartition),
    AlphaProperty(NiAlphaProperty),
    MaterialProperty(NiMaterialProperty),
    ZBufferProperty(NiZBufferProperty),
    VertexColorProperty(NiVertexColorProperty),
    FlagProperty(NiFlagProperty),
    StencilProperty(NiStencilProperty),
    TexturingProperty(NiTexturingProperty),
    SourceTexture(NiSourceTexture),
    PpLightingShader(BsShaderPpLightingProperty),
    NoLightingShader(BsShaderNoLightingProperty),
    LightingShader(BsLightingShaderProperty),
    EffectShader(BsEffectShaderProperty),
    ShaderTextureSet(BsShaderTextureSet),
    ExtraData(NiExtraData),
    StringExtraData(NiStringExtraData),
    IntegerExtraData(NiIntegerExtraData),
    FloatExtraData(NiFloatExtraData),
    BooleanExtraData(NiBooleanExtraData),
    BinaryExtraData(NiBinaryExtraData),
    TextKeyExtraData(NiTextKeyExtraData),
    VectorExtraData(NiVectorExtraData),
    ColorExtraData(NiColorExtraData),
    StringsExtraData(NiStringsExtraData),
    IntegersExtraData(NiIntegersExtraData),
    FloatsExtraData(NiFloatsExtraData),
    Bound(BsBound),
    FurnitureMarker(BsFurnitureMarker),
    InvMarker(BsInvMarker),
    BehaviorGraphExtraData(BsBehaviorGraphExtraData),
    DecalPlacementVectorExtraData(BsDecalPlacementVectorExtraData),
    SingleInterpController(NiSingleInterpController),
    MaterialColorController(NiMaterialColorController),
    TextureTransformController(NiTextureTransformController),
    FlipController(NiFlipController),
    GeomMorpherController(NiGeomMorpherController),
    ControllerManager(NiControllerManager),
    MultiTargetTransformController(NiMultiTargetTransformController),
    PathController(NiPathController),
    UvController(NiUvController),
    LookAtController(NiLookAtController),
    Sequence(NiSequence),
    ControllerSequence(NiControllerSequence),
    StringPalette(NiStringPalette),
    DefaultAvObjectPalette(NiDefaultAvObjectPalette),
    TransformInterpolator(NiTransformInterpolator),
    FloatInterpolator(NiFloatInterpolator),
    Point3Interpolator(NiPoint3Interpolator),
    BoolInterpolator(NiBoolInterpolator),
    KeyframeData(NiKeyframeData),
    FloatData(NiFloatData),
    PosData(NiPosData),
    ColorData(NiColorData),
    BoolData(NiBoolData),
    VisData(NiVisData),
    UvData(NiUvData),
    MorphData(NiMorphData),
    CollisionObject(BhkCollisionObject),
    BlendCollisionObject(BhkBlendCollisionObject),
    RigidBody(BhkRigidBody),
    SimpleShapePhantom(BhkSimpleShapePhantom),
    SphereShape(BhkSphereShape),
    BoxShape(BhkBoxShape),
    CapsuleShape(BhkCapsuleShape),
    ConvexVerticesShape(BhkConvexVerticesShape),
    ListShape(BhkListShape),
    TransformShape(BhkTransformShape),
    MoppBvTreeShape(BhkMoppBvTreeShape),
    NiTriStripsShape(BhkNiTriStripsShape),
    PackedNiTriStripsShape(BhkPackedNiTriStripsShape),
    PackedNiTriStripsData(HkPackedNiTriStripsData),
    BlendController(BhkBlendController),
}

base!(NiObjectNet => net);
base!(NiNode => node);

type ReadFn = fn(&mut NifReader<'_, '_>) -> Result<RecordData>;

/// Registry entry for one type tag.
#[derive(Clone, Copy)]
struct Entry {
    read: ReadFn,
    /// Fork layouts this tag is decoded for. Outside it the tag is
    /// reported as unsupported.
    layout: Gate,
}

fn read_as<T: NifRead + Into<RecordData>>(r: &mut NifReader<'_, '_>) -> Result<RecordData> {
    Ok(T::read(r)?.into())
}

static REGISTRY: LazyLock<FxHashMap<&'static str, Entry>> = LazyLock::new(|| {
    let mut map = FxHashMap::default();
    let mut add = |tags: &[&'static str], read: ReadFn, layout: Gate| {
        for tag in tags {
            map.insert(*tag, Entry { read, layout });
        }
    };

    add(&["NiSequenceStreamHelper"], read_as::<NiObjectNet>, Gate::Always);
    add(
        &[
            "NiNode",
            "BSFadeNode",
            "RootCollisionNode",
            "AvoidNode",
            "NiBSAnimationNode",
            "NiBSParticleNode",
            "BSLeafAnimNode",
        ],
        read_as::<NiNode>,
        Gate::Always,
    );
    add(&["NiBillboardNode"], read_as::<NiBillboardNode>, Gate::Always);
    add(&["BSTreeNode"], read_as::<BsTreeNode>, Gate::Always);
    add(&["BSMultiBoundNode"], read_as::<BsMultiBoundNode>, Gate::Always);
    add(&["NiSwitchNode"], read_as::<NiSwitchNode>, Gate::Always);
    add(&["NiLODNode"], read_as::<NiLodNode>, Gate::Always);
    add(&["BSOrderedNode"], read_as::<BsOrderedNode>, Gate::Always);
    add(
        &["BSRangeNode", "BSBlastNode", "BSDamageStage", "BSDebrisNode"],
        read_as::<BsRangeNode>,
        Gate::Always,
    );
    add(&["NiSortAdjustNode"], read_as::<NiSortAdjustNode>, Gate::Always);
    add(&["NiCamera"], read_as::<NiCamera>, Gate::Always);

    add(&["NiAmbientLight", "NiDirectionalLight"], read_as::<NiLight>, Gate::Always);
    add(&["NiPointLight"], read_as::<NiPointLight>, Gate::Always);
    add(&["NiSpotLight"], read_as::<NiSpotLight>, Gate::Always);
    add(&["NiTextureEffect"], read_as::<NiTextureEffect>, Gate::Always);

    add(&["NiTriShape", "NiTriStrips"], read_as::<NiGeometry>, Gate::Always);
    add(&["BSLODTriShape"], read_as::<BsLodTriShape>, Gate::Always);
    add(&["BSSegmentedTriShape"], read_as::<BsSegmentedTriShape>, Gate::Always);
    add(&["NiTriShapeData"], read_as::<NiTriShapeData>, Gate::Always);
    add(&["NiTriStripsData"], read_as::<NiTriStripsData>, Gate::Always);
    add(&["BSTriShape"], read_as::<BsTriShape>, bstrishape::LAYOUT);
    add(&["BSMeshLODTriShape"], read_as::<BsMeshLodTriShape>, bstrishape::LAYOUT);

    add(&["NiSkinInstance"], read_as::<NiSkinInstance>, Gate::Always);
    add(&["BSDismemberSkinInstance"], read_as::<BsDismemberSkinInstance>, Gate::Always);
    add(&["NiSkinData"], read_as::<NiSkinData>, Gate::Always);
    add(&["NiSkinPartition"], read_as::<NiSkinPartition>, skin::PARTITION_LAYOUT);

    add(&["NiAlphaProperty"], read_as::<NiAlphaProperty>, Gate::Always);
    add(&["NiMaterialProperty"], read_as::<NiMaterialProperty>, Gate::Always);
    add(&["NiZBufferProperty"], read_as::<NiZBufferProperty>, Gate::Always);
    add(&["NiVertexColorProperty"], read_as::<NiVertexColorProperty>, Gate::Always);
    add(
        &[
            "NiSpecularProperty",
            "NiWireframeProperty",
            "NiDitherProperty",
            "NiShadeProperty",
        ],
        read_as::<NiFlagProperty>,
        Gate::Always,
    );
    add(&["NiStencilProperty"], read_as::<NiStencilProperty>, Gate::Always);
    add(&["NiTexturingProperty"], read_as::<NiTexturingProperty>, Gate::Always);
    add(&["NiSourceTexture"], read_as::<NiSourceTexture>, Gate::Always);

    add(
        &["BSShaderPPLightingProperty"],
        read_as::<BsShaderPpLightingProperty>,
        shader::LEGACY_LAYOUT,
    );
    add(
        &["BSShaderNoLightingProperty"],
        read_as::<BsShaderNoLightingProperty>,
        shader::LEGACY_LAYOUT,
    );
    add(
        &["BSLightingShaderProperty"],
        read_as::<BsLightingShaderProperty>,
        shader::SKYRIM_LAYOUT,
    );
    add(
        &["BSEffectShaderProperty"],
        read_as::<BsEffectShaderProperty>,
        shader::SKYRIM_LAYOUT,
    );
    add(&["BSShaderTextureSet"], read_as::<BsShaderTextureSet>, Gate::Always);

    add(&["NiExtraData"], read_as::<NiExtraData>, Gate::Always);
    add(&["NiStringExtraData"], read_as::<NiStringExtraData>, Gate::Always);
    add(&["NiIntegerExtraData", "BSXFlags"], read_as::<NiIntegerExtraData>, Gate::Always);
    add(&["NiFloatExtraData"], read_as::<NiFloatExtraData>, Gate::Always);
    add(&["NiBooleanExtraData"], read_as::<NiBooleanExtraData>, Gate::Always);
    add(&["NiBinaryExtraData"], read_as::<NiBinaryExtraData>, Gate::Always);
    add(&["NiTextKeyExtraData"], read_as::<NiTextKeyExtraData>, Gate::Always);
    add(&["NiVectorExtraData"], read_as::<NiVectorExtraData>, Gate::Always);
    add(&["NiColorExtraData"], read_as::<NiColorExtraData>, Gate::Always);
    add(&["NiStringsExtraData"], read_as::<NiStringsExtraData>, Gate::Always);
    add(&["NiIntegersExtraData"], read_as::<NiIntegersExtraData>, Gate::Always);
    add(&["NiFloatsExtraData"], read_as::<NiFloatsExtraData>, Gate::Always);
    add(&["BSBound"], read_as::<BsBound>, Gate::Always);
    add(
        &["BSFurnitureMarker", "BSFurnitureMarkerNode"],
        read_as::<BsFurnitureMarker>,
        Gate::Always,
    );
    add(&["BSInvMarker"], read_as::<BsInvMarker>, Gate::Always);
    add(&["BSBehaviorGraphExtraData"], read_as::<BsBehaviorGraphExtraData>, Gate::Always);
    add(
        &["BSDecalPlacementVectorExtraData"],
        read_as::<BsDecalPlacementVectorExtraData>,
        Gate::Always,
    );

    add(
        &[
            "NiKeyframeController",
            "NiTransformController",
            "NiAlphaController",
            "NiVisController",
        ],
        read_as::<NiSingleInterpController>,
        Gate::Always,
    );
    add(&["NiMaterialColorController"], read_as::<NiMaterialColorController>, Gate::Always);
    add(
        &["NiTextureTransformController"],
        read_as::<NiTextureTransformController>,
        Gate::Always,
    );
    add(&["NiFlipController"], read_as::<NiFlipController>, Gate::Always);
    add(&["NiGeomMorpherController"], read_as::<NiGeomMorpherController>, Gate::Always);
    add(&["NiControllerManager"], read_as::<NiControllerManager>, Gate::Always);
    add(
        &["NiMultiTargetTransformController"],
        read_as::<NiMultiTargetTransformController>,
        Gate::Always,
    );
    add(&["NiPathController"], read_as::<NiPathController>, Gate::Always);
    add(&["NiUVController"], read_as::<NiUvController>, Gate::Always);
    add(&["NiLookAtController"], read_as::<NiLookAtController>, Gate::Always);

    add(&["NiSequence"], read_as::<NiSequence>, Gate::Always);
    add(&["NiControllerSequence"], read_as::<NiControllerSequence>, Gate::Always);
    add(&["NiStringPalette"], read_as::<NiStringPalette>, Gate::Always);
    add(&["NiDefaultAVObjectPalette"], read_as::<NiDefaultAvObjectPalette>, Gate::Always);

    add(
        &["NiTransformInterpolator", "BSRotAccumTransfInterpolator"],
        read_as::<NiTransformInterpolator>,
        Gate::Always,
    );
    add(&["NiFloatInterpolator"], read_as::<NiFloatInterpolator>, Gate::Always);
    add(&["NiPoint3Interpolator"], read_as::<NiPoint3Interpolator>, Gate::Always);
    add(
        &["NiBoolInterpolator", "NiBoolTimelineInterpolator"],
        read_as::<NiBoolInterpolator>,
        Gate::Always,
    );

    add(&["NiKeyframeData", "NiTransformData"], read_as::<NiKeyframeData>, Gate::Always);
    add(&["NiFloatData"], read_as::<NiFloatData>, Gate::Always);
    add(&["NiPosData"], read_as::<NiPosData>, Gate::Always);
    add(&["NiColorData"], read_as::<NiColorData>, Gate::Always);
    add(&["NiBoolData"], read_as::<NiBoolData>, Gate::Always);
    add(&["NiVisData"], read_as::<NiVisData>, Gate::Always);
    add(&["NiUVData"], read_as::<NiUvData>, Gate::Always);
    add(&["NiMorphData"], read_as::<NiMorphData>, Gate::Always);

    add(
        &["bhkCollisionObject", "bhkSPCollisionObject"],
        read_as::<BhkCollisionObject>,
        Gate::Always,
    );
    add(&["bhkBlendCollisionObject"], read_as::<BhkBlendCollisionObject>, Gate::Always);
    add(&["bhkRigidBody", "bhkRigidBodyT"], read_as::<BhkRigidBody>, collision::RIGID_BODY_LAYOUT);
    add(&["bhkSimpleShapePhantom"], read_as::<BhkSimpleShapePhantom>, Gate::Always);
    add(&["bhkSphereShape"], read_as::<BhkSphereShape>, Gate::Always);
    add(&["bhkBoxShape"], read_as::<BhkBoxShape>, Gate::Always);
    add(&["bhkCapsuleShape"], read_as::<BhkCapsuleShape>, Gate::Always);
    add(&["bhkConvexVerticesShape"], read_as::<BhkConvexVerticesShape>, Gate::Always);
    add(&["bhkListShape"], read_as::<BhkListShape>, Gate::Always);
    add(
        &["bhkTransformShape", "bhkConvexTransformShape"],
        read_as::<BhkTransformShape>,
        Gate::Always,
    );
    add(&["bhkMoppBvTreeShape"], read_as::<BhkMoppBvTreeShape>, Gate::Always);
    add(&["bhkNiTriStripsShape"], read_as::<BhkNiTriStripsShape>, Gate::Always);
    add(&["bhkPackedNiTriStripsShape"], read_as::<BhkPackedNiTriStripsShape>, Gate::Always);
    add(&["hkPackedNiTriStripsData"], read_as::<HkPackedNiTriStripsData>, Gate::Always);
    add(&["bhkBlendController"], read_as::<BhkBlendController>, Gate::Always);

    map
});

/// Outcome of looking up a type tag for a document.
pub(crate) enum Lookup {
    /// A reader for this tag's layout in this document.
    Supported(&'static str, ReadFn),
    /// Known tag whose layout for this fork is not decoded.
    OtherFork,
    Unknown,
}

pub(crate) fn lookup(tag: &str, ctx: &VersionContext) -> Lookup {
    match REGISTRY.get_key_value(tag) {
        Some((key, entry)) if entry.layout.matches(ctx) => Lookup::Supported(key, entry.read),
        Some(_) => Lookup::OtherFork,
        None => Lookup::Unknown,
    }
}

/// Whether `tag` names a record this crate can decode for some fork.
pub fn is_known(tag: &str) -> bool {
    REGISTRY.contains_key(tag)
}

/// Every registered type tag, sorted.
pub fn known_types() -> Vec<&'static str> {
    let mut tags: Vec<_> = REGISTRY.keys().copied().collect();
    tags.sort_unstable();
    tags
}

/// One decoded block.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    kind: &'static str,
    data: RecordData,
}

impl Record {
    pub(crate) fn new(kind: &'static str, data: RecordData) -> Self {
        Self { kind, data }
    }

    /// The on-disk type tag, e.g. `"BSFadeNode"`.
    pub fn kind(&self) -> &str {
        self.kind
    }

    pub fn data(&self) -> &RecordData {
        &self.data
    }

    pub fn downcast<T: RecordType>(&self) -> Option<&T> {
        T::from_data(&self.data)
    }

    pub fn object_net(&self) -> Option<&NiObjectNet> {
        self.data.base().object_net()
    }

    pub fn av_object(&self) -> Option<&NiAvObject> {
        self.data.base().av_object()
    }

    pub fn node(&self) -> Option<&NiNode> {
        self.data.base().node()
    }

    /// The record's name, for records that carry one.
    pub fn name(&self) -> Option<&str> {
        match &self.data {
            RecordData::Sequence(s) => Some(s.name.as_str()),
            RecordData::ControllerSequence(s) => Some(s.sequence.name.as_str()),
            data => data
                .base()
                .object_net()
                .map(|net| net.name.as_str())
                .or_else(|| extra::name_of(data)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Reference;
    use crate::gate::v;
    use crate::testing::{ctx, NifWriter};
    use nifrost_common::ByteCursor;

    #[test]
    fn test_lookup_by_fork() {
        let sky = ctx(v::V20_2_0_7, 12, 83);
        let fo4 = ctx(v::V20_2_0_7, 12, 130);

        assert!(matches!(lookup("BSFadeNode", &sky), Lookup::Supported("BSFadeNode", _)));
        assert!(matches!(lookup("BSLightingShaderProperty", &sky), Lookup::Supported(..)));
        assert!(matches!(lookup("BSLightingShaderProperty", &fo4), Lookup::OtherFork));
        assert!(matches!(lookup("BSTriShape", &sky), Lookup::OtherFork));
        assert!(matches!(lookup("BSTriShape", &fo4), Lookup::Supported(..)));
        assert!(matches!(lookup("NiMadeUpThing", &sky), Lookup::Unknown));
    }

    #[test]
    fn test_known_types_sorted_and_complete() {
        let tags = known_types();
        assert!(tags.windows(2).all(|w| w[0] < w[1]));
        for tag in ["NiNode", "bhkRigidBodyT", "BSXFlags", "NiControllerSequence"] {
            assert!(is_known(tag), "{tag}");
        }
        assert!(!is_known("NiPSysData"));
    }

    #[test]
    fn test_record_accessors_and_downcast() {
        let c = ctx(v::V20_0_0_5, 11, 11);
        let mut w = NifWriter::new(c);
        object::tests::write_node(&mut w, c, "Bip01", &[3]);
        let bytes = w.finish();
        let mut cursor = ByteCursor::new(&bytes);
        let mut r = NifReader::new(&mut cursor, c, &[]);
        let Lookup::Supported(kind, read) = lookup("BSFadeNode", &c) else {
            panic!("BSFadeNode is registered");
        };
        let record = Record::new(kind, read(&mut r).unwrap());

        assert_eq!(record.kind(), "BSFadeNode");
        assert_eq!(record.name(), Some("Bip01"));
        assert!(record.downcast::<NiNode>().is_some());
        assert!(record.downcast::<NiTriShapeData>().is_none());
        assert_eq!(record.node().map(|n| n.children.len()), Some(1));
        assert_eq!(record.av_object().map(|a| a.scale), Some(1.0));
    }

    #[test]
    fn test_base_accessors_follow_embedded_paths() {
        let mut spot = NiSpotLight::default();
        spot.point.light.effect.av.net.name = "Spot".into();
        assert_eq!(spot.object_net().map(|n| n.name.as_str()), Some("Spot"));
        assert!(spot.node().is_none());

        let mut light = NiLight::default();
        light.effect.av.scale = 2.0;
        assert_eq!(light.av_object().map(|a| a.scale), Some(2.0));

        let mut camera = NiCamera::default();
        camera.av.flags = 8;
        assert_eq!(camera.av_object().map(|a| a.flags), Some(8));

        let mut lod = NiLodNode::default();
        lod.switch.node.children.push(Reference::new(4));
        assert_eq!(lod.node().map(|n| n.children.len()), Some(1));
        assert!(lod.object_net().is_some());

        let mut stencil = NiStencilProperty::default();
        stencil.net.name = "Stencil".into();
        assert_eq!(stencil.object_net().map(|n| n.name.as_str()), Some("Stencil"));
        assert!(stencil.av_object().is_none());

        let mut shader = BsShaderNoLightingProperty::default();
        shader.shader.net.name = "Glow".into();
        assert_eq!(shader.object_net().map(|n| n.name.as_str()), Some("Glow"));

        assert!(NiTriShapeData::default().object_net().is_none());
    }
}
