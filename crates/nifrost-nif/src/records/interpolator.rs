//! Key-based interpolators: a pose value plus an optional data link.

use crate::compound::{QuatTransform, Vector3};
use crate::reader::{NifRead, NifReader};
use crate::reference::Reference;
use crate::records::base;
use crate::Result;

macro_rules! key_interpolator {
    ($($(#[$doc:meta])* $name:ident($ty:ty))+) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, PartialEq, Default)]
            pub struct $name {
                /// Value used when `data` is absent.
                pub value: $ty,
                pub data: Reference,
            }

            impl NifRead for $name {
                fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
                    Ok(Self {
                        value: r.read()?,
                        data: r.read_ref()?,
                    })
                }
            }

            base!($name => none);
        )+
    };
}

key_interpolator! {
    /// Also read for `BSRotAccumTransfInterpolator`.
    NiTransformInterpolator(QuatTransform)
    NiFloatInterpolator(f32)
    NiPoint3Interpolator(Vector3)
    NiBoolInterpolator(bool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compound::Quaternion;
    use crate::gate::v;
    use crate::testing::{ctx, decode, NifWriter};

    #[test]
    fn test_transform_interpolator_validity_flags() {
        let c = ctx(v::V10_1_0_106, 0, 0);
        let mut w = NifWriter::new(c);
        w.f32s(&[1.0, 2.0, 3.0]).f32s(&[1.0, 0.0, 0.0, 0.0]).f32(1.0);
        w.bool(true).bool(true).bool(false).link(7);
        let (i, rest): (NiTransformInterpolator, _) = decode(&mut w).unwrap();
        assert_eq!(rest, 0);
        assert_eq!(i.value.translation, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(i.value.valid, Some([true, true, false]));
        assert_eq!(i.data, Reference::new(7));

        let c = ctx(v::V20_2_0_7, 12, 83);
        let mut w = NifWriter::new(c);
        w.f32s(&[0.0; 3]).f32s(&[1.0, 0.0, 0.0, 0.0]).f32(1.0).link(-1);
        let (i, rest): (NiTransformInterpolator, _) = decode(&mut w).unwrap();
        assert_eq!(rest, 0);
        assert_eq!(i.value.valid, None);
        assert_eq!(i.value.rotation, Quaternion::default());
        assert!(i.data.index().is_none());
    }

    #[test]
    fn test_scalar_interpolators() {
        let c = ctx(v::V20_2_0_7, 12, 83);
        let mut w = NifWriter::new(c);
        w.f32(0.25).link(3);
        let (f, _): (NiFloatInterpolator, _) = decode(&mut w).unwrap();
        assert_eq!(f.value, 0.25);

        let mut w = NifWriter::new(c);
        w.bool(true).link(-1);
        let (b, rest): (NiBoolInterpolator, _) = decode(&mut w).unwrap();
        assert_eq!(rest, 0);
        assert!(b.value);
    }
}
