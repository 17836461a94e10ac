//! Version-aware reading of record fields.

use nifrost_common::{bounded_capacity, decode_latin1, ByteCursor};

use crate::error::ReferenceKind;
use crate::gate::{v, Gate};
use crate::reference::Reference;
use crate::version::{Version, VersionContext};
use crate::{Error, Result};

/// Marks an absent entry in the header string table.
const NO_STRING: u32 = 0xFFFF_FFFF;

/// A value with a fixed on-disk layout for a given version context.
pub trait NifRead: Sized {
    fn read(r: &mut NifReader<'_, '_>) -> Result<Self>;
}

/// A [`ByteCursor`] paired with the document state needed to decode fields.
///
/// Besides reading, the reader collects every block link it decodes so the
/// table can validate them once the block count is final.
pub struct NifReader<'r, 'a> {
    cursor: &'r mut ByteCursor<'a>,
    ctx: VersionContext,
    strings: &'r [String],
    links: Vec<Reference>,
}

impl<'r, 'a> NifReader<'r, 'a> {
    pub fn new(cursor: &'r mut ByteCursor<'a>, ctx: VersionContext, strings: &'r [String]) -> Self {
        Self {
            cursor,
            ctx,
            strings,
            links: Vec::new(),
        }
    }

    pub fn ctx(&self) -> &VersionContext {
        &self.ctx
    }

    pub fn version(&self) -> Version {
        self.ctx.version()
    }

    pub fn user_version(&self) -> u32 {
        self.ctx.user_version()
    }

    pub fn user_version_2(&self) -> u32 {
        self.ctx.user_version_2()
    }

    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    /// The underlying cursor, for packed formats read byte by byte.
    pub fn cursor(&mut self) -> &mut ByteCursor<'a> {
        &mut *self.cursor
    }

    /// Whether a gated field is present in this document.
    #[inline]
    pub fn gated(&self, gate: Gate) -> bool {
        gate.matches(&self.ctx)
    }

    /// Read `T` if `gate` holds.
    pub fn read_if<T: NifRead>(&mut self, gate: Gate) -> Result<Option<T>> {
        if self.gated(gate) {
            T::read(self).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Read with `f` if `gate` holds.
    pub fn read_if_with<T>(
        &mut self,
        gate: Gate,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<Option<T>> {
        if self.gated(gate) {
            f(self).map(Some)
        } else {
            Ok(None)
        }
    }

    pub fn read<T: NifRead>(&mut self) -> Result<T> {
        T::read(self)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.cursor.read_u8()?)
    }

    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(self.cursor.read_u16()?)
    }

    pub fn read_i16(&mut self) -> Result<i16> {
        Ok(self.cursor.read_i16()?)
    }

    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(self.cursor.read_u32()?)
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        Ok(self.cursor.read_i32()?)
    }

    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(self.cursor.read_u64()?)
    }

    pub fn read_f32(&mut self) -> Result<f32> {
        Ok(self.cursor.read_f32()?)
    }

    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        Ok(self.cursor.read_bytes(count)?.to_vec())
    }

    /// Booleans are four bytes wide before 4.1.0.1 and one byte after.
    pub fn read_bool(&mut self) -> Result<bool> {
        if self.version() < v::V4_1_0_1 {
            Ok(self.read_u32()? != 0)
        } else {
            Ok(self.read_u8()? != 0)
        }
    }

    /// A u32 element count.
    pub fn read_count(&mut self) -> Result<usize> {
        Ok(self.read_u32()? as usize)
    }

    /// A u16 element count.
    pub fn read_count16(&mut self) -> Result<usize> {
        Ok(self.read_u16()? as usize)
    }

    /// A block link. Recorded for validation.
    pub fn read_ref(&mut self) -> Result<Reference> {
        let link = Reference::new(self.read_i32()?);
        self.links.push(link);
        Ok(link)
    }

    pub fn read_refs(&mut self, count: usize) -> Result<Vec<Reference>> {
        self.read_vec_with(count, Self::read_ref)
    }

    /// A u32 count followed by that many links.
    pub fn read_ref_list(&mut self) -> Result<Vec<Reference>> {
        let count = self.read_count()?;
        self.read_refs(count)
    }

    /// u32 length followed by bytes.
    pub fn read_sized_string(&mut self) -> Result<String> {
        Ok(decode_latin1(self.cursor.read_l32_bytes()?))
    }

    /// u8 length followed by bytes, trailing NULs stripped.
    pub fn read_short_string(&mut self) -> Result<String> {
        let bytes = self.cursor.read_l8_bytes()?;
        Ok(decode_latin1(trim_nul(bytes)))
    }

    /// A string field: inline before 20.1.0.1, a string table index after.
    ///
    /// The absent index yields an empty string.
    pub fn read_string(&mut self) -> Result<String> {
        if self.version() < v::V20_1_0_1 {
            return self.read_sized_string();
        }
        let index = self.read_u32()?;
        if index == NO_STRING {
            return Ok(String::new());
        }
        self.strings
            .get(index as usize)
            .cloned()
            .ok_or_else(|| Error::corrupt(ReferenceKind::String, index, self.strings.len()))
    }

    /// Read `count` values of `T` in order.
    pub fn read_vec<T: NifRead>(&mut self, count: usize) -> Result<Vec<T>> {
        self.read_vec_with(count, T::read)
    }

    /// Read `count` values with `f` in order.
    ///
    /// Capacity is bounded by the remaining input bytes, not the element
    /// count, so a corrupt count fails on EOF rather than on allocation.
    pub fn read_vec_with<T>(
        &mut self,
        count: usize,
        mut f: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut out = Vec::with_capacity(bounded_capacity::<T>(count, self.cursor.remaining()));
        for _ in 0..count {
            out.push(f(self)?);
        }
        Ok(out)
    }

    /// A u32 count followed by that many `T`.
    pub fn read_list<T: NifRead>(&mut self) -> Result<Vec<T>> {
        let count = self.read_count()?;
        self.read_vec(count)
    }

    pub fn read_array<T: NifRead + Copy + Default, const N: usize>(&mut self) -> Result<[T; N]> {
        let mut out = [T::default(); N];
        for slot in &mut out {
            *slot = T::read(self)?;
        }
        Ok(out)
    }

    /// Links collected since the last call.
    pub fn take_links(&mut self) -> Vec<Reference> {
        std::mem::take(&mut self.links)
    }
}

fn trim_nul(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &bytes[..end]
}

macro_rules! primitive {
    ($($ty:ty => $method:ident),* $(,)?) => {
        $(
            impl NifRead for $ty {
                #[inline]
                fn read(r: &mut NifReader<'_, '_>) -> Result<Self> {
                    r.$method()
                }
            }
        )*
    };
}

primitive! {
    u8 => read_u8,
    u16 => read_u16,
    i16 => read_i16,
    u32 => read_u32,
    i32 => read_i32,
    u64 => read_u64,
    f32 => read_f32,
    bool => read_bool,
    Reference => read_ref,
    String => read_string,
}
