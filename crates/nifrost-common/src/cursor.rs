//! Endian-aware binary cursor for parsing byte slices.
//!
//! This module provides [`ByteCursor`], a forward-only reader that borrows
//! the underlying buffer and never reads past its end.

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use half::f16;

use crate::{Error, Result};

/// Byte order used for multi-byte reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Endian {
    /// Least significant byte first.
    #[default]
    Little,
    /// Most significant byte first.
    Big,
}

macro_rules! read_endian {
    ($(#[$doc:meta])* $name:ident, $ty:ty, $size:expr, $read:ident) => {
        $(#[$doc])*
        #[inline]
        pub fn $name(&mut self) -> Result<$ty> {
            let bytes = self.read_bytes($size)?;
            Ok(match self.endian {
                Endian::Little => LittleEndian::$read(bytes),
                Endian::Big => BigEndian::$read(bytes),
            })
        }
    };
}

/// A positioned reader over a byte slice.
///
/// Every read either yields a value or fails with
/// [`Error::UnexpectedEof`]/[`Error::InvalidEncoding`] carrying the offset
/// at which it happened.
///
/// # Example
///
/// ```
/// use nifrost_common::{ByteCursor, Endian};
///
/// let data = [0x01, 0x02, 0x03, 0x04, 0x00, 0x00, 0x80, 0x3F];
/// let mut cursor = ByteCursor::new(&data);
///
/// assert_eq!(cursor.read_u32().unwrap(), 0x04030201);
/// assert_eq!(cursor.read_f32().unwrap(), 1.0);
/// assert!(cursor.is_empty());
///
/// let mut cursor = ByteCursor::with_endian(&data, Endian::Big);
/// assert_eq!(cursor.read_u16().unwrap(), 0x0102);
/// ```
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    position: usize,
    endian: Endian,
}

impl<'a> ByteCursor<'a> {
    /// Create a little-endian cursor at the start of `data`.
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            endian: Endian::Little,
        }
    }

    /// Create a cursor with an explicit byte order.
    #[inline]
    pub const fn with_endian(data: &'a [u8], endian: Endian) -> Self {
        Self {
            data,
            position: 0,
            endian,
        }
    }

    /// Get the current position in the buffer.
    #[inline]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Get the total length of the underlying buffer.
    #[inline]
    pub const fn len(&self) -> usize {
        self.data.len()
    }

    /// Get the number of bytes remaining to read.
    #[inline]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Check if there are no more bytes to read.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.position >= self.data.len()
    }

    /// Current byte order.
    #[inline]
    pub const fn endian(&self) -> Endian {
        self.endian
    }

    /// Switch the byte order used for all following reads.
    #[inline]
    pub fn set_endian(&mut self, endian: Endian) {
        self.endian = endian;
    }

    /// Skip a declared number of bytes.
    ///
    /// Fails without moving if the skip would run past the buffer end.
    pub fn skip(&mut self, count: usize) -> Result<()> {
        self.read_bytes(count).map(|_| ())
    }

    /// Move to an absolute position. Seeking to the buffer end is allowed.
    pub fn seek(&mut self, position: usize) -> Result<()> {
        if position > self.data.len() {
            return Err(Error::UnexpectedEof {
                offset: self.position,
                needed: position.saturating_sub(self.position),
                available: self.remaining(),
            });
        }
        self.position = position;
        Ok(())
    }

    /// Get the remaining bytes as a slice.
    #[inline]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.position.min(self.data.len())..]
    }

    /// Peek at bytes without advancing the position.
    #[inline]
    pub fn peek_bytes(&self, count: usize) -> Result<&'a [u8]> {
        if self.remaining() < count {
            return Err(Error::UnexpectedEof {
                offset: self.position,
                needed: count,
                available: self.remaining(),
            });
        }
        Ok(&self.data[self.position..self.position + count])
    }

    /// Read bytes and advance the position.
    #[inline]
    pub fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        let bytes = self.peek_bytes(count)?;
        self.position += count;
        Ok(bytes)
    }

    /// Read a fixed-size byte array.
    #[inline]
    pub fn read_byte_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    /// Read a single byte.
    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        self.read_bytes(1).map(|b| b[0])
    }

    /// Read a signed byte.
    #[inline]
    pub fn read_i8(&mut self) -> Result<i8> {
        self.read_u8().map(|b| b as i8)
    }

    read_endian!(
        /// Read a u16 in the cursor's byte order.
        read_u16, u16, 2, read_u16
    );
    read_endian!(
        /// Read an i16 in the cursor's byte order.
        read_i16, i16, 2, read_i16
    );
    read_endian!(
        /// Read a u32 in the cursor's byte order.
        read_u32, u32, 4, read_u32
    );
    read_endian!(
        /// Read an i32 in the cursor's byte order.
        read_i32, i32, 4, read_i32
    );
    read_endian!(
        /// Read a u64 in the cursor's byte order.
        read_u64, u64, 8, read_u64
    );
    read_endian!(
        /// Read an i64 in the cursor's byte order.
        read_i64, i64, 8, read_i64
    );
    read_endian!(
        /// Read an IEEE-754 single.
        read_f32, f32, 4, read_f32
    );
    read_endian!(
        /// Read an IEEE-754 double.
        read_f64, f64, 8, read_f64
    );

    /// Read an IEEE-754 half and widen it to `f32`.
    #[inline]
    pub fn read_f16(&mut self) -> Result<f32> {
        self.read_u16().map(|bits| f16::from_bits(bits).to_f32())
    }

    /// Read a byte-quantized unit component, mapping `0..=255` onto `-1.0..=1.0`.
    #[inline]
    pub fn read_norm_byte(&mut self) -> Result<f32> {
        self.read_u8().map(|b| f32::from(b) / 255.0 * 2.0 - 1.0)
    }

    /// Read a byte-quantized normal (three [`read_norm_byte`](Self::read_norm_byte) components).
    pub fn read_byte_normal(&mut self) -> Result<[f32; 3]> {
        Ok([
            self.read_norm_byte()?,
            self.read_norm_byte()?,
            self.read_norm_byte()?,
        ])
    }

    /// Read `N` consecutive `f32` values.
    pub fn read_f32_array<const N: usize>(&mut self) -> Result<[f32; N]> {
        let mut out = [0.0f32; N];
        for slot in &mut out {
            *slot = self.read_f32()?;
        }
        Ok(out)
    }

    /// Read a 3x3 matrix stored in a 4x4 slot.
    ///
    /// The upper-left 3x3 block is kept; the last row and column are
    /// replaced by identity.
    pub fn read_matrix33_in_44(&mut self) -> Result<[[f32; 4]; 4]> {
        let raw = self.read_f32_array::<16>()?;
        let mut out = [[0.0f32; 4]; 4];
        for (row, values) in out.iter_mut().enumerate().take(3) {
            values[..3].copy_from_slice(&raw[row * 4..row * 4 + 3]);
        }
        out[3][3] = 1.0;
        Ok(out)
    }

    /// Read a byte string prefixed by a u8 length.
    pub fn read_l8_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u8()? as usize;
        self.read_bytes(len)
    }

    /// Read a byte string prefixed by a u16 length.
    pub fn read_l16_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u16()? as usize;
        self.read_bytes(len)
    }

    /// Read a byte string prefixed by a u32 length.
    pub fn read_l32_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_u32()? as usize;
        self.read_bytes(len)
    }

    /// Read a newline-terminated line of at most `max_len` bytes.
    ///
    /// The newline is consumed but not returned. Fails with
    /// [`Error::InvalidEncoding`] if no newline occurs within the bound.
    pub fn read_line(&mut self, max_len: usize) -> Result<&'a [u8]> {
        let window = &self.remaining_bytes()[..self.remaining().min(max_len)];
        let end = memchr::memchr(b'\n', window).ok_or_else(|| {
            Error::invalid(
                self.position,
                format!("no line terminator within {max_len} bytes"),
            )
        })?;
        let line = &window[..end];
        self.position += end + 1;
        Ok(line)
    }

    /// Read `count` elements with `read`, in order.
    ///
    /// The pre-allocation is bounded by [`bounded_capacity`] so a corrupt
    /// count fails with an EOF instead of exhausting memory.
    pub fn read_array<T>(
        &mut self,
        count: usize,
        mut read: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<Vec<T>> {
        let mut out = Vec::with_capacity(bounded_capacity::<T>(count, self.remaining()));
        for _ in 0..count {
            out.push(read(self)?);
        }
        Ok(out)
    }
}

/// Capacity to reserve for `count` elements of `T` decoded from `remaining`
/// bytes of input.
///
/// The reservation never exceeds `remaining` bytes of memory, whatever
/// the element size.
pub fn bounded_capacity<T>(count: usize, remaining: usize) -> usize {
    count.min(remaining / std::mem::size_of::<T>().max(1))
}

/// Decode bytes as ISO-8859-1, which maps every byte to one `char`.
///
/// NIF strings carry no declared encoding; this mapping is lossless.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}
