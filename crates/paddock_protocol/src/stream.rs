//! # Binary Stream
//!
//! Single-pass, little-endian serialization over a fixed byte buffer.
//!
//! ## Design
//!
//! - The writer borrows a caller-owned buffer (no heap allocations)
//! - Numeric values are written with `to_le_bytes`, no padding between fields
//! - `Pod` structures are copied verbatim (the protocol targets little-endian hosts)
//! - Composite types implement [`Encode`]/[`Decode`] and issue their fields in a
//!   fixed order. That order is the wire contract.
//!
//! A failed [`StreamWriter::write`] or [`StreamReader::read`] restores the
//! cursor, so a partially written or partially read composite is never
//! observable.

use bytemuck::{bytes_of, Pod};

use crate::error::{ProtocolError, ProtocolResult};

/// Width of the integer count written in front of strings and sequences.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LengthPrefix {
    /// One byte, up to 255 elements.
    U8,
    /// Two bytes, up to 65535 elements.
    U16,
    /// Four bytes.
    U32,
}

impl LengthPrefix {
    /// Largest length expressible with this prefix.
    #[must_use]
    pub const fn max_len(self) -> usize {
        match self {
            Self::U8 => u8::MAX as usize,
            Self::U16 => u16::MAX as usize,
            Self::U32 => u32::MAX as usize,
        }
    }

    const fn bits(self) -> u32 {
        match self {
            Self::U8 => 8,
            Self::U16 => 16,
            Self::U32 => 32,
        }
    }
}

/// A value with a fixed wire layout.
pub trait Encode {
    /// Writes every field, in wire order.
    ///
    /// # Errors
    ///
    /// Fails with [`ProtocolError::Overflow`] when the buffer is too small.
    fn encode(&self, writer: &mut StreamWriter<'_>) -> ProtocolResult<()>;
}

/// A value that can be read back from its wire layout.
pub trait Decode: Sized {
    /// Reads every field, in wire order.
    ///
    /// # Errors
    ///
    /// Fails with [`ProtocolError::Underflow`] when the buffer is exhausted,
    /// or with a validation error for malformed fields.
    fn decode(reader: &mut StreamReader<'_>) -> ProtocolResult<Self>;
}

/// Sequential writer over a fixed byte buffer.
pub struct StreamWriter<'a> {
    buffer: &'a mut [u8],
    position: usize,
}

impl<'a> StreamWriter<'a> {
    /// Creates a writer positioned at the start of `buffer`.
    #[must_use]
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self { buffer, position: 0 }
    }

    /// Current cursor offset.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Bytes left before the end of the buffer.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.position
    }

    /// Total size of the underlying buffer.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Returns the bytes written so far.
    #[inline]
    #[must_use]
    pub fn written(&self) -> &[u8] {
        &self.buffer[..self.position]
    }

    /// Mutable view of the bytes written so far.
    #[inline]
    pub fn written_mut(&mut self) -> &mut [u8] {
        &mut self.buffer[..self.position]
    }

    /// Re-homes the cursor, typically to patch a header written earlier.
    ///
    /// # Errors
    ///
    /// Rejects offsets beyond the buffer size.
    pub fn seek(&mut self, offset: usize) -> ProtocolResult<()> {
        if offset > self.buffer.len() {
            return Err(ProtocolError::SeekOutOfBounds {
                offset,
                size: self.buffer.len(),
            });
        }
        self.position = offset;
        Ok(())
    }

    /// Appends raw bytes.
    ///
    /// # Errors
    ///
    /// Fails without writing anything if the bytes do not fit.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> ProtocolResult<()> {
        let remaining = self.remaining();
        if bytes.len() > remaining {
            return Err(ProtocolError::Overflow {
                requested: bytes.len(),
                remaining,
            });
        }
        self.buffer[self.position..self.position + bytes.len()].copy_from_slice(bytes);
        self.position += bytes.len();
        Ok(())
    }

    /// Writes an encodable value. On failure the cursor is left where it was.
    ///
    /// # Errors
    ///
    /// Propagates the value's encoding error.
    pub fn write<T: Encode + ?Sized>(&mut self, value: &T) -> ProtocolResult<()> {
        let start = self.position;
        value.encode(self).map_err(|err| {
            self.position = start;
            err
        })
    }

    /// Copies a `Pod` value verbatim.
    ///
    /// # Errors
    ///
    /// Fails without writing anything if the value does not fit.
    #[inline]
    pub fn write_pod<T: Pod>(&mut self, value: &T) -> ProtocolResult<()> {
        self.write_bytes(bytes_of(value))
    }

    /// Writes a length count using the given prefix width.
    ///
    /// # Errors
    ///
    /// Fails if `length` exceeds what the prefix can express.
    #[allow(clippy::cast_possible_truncation)]
    pub fn write_length(&mut self, length: usize, prefix: LengthPrefix) -> ProtocolResult<()> {
        if length > prefix.max_len() {
            return Err(ProtocolError::LengthTooLong {
                length,
                prefix_bits: prefix.bits(),
            });
        }
        // Bounds-checked against the prefix above.
        match prefix {
            LengthPrefix::U8 => self.write(&(length as u8)),
            LengthPrefix::U16 => self.write(&(length as u16)),
            LengthPrefix::U32 => self.write(&(length as u32)),
        }
    }

    /// Writes a length-prefixed UTF-8 string.
    ///
    /// # Errors
    ///
    /// Fails if the string is too long for the prefix or does not fit.
    pub fn write_string(&mut self, value: &str, prefix: LengthPrefix) -> ProtocolResult<()> {
        let start = self.position;
        let result = self
            .write_length(value.len(), prefix)
            .and_then(|()| self.write_bytes(value.as_bytes()));
        if result.is_err() {
            self.position = start;
        }
        result
    }

    /// Writes a counted sequence of encodable values.
    ///
    /// # Errors
    ///
    /// Fails if the sequence is too long for the prefix or does not fit.
    pub fn write_seq<T: Encode>(&mut self, values: &[T], prefix: LengthPrefix) -> ProtocolResult<()> {
        let start = self.position;
        let result = self.write_length(values.len(), prefix).and_then(|()| {
            values.iter().try_for_each(|value| value.encode(self))
        });
        if result.is_err() {
            self.position = start;
        }
        result
    }
}

/// Forward-only reader over a byte buffer.
pub struct StreamReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> StreamReader<'a> {
    /// Creates a reader positioned at the start of `buffer`.
    #[must_use]
    pub const fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, position: 0 }
    }

    /// Current cursor offset.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Bytes left to read.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Re-homes the cursor to a previously valid offset.
    ///
    /// # Errors
    ///
    /// Rejects offsets beyond the buffer size.
    pub fn seek(&mut self, offset: usize) -> ProtocolResult<()> {
        if offset > self.buffer.len() {
            return Err(ProtocolError::SeekOutOfBounds {
                offset,
                size: self.buffer.len(),
            });
        }
        self.position = offset;
        Ok(())
    }

    /// Borrows the next `count` bytes.
    ///
    /// # Errors
    ///
    /// Fails without consuming anything if fewer bytes are left.
    pub fn read_bytes(&mut self, count: usize) -> ProtocolResult<&'a [u8]> {
        let remaining = self.remaining();
        if count > remaining {
            return Err(ProtocolError::Underflow {
                requested: count,
                remaining,
            });
        }
        let slice = &self.buffer[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    /// Reads a fixed-size byte array.
    ///
    /// # Errors
    ///
    /// Fails without consuming anything if fewer bytes are left.
    pub fn read_array<const N: usize>(&mut self) -> ProtocolResult<[u8; N]> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.read_bytes(N)?);
        Ok(array)
    }

    /// Reads a decodable value. On failure the cursor is left where it was.
    ///
    /// # Errors
    ///
    /// Propagates the value's decoding error.
    pub fn read<T: Decode>(&mut self) -> ProtocolResult<T> {
        let start = self.position;
        T::decode(self).map_err(|err| {
            self.position = start;
            err
        })
    }

    /// Reads a `Pod` value copied verbatim.
    ///
    /// # Errors
    ///
    /// Fails without consuming anything if fewer bytes are left.
    pub fn read_pod<T: Pod>(&mut self) -> ProtocolResult<T> {
        let bytes = self.read_bytes(std::mem::size_of::<T>())?;
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    /// Reads a length count of the given prefix width.
    ///
    /// # Errors
    ///
    /// Fails if the prefix cannot be read.
    pub fn read_length(&mut self, prefix: LengthPrefix) -> ProtocolResult<usize> {
        Ok(match prefix {
            LengthPrefix::U8 => usize::from(self.read::<u8>()?),
            LengthPrefix::U16 => usize::from(self.read::<u16>()?),
            LengthPrefix::U32 => self.read::<u32>()? as usize,
        })
    }

    /// Reads a length-prefixed UTF-8 string.
    ///
    /// # Errors
    ///
    /// Fails on underflow or invalid UTF-8, leaving the cursor untouched.
    pub fn read_string(&mut self, prefix: LengthPrefix) -> ProtocolResult<String> {
        let start = self.position;
        let result = self.read_length(prefix).and_then(|length| {
            let bytes = self.read_bytes(length)?;
            std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|_| ProtocolError::InvalidUtf8)
        });
        if result.is_err() {
            self.position = start;
        }
        result
    }

    /// Reads a counted sequence of decodable values.
    ///
    /// # Errors
    ///
    /// Fails on underflow or any element error, leaving the cursor untouched.
    pub fn read_seq<T: Decode>(&mut self, prefix: LengthPrefix) -> ProtocolResult<Vec<T>> {
        let start = self.position;
        let result = self.read_length(prefix).and_then(|count| {
            // Never trust the count for the allocation size.
            let mut values = Vec::with_capacity(count.min(self.remaining()));
            for _ in 0..count {
                values.push(T::decode(self)?);
            }
            Ok(values)
        });
        if result.is_err() {
            self.position = start;
        }
        result
    }
}

macro_rules! impl_numeric {
    ($($ty:ty),*) => {
        $(
            impl Encode for $ty {
                #[inline]
                fn encode(&self, writer: &mut StreamWriter<'_>) -> ProtocolResult<()> {
                    writer.write_bytes(&self.to_le_bytes())
                }
            }

            impl Decode for $ty {
                #[inline]
                fn decode(reader: &mut StreamReader<'_>) -> ProtocolResult<Self> {
                    Ok(<$ty>::from_le_bytes(reader.read_array()?))
                }
            }
        )*
    };
}

impl_numeric!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);

impl Encode for bool {
    fn encode(&self, writer: &mut StreamWriter<'_>) -> ProtocolResult<()> {
        writer.write(&u8::from(*self))
    }
}

impl Decode for bool {
    fn decode(reader: &mut StreamReader<'_>) -> ProtocolResult<Self> {
        Ok(reader.read::<u8>()? != 0)
    }
}

impl Encode for str {
    fn encode(&self, writer: &mut StreamWriter<'_>) -> ProtocolResult<()> {
        writer.write_string(self, LengthPrefix::U16)
    }
}

impl Encode for String {
    fn encode(&self, writer: &mut StreamWriter<'_>) -> ProtocolResult<()> {
        writer.write_string(self, LengthPrefix::U16)
    }
}

impl Decode for String {
    fn decode(reader: &mut StreamReader<'_>) -> ProtocolResult<Self> {
        reader.read_string(LengthPrefix::U16)
    }
}

impl<const N: usize> Encode for [u8; N] {
    fn encode(&self, writer: &mut StreamWriter<'_>) -> ProtocolResult<()> {
        writer.write_bytes(self)
    }
}

impl<const N: usize> Decode for [u8; N] {
    fn decode(reader: &mut StreamReader<'_>) -> ProtocolResult<Self> {
        reader.read_array()
    }
}
