//! Field-level wire primitives.
//!
//! All multi-byte scalars are little-endian.
//!
//! ```text
//! presence_flag  := 1 byte; 0 = absent, 1 = present
//! len_prefixed   := length:2  presence_flag  [length bytes if present]
//! ```
//!
//! [`FieldCursor`] re-checks the remaining length before every read and
//! never advances on failure, so a failed read leaves the cursor exactly
//! where it was. Decoding stops at the first error; nothing downstream of
//! a failed read runs.

use crate::error::{DecodeError, EncodeError};

/// Presence flag: the optional field follows.
pub const FIELD_PRESENT: u8 = 1;
/// Presence flag: the optional field is absent.
pub const FIELD_NOT_PRESENT: u8 = 0;

/// A value with a fixed wire shape that can be read from a cursor and
/// written back with a writer.
pub trait WireField<'a>: Sized {
    fn decode(cur: &mut FieldCursor<'a>) -> Result<Self, DecodeError>;
    fn encode(&self, w: &mut FieldWriter<'_>) -> Result<(), EncodeError>;
}

// ── Reader ────────────────────────────────────────────────────

/// Bounds-checked forward cursor over a received buffer.
#[derive(Debug, Clone)]
pub struct FieldCursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> FieldCursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Fail unless at least `n` bytes remain.
    pub fn ensure(&self, n: usize) -> Result<(), DecodeError> {
        let remaining = self.remaining();
        if remaining < n {
            return Err(DecodeError::Truncated {
                needed: n,
                remaining,
            });
        }
        Ok(())
    }

    /// Borrow the next `n` bytes and advance past them.
    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        self.ensure(n)?;
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), DecodeError> {
        self.bytes(n).map(|_| ())
    }

    pub fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.bytes(1)?[0])
    }

    pub fn i8(&mut self) -> Result<i8, DecodeError> {
        Ok(self.u8()? as i8)
    }

    pub fn u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    pub fn u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    /// Read a presence flag. Anything other than 0/1 is rejected and the
    /// cursor does not move.
    pub fn presence(&mut self) -> Result<bool, DecodeError> {
        self.ensure(1)?;
        match self.buf[self.pos] {
            FIELD_NOT_PRESENT => {
                self.pos += 1;
                Ok(false)
            }
            FIELD_PRESENT => {
                self.pos += 1;
                Ok(true)
            }
            other => Err(DecodeError::InvalidPresence(other)),
        }
    }

    /// Read `presence [T]`.
    pub fn optional<T: WireField<'a>>(&mut self) -> Result<Option<T>, DecodeError> {
        self.optional_with(T::decode)
    }

    /// Read `presence [f(cursor)]`.
    pub fn optional_with<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, DecodeError>,
    ) -> Result<Option<T>, DecodeError> {
        if self.presence()? { f(self).map(Some) } else { Ok(None) }
    }

    /// Read `presence [bytes(len)]` where `len` was declared earlier.
    pub fn optional_bytes(&mut self, len: usize) -> Result<Option<&'a [u8]>, DecodeError> {
        if self.presence()? {
            self.bytes(len).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Read `length:2 presence [length bytes]`.
    ///
    /// Returns the declared length even when the data is absent.
    pub fn len_prefixed(&mut self) -> Result<(u16, Option<&'a [u8]>), DecodeError> {
        let len = self.u16()?;
        let data = self.optional_bytes(len as usize)?;
        Ok((len, data))
    }

    /// Read a `u8` count and check it against a preallocated capacity.
    pub fn count(&mut self, capacity: usize) -> Result<usize, DecodeError> {
        let declared = self.u8()? as usize;
        if declared > capacity {
            return Err(DecodeError::CountExceeded { declared, capacity });
        }
        Ok(declared)
    }

    /// The frame must have been consumed exactly.
    pub fn finish(&self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(DecodeError::TrailingBytes(n)),
        }
    }
}

// ── Writer ────────────────────────────────────────────────────

/// Forward writer into a fixed output buffer.
#[derive(Debug)]
pub struct FieldWriter<'b> {
    buf: &'b mut [u8],
    pos: usize,
}

impl<'b> FieldWriter<'b> {
    pub fn new(buf: &'b mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos == 0
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn bytes(&mut self, data: &[u8]) -> Result<(), EncodeError> {
        let remaining = self.remaining();
        if remaining < data.len() {
            return Err(EncodeError::BufferFull {
                needed: data.len(),
                remaining,
            });
        }
        self.buf[self.pos..self.pos + data.len()].copy_from_slice(data);
        self.pos += data.len();
        Ok(())
    }

    pub fn u8(&mut self, v: u8) -> Result<(), EncodeError> {
        self.bytes(&[v])
    }

    pub fn i8(&mut self, v: i8) -> Result<(), EncodeError> {
        self.u8(v as u8)
    }

    pub fn u16(&mut self, v: u16) -> Result<(), EncodeError> {
        self.bytes(&v.to_le_bytes())
    }

    pub fn u32(&mut self, v: u32) -> Result<(), EncodeError> {
        self.bytes(&v.to_le_bytes())
    }

    pub fn presence(&mut self, present: bool) -> Result<(), EncodeError> {
        self.u8(if present {
            FIELD_PRESENT
        } else {
            FIELD_NOT_PRESENT
        })
    }

    pub fn optional<'a, T: WireField<'a>>(&mut self, v: Option<&T>) -> Result<(), EncodeError> {
        self.presence(v.is_some())?;
        match v {
            Some(v) => v.encode(self),
            None => Ok(()),
        }
    }

    pub fn optional_bytes(&mut self, data: Option<&[u8]>) -> Result<(), EncodeError> {
        self.presence(data.is_some())?;
        match data {
            Some(d) => self.bytes(d),
            None => Ok(()),
        }
    }

    /// Write `length:2 presence [data]`. With data present the declared
    /// length is the data length.
    pub fn len_prefixed(&mut self, len: u16, data: Option<&[u8]>) -> Result<(), EncodeError> {
        let len = data.map_or(len, |d| d.len() as u16);
        self.u16(len)?;
        self.optional_bytes(data)
    }
}
