//! Primitive decoders: varints and fixed-width values.
//!
//! The free functions work on plain slices and report how many bytes they
//! consumed. The `read_*` methods on [`Cursor`] wrap them and advance the
//! cursor only on success.

use super::cursor::Cursor;
use super::{Tag, MAX_VARINT32_BYTES, MAX_VARINT_BYTES};
use crate::error::{DecodeError, DecodeResult};

/// Decode a varint into 32 bits.
///
/// Only the first five 7-bit groups reach the value; the rest of the bytes
/// (up to ten in total) are skipped as long as they carry the continuation
/// bit. Returns the value and the number of bytes consumed, or `None` if no
/// terminating byte appears within the slice or the ten-byte window.
pub fn decode_varint32(data: &[u8]) -> Option<(u32, usize)> {
    let mut result: u32 = 0;

    for (i, &byte) in data.iter().take(MAX_VARINT_BYTES).enumerate() {
        if i < MAX_VARINT32_BYTES {
            result |= u32::from(byte & 0x7F) << (7 * i);
        }
        if byte & 0x80 == 0 {
            return Some((result, i + 1));
        }
    }

    None
}

/// Decode a varint into a signed 64-bit value.
///
/// Each byte is added at its 7-bit position and the continuation bits are
/// subtracted back out, wrapping on overflow. The result equals the
/// two's-complement reading of the unsigned varint, so negative `int32` and
/// `int64` values encoded as ten bytes come back negative.
pub fn decode_signed_varint(data: &[u8]) -> Option<(i64, usize)> {
    let mut result: i64 = 0;
    let mut extra: i64 = 0;

    for (i, &byte) in data.iter().take(MAX_VARINT_BYTES).enumerate() {
        let shift = (7 * i) as u32;
        let byte = i64::from(byte);
        result = result.wrapping_add(byte.wrapping_shl(shift));
        if byte < 0x80 {
            return Some((result.wrapping_sub(extra), i + 1));
        }
        extra = extra.wrapping_add(0x80_i64.wrapping_shl(shift));
    }

    None
}

impl Cursor<'_> {
    /// Read a field tag.
    ///
    /// Fails with [`DecodeError::TruncatedVarint`] when the cursor is already
    /// exhausted or the tag varint does not terminate.
    pub fn read_tag(&mut self) -> DecodeResult<Tag> {
        let offset = self.position();
        let remaining = self.remaining();

        // single-byte tags cover field numbers 1..=15
        let (raw, consumed) = match remaining.first() {
            None => return Err(DecodeError::truncated_varint(offset)),
            Some(&byte) if byte < 0x80 => (u32::from(byte), 1),
            Some(_) => {
                decode_varint32(remaining).ok_or(DecodeError::truncated_varint(offset))?
            }
        };

        self.advance(consumed);
        Ok(Tag::new(raw))
    }

    /// Read the length prefix of a length-delimited payload.
    ///
    /// Lengths below 0x80 are a single byte. Longer encodings need at least
    /// [`MAX_VARINT_BYTES`] bytes left in the cursor, which any real
    /// multi-byte length does since it announces at least 128 bytes of
    /// payload.
    pub fn read_length(&mut self) -> DecodeResult<u32> {
        let offset = self.position();
        let remaining = self.remaining();

        if let Some(&byte) = remaining.first() {
            if byte < 0x80 {
                self.advance(1);
                return Ok(u32::from(byte));
            }
        }

        if remaining.len() < MAX_VARINT_BYTES {
            return Err(DecodeError::truncated_varint(offset));
        }

        let (length, consumed) =
            decode_varint32(remaining).ok_or(DecodeError::truncated_varint(offset))?;
        self.advance(consumed);
        Ok(length)
    }

    /// Read a varint value as a signed 64-bit integer
    pub fn read_signed_varint(&mut self) -> DecodeResult<i64> {
        let offset = self.position();
        let (value, consumed) = decode_signed_varint(self.remaining())
            .ok_or(DecodeError::truncated_varint(offset))?;
        self.advance(consumed);
        Ok(value)
    }

    /// Read eight little-endian bytes as a signed 64-bit integer
    pub fn read_fixed64(&mut self) -> DecodeResult<i64> {
        let bytes = self.read_array::<8>()?;
        Ok(i64::from_le_bytes(bytes))
    }

    /// Read four little-endian bytes as a signed 32-bit integer, widened
    pub fn read_fixed32(&mut self) -> DecodeResult<i64> {
        let bytes = self.read_array::<4>()?;
        Ok(i64::from(i32::from_le_bytes(bytes)))
    }

    fn read_array<const N: usize>(&mut self) -> DecodeResult<[u8; N]> {
        let offset = self.position();
        let available = self.size();
        self.take(N)
            .and_then(|bytes| bytes.try_into().ok())
            .ok_or(DecodeError::truncated_fixed_width(offset, N, available))
    }
}
