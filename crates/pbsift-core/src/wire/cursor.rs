//! Bounds-checked read position over a borrowed byte range.

use std::ops::Range;

/// Read position over a borrowed byte range.
///
/// Positions are absolute offsets into the buffer the cursor was built from,
/// so a cursor over a nested payload still reports offsets that point into
/// the whole input. `position <= limit <= data.len()` holds at all times;
/// a read that would break it fails and leaves the cursor where it was.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    data: &'a [u8],
    position: usize,
    limit: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor over the whole buffer
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            position: 0,
            limit: data.len(),
        }
    }

    /// Creates a cursor over `range` of `data`
    ///
    /// The range is clamped to the buffer, so the cursor invariant holds for
    /// any input.
    pub fn with_range(data: &'a [u8], range: Range<usize>) -> Self {
        let limit = range.end.min(data.len());
        let position = range.start.min(limit);
        Self {
            data,
            position,
            limit,
        }
    }

    /// The whole underlying buffer, independent of the readable range
    pub fn buffer(&self) -> &'a [u8] {
        self.data
    }

    /// Current absolute read offset
    pub fn position(&self) -> usize {
        self.position
    }

    /// Absolute end of the readable range
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of unread bytes
    pub fn size(&self) -> usize {
        self.limit - self.position
    }

    /// True once every byte of the range has been consumed
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.limit
    }

    /// The unread bytes, without advancing
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.position..self.limit]
    }

    /// Returns the next byte without advancing
    pub fn peek(&self) -> Option<u8> {
        self.remaining().first().copied()
    }

    /// Takes the next `n` bytes and advances past them
    pub fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if n > self.size() {
            return None;
        }
        let start = self.position;
        self.position += n;
        Some(&self.data[start..self.position])
    }

    /// Advances past `n` bytes, returning false if fewer remain
    pub fn advance(&mut self, n: usize) -> bool {
        self.take(n).is_some()
    }
}
