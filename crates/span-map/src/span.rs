//! Span and byte offset types for source positions.

use text_size::TextSize;

/// A byte offset into a source string.
pub type ByteOffset = TextSize;

/// A half-open range `[start, end)` of byte offsets in some document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    /// The start byte offset (inclusive).
    pub start: ByteOffset,
    /// The end byte offset (exclusive).
    pub end: ByteOffset,
}

impl Span {
    /// Creates a new span from start and end byte offsets.
    #[inline]
    pub fn new(start: impl Into<ByteOffset>, end: impl Into<ByteOffset>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Creates an empty span anchored at the given offset.
    #[inline]
    pub fn empty(offset: impl Into<ByteOffset>) -> Self {
        let offset = offset.into();
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Returns the length of this span in bytes.
    #[inline]
    pub fn len(&self) -> u32 {
        u32::from(self.end) - u32::from(self.start)
    }

    /// Returns true if this span is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns true if this span contains the given offset, end exclusive.
    #[inline]
    pub fn contains(&self, offset: u32) -> bool {
        u32::from(self.start) <= offset && offset < u32::from(self.end)
    }

    /// Returns true if this span contains the given offset, end inclusive.
    ///
    /// Position lookups over replacement spans treat the end offset as part
    /// of the span so that a query at the closing delimiter still resolves.
    #[inline]
    pub fn contains_inclusive(&self, offset: u32) -> bool {
        u32::from(self.start) <= offset && offset <= u32::from(self.end)
    }

    /// Returns this span shifted by a signed delta, floored at offset zero.
    #[inline]
    pub fn shift_by(self, delta: i64) -> Span {
        let start = (i64::from(u32::from(self.start)) + delta).max(0) as u32;
        let end = (i64::from(u32::from(self.end)) + delta).max(0) as u32;
        Span::new(start, end)
    }
}
