//! Segment and replacement-span records produced by template rewriting.

use crate::Span;

/// What a stretch of synthesized text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// A template literal chunk, copied verbatim.
    Literal,
    /// An author-written substitution expression.
    Expression,
    /// A synthetic character added by synthesis (a wrapping parenthesis or
    /// an auto-inserted brace).
    Inserted,
}

/// Which neighboring segment a zero-width synthetic segment defers to when
/// a position lands on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Walk toward earlier segments.
    Previous,
    /// Walk toward later segments.
    Next,
}

/// The atomic unit of the rewrite mapping table.
///
/// Every segment carries both a synthesized range and an original range.
/// Synthetic delimiter characters with no author-written counterpart use a
/// zero-width original span as an anchor and name a [`Fallback`] direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    /// Range in the synthesized document, final composed coordinates.
    pub synthesized: Span,
    /// Range in the original document.
    pub original: Span,
    /// Set on zero-width synthetic segments only.
    pub fallback: Option<Fallback>,
}

impl Segment {
    /// Whether this segment maps to actual original text rather than to a
    /// zero-width anchor position.
    #[inline]
    pub fn has_original_range(&self) -> bool {
        !self.original.is_empty()
    }
}

/// One rewritten template's full record: its original range, its range in
/// the composed synthesized document, and the ordered segment table.
///
/// Segments are contiguous and gapless in synthesized coordinates and
/// collectively cover `synthesized`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementSpan {
    /// The tagged template expression in the original text.
    pub original: Span,
    /// The parenthesized JSX expression in the synthesized text.
    pub synthesized: Span,
    /// Segments ordered by synthesized start.
    pub segments: Vec<Segment>,
}

impl ReplacementSpan {
    /// Synthesized length minus original length.
    #[inline]
    pub fn delta(&self) -> i64 {
        i64::from(self.synthesized.len()) - i64::from(self.original.len())
    }

    /// Whether a synthesized position falls inside this span, end inclusive.
    #[inline]
    pub fn contains_synthesized(&self, pos: u32) -> bool {
        self.synthesized.contains_inclusive(pos)
    }

    /// Whether an original position falls inside this span, end inclusive.
    #[inline]
    pub fn contains_original(&self, pos: u32) -> bool {
        self.original.contains_inclusive(pos)
    }

    /// Shifts the synthesized range of the span and of every segment.
    /// Original ranges are left untouched.
    pub fn shift_synthesized(&mut self, delta: i64) {
        if delta == 0 {
            return;
        }
        self.synthesized = self.synthesized.shift_by(delta);
        for segment in &mut self.segments {
            segment.synthesized = segment.synthesized.shift_by(delta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchor_segment_has_no_original_range() {
        let anchor = Segment {
            kind: SegmentKind::Inserted,
            synthesized: Span::new(5u32, 6u32),
            original: Span::empty(12u32),
            fallback: Some(Fallback::Next),
        };
        assert!(!anchor.has_original_range());

        let paren = Segment {
            kind: SegmentKind::Inserted,
            synthesized: Span::new(0u32, 1u32),
            original: Span::new(10u32, 11u32),
            fallback: None,
        };
        assert!(paren.has_original_range());
    }

    #[test]
    fn test_shift_moves_span_and_segments() {
        let mut span = ReplacementSpan {
            original: Span::new(10u32, 20u32),
            synthesized: Span::new(10u32, 24u32),
            segments: vec![Segment {
                kind: SegmentKind::Literal,
                synthesized: Span::new(11u32, 23u32),
                original: Span::new(11u32, 19u32),
                fallback: None,
            }],
        };
        span.shift_synthesized(6);
        assert_eq!(span.synthesized, Span::new(16u32, 30u32));
        assert_eq!(span.segments[0].synthesized, Span::new(17u32, 29u32));
        // original coordinates never move
        assert_eq!(span.segments[0].original, Span::new(11u32, 19u32));
        assert_eq!(span.delta(), 4);
    }
}
