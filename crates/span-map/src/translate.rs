//! Bidirectional position translation over a replacement-span table.
//!
//! All functions take the span table of one transformed file, sorted by
//! synthesized start, and work on plain `u32` byte offsets. Translation
//! never fails for synthesized positions (positions outside every span are
//! delta-adjusted); original positions outside every span have no
//! synthesized counterpart and yield `None`.

use crate::{Fallback, ReplacementSpan, Segment};

/// Subtracts the cumulative length delta of every span that ends at or
/// before `pos`, flooring at zero.
///
/// This keeps positions outside any rewritten region stable: text between
/// templates only drifts by the net growth of the templates before it.
pub fn adjust_for_earlier_spans(spans: &[ReplacementSpan], pos: u32) -> u32 {
    let mut delta: i64 = 0;
    for span in spans {
        if u32::from(span.synthesized.end) > pos {
            break;
        }
        delta += span.delta();
    }
    (i64::from(pos) - delta).max(0) as u32
}

/// Maps a synthesized position to its original position.
pub fn to_original(spans: &[ReplacementSpan], pos: u32) -> u32 {
    let Some(span) = spans.iter().find(|s| s.contains_synthesized(pos)) else {
        return adjust_for_earlier_spans(spans, pos);
    };

    if let Some(segment) = span
        .segments
        .iter()
        .find(|s| s.synthesized.contains_inclusive(pos))
    {
        let offset_in_segment = pos - u32::from(segment.synthesized.start);
        let original_len = segment.original.len();
        // clamp into the original range; zero-width anchors collapse to
        // their anchor offset
        let mapped_offset = offset_in_segment.min(original_len.saturating_sub(1));
        return u32::from(segment.original.start) + mapped_offset;
    }

    u32::from(span.original.start) + (pos - u32::from(span.synthesized.start))
}

/// Maps an original position to its synthesized position.
///
/// Returns `None` when the position is not inside any rewritten template;
/// such positions have no synthesized counterpart worth querying.
pub fn to_synthesized(spans: &[ReplacementSpan], pos: u32) -> Option<u32> {
    let span = spans.iter().find(|s| s.contains_original(pos))?;

    for segment in &span.segments {
        let o_start = u32::from(segment.original.start);
        let o_end = u32::from(segment.original.end);
        if pos >= o_start && pos <= o_end {
            let offset = (pos - o_start).min(o_end - o_start);
            return Some(u32::from(segment.synthesized.start) + offset);
        }
    }

    Some(u32::from(span.synthesized.start) + (pos - u32::from(span.original.start)))
}

/// Maps a synthesized span back to original coordinates by translating both
/// endpoints. The result never has a negative length.
pub fn span_to_original(spans: &[ReplacementSpan], span: crate::Span) -> crate::Span {
    let start = to_original(spans, u32::from(span.start));
    let end = to_original(spans, u32::from(span.end));
    crate::Span::new(start, end.max(start))
}

/// Walks away from `start_idx` in the given direction and returns the index
/// of the first segment matching the predicate.
pub fn find_segment_from(
    span: &ReplacementSpan,
    start_idx: usize,
    direction: Fallback,
    predicate: impl Fn(&Segment) -> bool,
) -> Option<usize> {
    match direction {
        Fallback::Next => {
            (start_idx + 1..span.segments.len()).find(|&i| predicate(&span.segments[i]))
        }
        Fallback::Previous => (0..start_idx).rev().find(|&i| predicate(&span.segments[i])),
    }
}

/// Resolves a segment index to one with a real original range, following the
/// segment's fallback direction when it is a zero-width synthetic anchor.
///
/// Returns the index unchanged when the segment already has a real range,
/// and `None` when no neighboring segment in the fallback direction has one.
pub fn resolve_fallback(span: &ReplacementSpan, idx: usize) -> Option<usize> {
    let segment = span.segments.get(idx)?;
    if segment.has_original_range() {
        return Some(idx);
    }
    let direction = segment.fallback?;
    find_segment_from(span, idx, direction, Segment::has_original_range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SegmentKind, Span};
    use pretty_assertions::assert_eq;

    /// Span table for `const a = jsx`<p x=${v}>t</p>`;` rewritten to
    /// `const a = (<p x={v}>t</p>);`. The template occupies original
    /// [10, 30) and synthesized [10, 26).
    fn fixture() -> Vec<ReplacementSpan> {
        let seg = |kind, r: (u32, u32), o: (u32, u32), fallback| Segment {
            kind,
            synthesized: Span::new(r.0, r.1),
            original: Span::new(o.0, o.1),
            fallback,
        };
        vec![ReplacementSpan {
            original: Span::new(10u32, 30u32),
            synthesized: Span::new(10u32, 26u32),
            segments: vec![
                seg(SegmentKind::Inserted, (10, 11), (10, 11), None),
                seg(SegmentKind::Literal, (11, 16), (14, 19), None),
                seg(SegmentKind::Inserted, (16, 17), (21, 21), Some(Fallback::Next)),
                seg(SegmentKind::Expression, (17, 18), (21, 22), None),
                seg(SegmentKind::Inserted, (18, 19), (22, 22), Some(Fallback::Previous)),
                seg(SegmentKind::Literal, (19, 25), (23, 29), None),
                seg(SegmentKind::Inserted, (25, 26), (29, 30), None),
            ],
        }]
    }

    #[test]
    fn test_positions_before_any_span_are_stable() {
        let spans = fixture();
        assert_eq!(to_original(&spans, 0), 0);
        assert_eq!(to_original(&spans, 9), 9);
    }

    #[test]
    fn test_positions_after_a_span_subtract_its_delta() {
        let spans = fixture();
        // the template shrank by 4 bytes, so positions past its end map 4
        // bytes later in the original
        assert_eq!(adjust_for_earlier_spans(&spans, 27), 31);
        assert_eq!(to_original(&spans, 30), 34);
    }

    #[test]
    fn test_expression_position_maps_exactly() {
        let spans = fixture();
        // `v` sits at synthesized 17, original 21
        assert_eq!(to_original(&spans, 17), 21);
        assert_eq!(to_synthesized(&spans, 21), Some(16));
    }

    #[test]
    fn test_literal_interior_maps_exactly() {
        let spans = fixture();
        // inside `<p x=`: synthesized 12 is original 15
        assert_eq!(to_original(&spans, 12), 15);
        assert_eq!(to_synthesized(&spans, 15), Some(12));
    }

    #[test]
    fn test_segment_end_positions_clamp_to_the_last_original_byte() {
        let spans = fixture();
        // synthesized 25 is the inclusive end of the closing-tag literal, so
        // it resolves there and clamps into the literal's last original byte
        assert_eq!(to_original(&spans, 24), 28);
        assert_eq!(to_original(&spans, 25), 28);
        // past the literal the closing paren collapses to its single byte
        assert_eq!(to_original(&spans, 26), 29);
    }

    #[test]
    fn test_original_position_outside_spans_has_no_mapping() {
        let spans = fixture();
        assert_eq!(to_synthesized(&spans, 5), None);
        assert_eq!(to_synthesized(&spans, 31), None);
    }

    #[test]
    fn test_span_endpoints_translate_together() {
        let spans = fixture();
        // both endpoints translate independently; the end offset resolves
        // into the expression segment (inclusive end) and clamps to its last
        // original byte, so a one-byte synthesized span collapses
        let mapped = span_to_original(&spans, Span::new(17u32, 18u32));
        assert_eq!(mapped, Span::new(21u32, 21u32));
    }

    #[test]
    fn test_fallback_resolution_walks_to_real_segments() {
        let spans = fixture();
        let span = &spans[0];
        // the open-brace anchor (index 2) defers to the expression after it
        assert_eq!(resolve_fallback(span, 2), Some(3));
        // the close-brace anchor (index 4) defers to the expression before it
        assert_eq!(resolve_fallback(span, 4), Some(3));
        // segments with real ranges resolve to themselves
        assert_eq!(resolve_fallback(span, 1), Some(1));
        assert_eq!(resolve_fallback(span, 5), Some(5));
    }

    #[test]
    fn test_find_segment_from_with_predicate() {
        let spans = fixture();
        let span = &spans[0];
        let next_expr = find_segment_from(span, 1, Fallback::Next, |s| {
            s.kind == SegmentKind::Expression && s.has_original_range()
        });
        assert_eq!(next_expr, Some(3));
        let prev_expr = find_segment_from(span, 6, Fallback::Previous, |s| {
            s.kind == SegmentKind::Expression
        });
        assert_eq!(prev_expr, Some(3));
        assert_eq!(
            find_segment_from(span, 4, Fallback::Next, |s| s.kind == SegmentKind::Expression),
            None
        );
    }
}
