//! Relocation of engine results from synthesized to original coordinates.

use crate::engine::{CodeAction, CompletionEntry, Diagnostic, QuickInfo};
use camino::Utf8Path;
use span_map::translate::{adjust_for_earlier_spans, find_segment_from, span_to_original};
use span_map::{Fallback, ReplacementSpan, Segment, SegmentKind};
use template_rewrite::TransformRecord;

/// "Type X is not assignable to type Y". Reported against an attribute
/// name inside literal text even when the offending value is the
/// substituted expression next to it.
pub const ASSIGNABILITY_CODE: u32 = 2322;

/// Deduplication key for a diagnostic: unset positions count as -1 so a
/// positioned diagnostic never collides with an unpositioned twin.
pub fn diagnostic_key(diagnostic: &Diagnostic) -> String {
    let start = diagnostic.start.map_or(-1, i64::from);
    let length = diagnostic.length.map_or(-1, i64::from);
    format!(
        "{}:{}:{}:{}",
        diagnostic.code, start, length, diagnostic.message
    )
}

/// Index of the segment containing `pos` with a strict end bound, unlike
/// position translation which treats segment ends as inclusive.
fn segment_at_strict(span: &ReplacementSpan, pos: u32) -> Option<usize> {
    span.segments
        .iter()
        .position(|s| pos >= u32::from(s.synthesized.start) && pos < u32::from(s.synthesized.end))
}

/// Maps a diagnostic reported against the synthesized text back onto the
/// original text. Diagnostics without a file or start position pass
/// through untouched.
pub fn remap_diagnostic(diagnostic: &Diagnostic, record: &TransformRecord) -> Diagnostic {
    let (Some(_), Some(start)) = (diagnostic.file.as_ref(), diagnostic.start) else {
        return diagnostic.clone();
    };
    let spans = &record.spans;

    let Some(span) = spans.iter().find(|s| s.contains_synthesized(start)) else {
        return Diagnostic {
            start: Some(adjust_for_earlier_spans(spans, start)),
            ..diagnostic.clone()
        };
    };

    let local = start - u32::from(span.synthesized.start);
    let mut seg_idx = segment_at_strict(span, start);

    // zero-width synthetic characters defer to their neighbor
    if let Some(idx) = seg_idx {
        let segment = &span.segments[idx];
        if !segment.has_original_range() {
            if let Some(direction) = segment.fallback {
                if let Some(resolved) =
                    find_segment_from(span, idx, direction, Segment::has_original_range)
                {
                    seg_idx = Some(resolved);
                }
            }
        }
    }

    // assignability errors on an attribute point at the literal holding the
    // attribute name; when the literal tail still carries the `=`, the value
    // under complaint is the next substituted expression
    if let Some(idx) = seg_idx {
        let segment = &span.segments[idx];
        if segment.kind == SegmentKind::Literal && diagnostic.code == ASSIGNABILITY_CODE {
            let r_start = u32::from(segment.synthesized.start) as usize;
            let r_end = u32::from(segment.synthesized.end) as usize;
            // engine-supplied offsets are untrusted; an index off a char
            // boundary must not panic the slice
            let literal_tail = usize::try_from(i64::from(start) - r_start as i64)
                .ok()
                .and_then(|idx| record.text.get(r_start..r_end)?.get(idx..));
            if literal_tail.is_some_and(|tail| tail.contains('=')) {
                if let Some(resolved) = find_segment_from(span, idx, Fallback::Next, |s| {
                    s.kind == SegmentKind::Expression && s.has_original_range()
                }) {
                    seg_idx = Some(resolved);
                }
            }
        }
    }

    let mut mapped_start = u32::from(span.original.start) + local;
    let mut mapped_length = span.original.len().min(diagnostic.length.unwrap_or(1));

    if let Some(segment) = seg_idx.map(|idx| &span.segments[idx]) {
        if segment.has_original_range() {
            let seg_width = segment.synthesized.len();
            let raw_offset = i64::from(start) - i64::from(u32::from(segment.synthesized.start));
            let offset = raw_offset.clamp(0, i64::from(seg_width.saturating_sub(1))) as u32;
            let orig_len = segment.original.len();
            let mapped_offset = offset.min(orig_len.saturating_sub(1));
            mapped_start = u32::from(segment.original.start) + mapped_offset;
            mapped_length = (orig_len - mapped_offset).min(diagnostic.length.unwrap_or(1));
        }
    }

    Diagnostic {
        start: Some(mapped_start),
        length: Some(mapped_length),
        ..diagnostic.clone()
    }
}

/// Relocates completion replacement spans in place. Returns whether
/// anything moved.
pub fn remap_completion_entries(entries: &mut [CompletionEntry], spans: &[ReplacementSpan]) -> bool {
    let mut changed = false;
    for entry in entries {
        if let Some(span) = entry.replacement_span {
            let mapped = span_to_original(spans, span);
            if mapped != span {
                entry.replacement_span = Some(mapped);
                changed = true;
            }
        }
    }
    changed
}

/// Relocates a quick-info span in place. Returns whether it moved.
pub fn remap_quick_info(info: &mut QuickInfo, spans: &[ReplacementSpan]) -> bool {
    let mapped = span_to_original(spans, info.text_span);
    if mapped != info.text_span {
        info.text_span = mapped;
        return true;
    }
    false
}

/// Relocates code-action text edits in place. Only edits targeting the
/// rewritten file move; edits in other files are already in real
/// coordinates.
pub fn remap_code_actions(
    target: &Utf8Path,
    spans: &[ReplacementSpan],
    actions: &mut [CodeAction],
) -> bool {
    let mut changed = false;
    for action in actions {
        for change in &mut action.changes {
            if crate::cache::normalize_path(&change.file) != target {
                continue;
            }
            for text_change in &mut change.text_changes {
                let mapped = span_to_original(spans, text_change.span);
                if mapped != text_change.span {
                    text_change.span = mapped;
                    changed = true;
                }
            }
        }
    }
    changed
}
