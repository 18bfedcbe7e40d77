//! Per-template segment tables.
//!
//! Replays the synthesis plan to assign every byte of the synthesized body a
//! segment: literal chunk text, substituted expressions, and the inserted
//! characters (`(`, `)`, synthetic braces). Segment synthesized ranges are
//! local to the replacement; composition shifts them into final document
//! coordinates.

use crate::discover::MatchedTemplate;
use crate::synthesize::SynthesizedBody;
use span_map::{Fallback, Segment, SegmentKind, Span};

/// Builds the segment table for one template.
///
/// Segments come out contiguous in synthesized order and cover the body
/// exactly. Synthetic braces carry a zero-width anchor at the expression
/// boundary they wrap, with a fallback direction pointing at the expression.
pub fn build_segments(template: &MatchedTemplate, synthesized: &SynthesizedBody) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0u32;

    let mut push = |kind: SegmentKind, width: u32, original: Span, fallback: Option<Fallback>| {
        segments.push(Segment {
            kind,
            synthesized: Span::new(cursor, cursor + width),
            original,
            fallback,
        });
        cursor += width;
    };

    // the opening paren stands in for the first original character
    let start = u32::from(template.span.start);
    let end = u32::from(template.span.end);
    push(
        SegmentKind::Inserted,
        1,
        Span::new(start, start + 1),
        None,
    );

    if let Some(first) = template.chunks.first() {
        push(
            SegmentKind::Literal,
            first.text.len() as u32,
            first.span,
            None,
        );
    }
    for (i, substitution) in template.substitutions.iter().enumerate() {
        let braced = synthesized.substitutions[i].braced;
        let expr_start = u32::from(substitution.span.start);
        let expr_end = u32::from(substitution.span.end);

        if braced {
            push(
                SegmentKind::Inserted,
                1,
                Span::empty(expr_start),
                Some(Fallback::Next),
            );
        }
        push(
            SegmentKind::Expression,
            substitution.text.len() as u32,
            substitution.span,
            None,
        );
        if braced {
            push(
                SegmentKind::Inserted,
                1,
                Span::empty(expr_end),
                Some(Fallback::Previous),
            );
        }
        if let Some(chunk) = template.chunks.get(i + 1) {
            push(
                SegmentKind::Literal,
                chunk.text.len() as u32,
                chunk.span,
                None,
            );
        }
    }

    // the closing paren stands in for the closing backtick
    push(
        SegmentKind::Inserted,
        1,
        Span::new(end - 1, end),
        None,
    );

    segments
}
