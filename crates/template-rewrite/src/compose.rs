//! File-level composition of template replacements.
//!
//! Each matched template is synthesized and spliced into the file text,
//! working from the highest original start down so earlier offsets stay
//! valid while splicing. Spans are recorded anchored at their original
//! start, then a single forward pass applies the running length delta to
//! put every span and segment into final synthesized coordinates.

use crate::discover::MatchedTemplate;
use crate::segments::build_segments;
use crate::synthesize::synthesize_body;
use span_map::{ReplacementSpan, Span};

/// The composed output for one file: the synthesized document and the
/// replacement spans that map it back, sorted by synthesized start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformRecord {
    pub text: String,
    pub spans: Vec<ReplacementSpan>,
}

impl TransformRecord {
    /// Net length change from original to synthesized text.
    pub fn total_delta(&self) -> i64 {
        self.spans.iter().map(ReplacementSpan::delta).sum()
    }
}

/// Drops templates contained inside an earlier template. A nested template's
/// text rides along verbatim inside the outer replacement's expression, so
/// only the outermost span may own that region of the document.
fn outermost<'a>(templates: &'a [MatchedTemplate]) -> Vec<&'a MatchedTemplate> {
    let mut kept: Vec<&MatchedTemplate> = Vec::with_capacity(templates.len());
    for template in templates {
        if let Some(previous) = kept.last() {
            if template.span.end <= previous.span.end {
                continue;
            }
        }
        kept.push(template);
    }
    kept
}

/// Splices every matched template into `text` and returns the composed
/// record. `templates` must be sorted by original start.
pub fn compose(text: &str, templates: &[MatchedTemplate]) -> TransformRecord {
    let outermost = outermost(templates);

    let mut synthesized = text.to_string();
    let mut spans = Vec::with_capacity(outermost.len());

    for template in outermost.iter().rev() {
        let body = synthesize_body(template);
        let mut segments = build_segments(template, &body);

        let start = u32::from(template.span.start);
        let end = u32::from(template.span.end);
        for segment in &mut segments {
            segment.synthesized = segment.synthesized.shift_by(i64::from(start));
        }

        synthesized.replace_range(start as usize..end as usize, &body.body);

        spans.push(ReplacementSpan {
            original: template.span,
            synthesized: Span::new(start, start + body.body.len() as u32),
            segments,
        });
    }

    spans.sort_by_key(|span| span.synthesized.start);

    let mut cumulative_delta = 0i64;
    for span in &mut spans {
        let own_delta = span.delta();
        span.shift_synthesized(cumulative_delta);
        cumulative_delta += own_delta;
    }

    TransformRecord {
        text: synthesized,
        spans,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NormalizedConfig;
    use crate::discover::discover_templates;
    use camino::Utf8Path;
    use pretty_assertions::assert_eq;

    fn compose_source(source: &str) -> TransformRecord {
        let matched =
            discover_templates(Utf8Path::new("view.ts"), source, &NormalizedConfig::default())
                .expect("parse");
        compose(source, &matched)
    }

    #[test]
    fn test_single_template() {
        let source = "const el = jsx`<p>${value}</p>`;";
        let record = compose_source(source);
        assert_eq!(record.text, "const el = (<p>{value}</p>);");
        assert_eq!(record.spans.len(), 1);

        let span = &record.spans[0];
        assert_eq!(u32::from(span.original.start) as usize, source.find("jsx").unwrap());
        assert_eq!(u32::from(span.original.end) as usize, source.len() - 1);
        assert_eq!(
            u32::from(span.synthesized.start) as usize,
            record.text.find('(').unwrap()
        );
        assert_eq!(
            u32::from(span.synthesized.end) as usize,
            record.text.find(')').unwrap() + 1
        );
        assert_eq!(span.delta(), record.total_delta());
    }

    #[test]
    fn test_two_templates_shift_by_running_delta() {
        let source = "const a = jsx`<br />`;\nconst b = jsx`<p>${x}</p>`;\n";
        let record = compose_source(source);
        assert_eq!(
            record.text,
            "const a = (<br />);\nconst b = (<p>{x}</p>);\n"
        );
        assert_eq!(record.spans.len(), 2);

        let first = &record.spans[0];
        let second = &record.spans[1];
        assert!(first.synthesized.end <= second.synthesized.start);

        // each span's synthesized range holds its own replacement text
        for span in &record.spans {
            let start = u32::from(span.synthesized.start) as usize;
            let end = u32::from(span.synthesized.end) as usize;
            assert!(record.text[start..end].starts_with('('));
            assert!(record.text[start..end].ends_with(')'));
        }

        // the second span's segments moved with the first span's delta
        let expr = second
            .segments
            .iter()
            .find(|seg| seg.has_original_range() && {
                let start = u32::from(seg.original.start) as usize;
                &source[start..start + 1] == "x"
            })
            .expect("expression segment");
        let synth_start = u32::from(expr.synthesized.start) as usize;
        assert_eq!(&record.text[synth_start..synth_start + 1], "x");
    }

    #[test]
    fn test_delta_sum_matches_length_difference() {
        let source = "jsx`<i>${a}</i>`; jsx`<b>${b}</b>`; jsx`<hr />`;";
        let record = compose_source(source);
        assert_eq!(
            record.total_delta(),
            record.text.len() as i64 - source.len() as i64
        );
    }

    #[test]
    fn test_nested_template_is_owned_by_the_outer_span() {
        let source = "const el = jsx`<div>${jsx`<span>${x}</span>`}</div>`;";
        let record = compose_source(source);
        assert_eq!(record.spans.len(), 1);
        // the inner template rides along untransformed inside the braces
        assert_eq!(
            record.text,
            "const el = (<div>{jsx`<span>${x}</span>`}</div>);"
        );
    }

    #[test]
    fn test_no_templates_leaves_text_untouched() {
        let source = "const n = 1;\n";
        let record = compose_source(source);
        assert_eq!(record.text, source);
        assert!(record.spans.is_empty());
    }
}
