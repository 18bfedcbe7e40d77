//! Template body synthesis.
//!
//! Turns a matched template's chunks and substitutions into JSX expression
//! text. Substitutions are wrapped in `{…}` unless the surrounding markup
//! puts them in tag-name position or the author already wrote the braces.

use crate::discover::MatchedTemplate;

/// How one substitution was emitted into the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubstitutionPlan {
    /// Whether synthesis added a `{` `}` pair around the expression.
    pub braced: bool,
}

/// A synthesized template body, parenthesized, plus the per-substitution
/// emission plan the segment builder replays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedBody {
    pub body: String,
    pub substitutions: Vec<SubstitutionPlan>,
}

fn last_non_whitespace(text: &str) -> Option<char> {
    text.chars().rev().find(|c| !c.is_whitespace())
}

fn first_non_whitespace(text: &str) -> Option<char> {
    text.chars().find(|c| !c.is_whitespace())
}

/// Decides whether the substitution between `before` (the body so far) and
/// `after` (the following chunk) needs synthetic braces.
fn needs_braces(before: &str, after: &str) -> bool {
    let prev = last_non_whitespace(before);
    // tag-name position: `<${Tag}` or `</${Tag}`
    let tag_position =
        prev == Some('<') || (prev == Some('/') && before.ends_with("</"));
    if tag_position {
        return false;
    }
    // already braced by the author: `{${expr}}`
    let already_braced = prev == Some('{') && first_non_whitespace(after) == Some('}');
    !already_braced
}

/// Synthesizes the parenthesized JSX body for a matched template.
///
/// A template with no substitutions synthesizes to its single chunk. The
/// chunks around each substitution are appended verbatim; the expression
/// text is appended braced or bare per [`needs_braces`].
pub fn synthesize_body(template: &MatchedTemplate) -> SynthesizedBody {
    let mut body = String::new();
    let mut plans = Vec::with_capacity(template.substitutions.len());

    if let Some(first) = template.chunks.first() {
        body.push_str(&first.text);
    }
    for (i, substitution) in template.substitutions.iter().enumerate() {
        let next_chunk = template
            .chunks
            .get(i + 1)
            .map(|chunk| chunk.text.as_str())
            .unwrap_or("");
        let braced = needs_braces(&body, next_chunk);
        plans.push(SubstitutionPlan { braced });
        if braced {
            body.push('{');
            body.push_str(&substitution.text);
            body.push('}');
        } else {
            body.push_str(&substitution.text);
        }
        body.push_str(next_chunk);
    }

    SynthesizedBody {
        body: format!("({body})"),
        substitutions: plans,
    }
}
