//! Template discovery over an SWC syntax tree.
//!
//! Discovery collects every tagged template whose tag is a bare identifier,
//! whether or not the tag is configured: directives can turn any of them
//! into a match. Directive overrides are resolved with a single cursor over
//! the directive list, so a directive applies to the next template(s) it
//! precedes and is then consumed.

use crate::config::{NormalizedConfig, TagMode};
use crate::directives::{extract_mode_directives, ModeDirective};
use camino::Utf8Path;
use smol_str::SmolStr;
use span_map::Span;
use std::sync::Arc;
use swc_common::{BytePos, FileName, SourceMap, Spanned};
use swc_ecma_ast::{Expr, Module, TaggedTpl};
use swc_ecma_parser::{EsSyntax, Parser, StringInput, Syntax, TsSyntax};
use swc_ecma_visit::{Visit, VisitWith};
use thiserror::Error;

/// Discovery errors. The service layer treats all of these as "no
/// transform applies" rather than surfacing them.
#[derive(Debug, Error)]
pub enum DiscoverError {
    /// The source file failed to parse.
    #[error("failed to parse {file}: {message}")]
    Parse { file: String, message: String },
}

/// One literal chunk of a template: the raw source text between delimiters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateChunk {
    pub text: String,
    /// Exact original range of the chunk text, delimiters excluded.
    pub span: Span,
}

/// One substituted expression of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Substitution {
    pub text: String,
    /// Exact original range of the expression.
    pub span: Span,
}

/// A tagged template resolved to a mode and scheduled for synthesis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedTemplate {
    pub tag: SmolStr,
    pub mode: TagMode,
    /// The whole tagged-template expression, tag included.
    pub span: Span,
    /// The n + 1 literal chunks.
    pub chunks: Vec<TemplateChunk>,
    /// The n substitutions interleaved between the chunks.
    pub substitutions: Vec<Substitution>,
}

/// A collected tagged template before mode resolution.
#[derive(Debug, Clone)]
struct Candidate {
    tag: SmolStr,
    span: Span,
    chunks: Vec<TemplateChunk>,
    substitutions: Vec<Substitution>,
}

/// Collects tagged templates with bare-identifier tags.
struct TemplateCollector<'a> {
    text: &'a str,
    base: BytePos,
    candidates: Vec<Candidate>,
}

impl TemplateCollector<'_> {
    fn rel(&self, span: swc_common::Span) -> Span {
        Span::new(span.lo.0 - self.base.0, span.hi.0 - self.base.0)
    }

    fn slice(&self, span: Span) -> String {
        self.text[u32::from(span.start) as usize..u32::from(span.end) as usize].to_string()
    }

    fn collect(&mut self, tag: SmolStr, node: &TaggedTpl) {
        let chunks = node
            .tpl
            .quasis
            .iter()
            .map(|quasi| {
                let span = self.rel(quasi.span);
                TemplateChunk {
                    text: self.slice(span),
                    span,
                }
            })
            .collect();
        let substitutions = node
            .tpl
            .exprs
            .iter()
            .map(|expr| {
                let span = self.rel(expr.span());
                Substitution {
                    text: self.slice(span),
                    span,
                }
            })
            .collect();
        self.candidates.push(Candidate {
            tag,
            span: self.rel(node.span),
            chunks,
            substitutions,
        });
    }
}

impl Visit for TemplateCollector<'_> {
    fn visit_tagged_tpl(&mut self, node: &TaggedTpl) {
        if let Expr::Ident(tag) = node.tag.as_ref() {
            self.collect(SmolStr::new(tag.sym.as_ref()), node);
        }
        node.visit_children_with(self);
    }
}

/// Picks the parser syntax from the file extension, defaulting to
/// TypeScript for unknown extensions.
fn syntax_for(file: &Utf8Path) -> Syntax {
    match file.extension() {
        Some("tsx") => Syntax::Typescript(TsSyntax {
            tsx: true,
            ..Default::default()
        }),
        Some("jsx") => Syntax::Es(EsSyntax {
            jsx: true,
            ..Default::default()
        }),
        Some("js") | Some("mjs") | Some("cjs") => Syntax::Es(EsSyntax::default()),
        _ => Syntax::Typescript(TsSyntax::default()),
    }
}

fn parse_module(file: &Utf8Path, text: &str) -> Result<(Module, BytePos), DiscoverError> {
    let cm: Arc<SourceMap> = Default::default();
    let fm = cm.new_source_file(FileName::Custom(file.to_string()).into(), text.to_string());

    let mut parser = Parser::new(syntax_for(file), StringInput::from(&*fm), None);
    let module = parser.parse_module().map_err(|e| DiscoverError::Parse {
        file: file.to_string(),
        message: format!("{:?}", e),
    })?;

    // the parser recovers from some syntax errors; a file it had to guess
    // at is not a file worth rewriting
    if let Some(error) = parser.take_errors().into_iter().next() {
        return Err(DiscoverError::Parse {
            file: file.to_string(),
            message: format!("{:?}", error),
        });
    }

    Ok((module, fm.start_pos))
}

/// Resolves the directive override for each candidate, in source order.
///
/// A single cursor advances over the sorted directives; the last directive
/// whose end offset is at or before a candidate's start becomes that
/// candidate's override. Directives never apply to code that begins before
/// them, and a consumed directive is not re-applied to later candidates.
fn resolve_overrides(candidates: &[Candidate], directives: &[ModeDirective]) -> Vec<Option<TagMode>> {
    let mut overrides = vec![None; candidates.len()];
    if directives.is_empty() {
        return overrides;
    }

    let mut cursor = 0;
    for (i, candidate) in candidates.iter().enumerate() {
        let start = u32::from(candidate.span.start);
        let mut mode = None;
        while cursor < directives.len() && directives[cursor].end <= start {
            mode = Some(directives[cursor].mode);
            cursor += 1;
        }
        overrides[i] = mode;
        if cursor >= directives.len() {
            break;
        }
    }
    overrides
}

/// Parses a file and returns its matched templates in source order.
///
/// A template matches when a directive override applies to it or its tag is
/// present in the configured table.
pub fn discover_templates(
    file: &Utf8Path,
    text: &str,
    config: &NormalizedConfig,
) -> Result<Vec<MatchedTemplate>, DiscoverError> {
    let (module, base) = parse_module(file, text)?;

    let mut collector = TemplateCollector {
        text,
        base,
        candidates: Vec::new(),
    };
    module.visit_with(&mut collector);

    let mut candidates = collector.candidates;
    candidates.sort_by_key(|c| c.span.start);

    let directives = extract_mode_directives(text);
    let overrides = resolve_overrides(&candidates, &directives);

    let matched = candidates
        .into_iter()
        .zip(overrides)
        .filter_map(|(candidate, override_mode)| {
            let mode = override_mode.or_else(|| config.mode_for(&candidate.tag))?;
            Some(MatchedTemplate {
                tag: candidate.tag,
                mode,
                span: candidate.span,
                chunks: candidate.chunks,
                substitutions: candidate.substitutions,
            })
        })
        .collect();

    Ok(matched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn discover(text: &str) -> Vec<MatchedTemplate> {
        discover_templates(Utf8Path::new("view.ts"), text, &NormalizedConfig::default())
            .expect("parse")
    }

    #[test]
    fn test_simple_template_is_matched() {
        let source = "const el = jsx`<p>${value}</p>`;\n";
        let matched = discover(source);
        assert_eq!(matched.len(), 1);

        let template = &matched[0];
        assert_eq!(template.tag, "jsx");
        assert_eq!(template.mode, TagMode::Dom);
        assert_eq!(u32::from(template.span.start) as usize, source.find("jsx").unwrap());
        assert_eq!(
            u32::from(template.span.end) as usize,
            source.rfind('`').unwrap() + 1
        );

        assert_eq!(template.chunks.len(), 2);
        assert_eq!(template.chunks[0].text, "<p>");
        assert_eq!(template.chunks[1].text, "</p>");
        assert_eq!(template.substitutions.len(), 1);
        assert_eq!(template.substitutions[0].text, "value");
        assert_eq!(
            u32::from(template.substitutions[0].span.start) as usize,
            source.find("value").unwrap()
        );
    }

    #[test]
    fn test_chunk_spans_exclude_delimiters() {
        let source = "jsx`a${x}b`;\n";
        let matched = discover(source);
        let template = &matched[0];
        for chunk in &template.chunks {
            let start = u32::from(chunk.span.start) as usize;
            let end = u32::from(chunk.span.end) as usize;
            assert_eq!(&source[start..end], chunk.text);
        }
        assert_eq!(template.chunks[0].text, "a");
        assert_eq!(template.chunks[1].text, "b");
    }

    #[test]
    fn test_unconfigured_tags_are_ignored() {
        let matched = discover("const el = html`<p>hi</p>`;\n");
        assert!(matched.is_empty());
    }

    #[test]
    fn test_non_identifier_tags_are_ignored() {
        let matched = discover("const el = lib.jsx`<p>hi</p>`;\n");
        assert!(matched.is_empty());
    }

    #[test]
    fn test_directive_matches_unconfigured_tag() {
        let source = "/* @jsx-react */\nconst el = html`<p>hi</p>`;\n";
        let matched = discover(source);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].tag, "html");
        assert_eq!(matched[0].mode, TagMode::React);
    }

    #[test]
    fn test_directive_is_consumed_by_the_next_template() {
        let source = "/* @jsx-dom */\nconst a = html`<p>1</p>`;\nconst b = html`<p>2</p>`;\n";
        let matched = discover(source);
        // only the first template gets the override; the second has no
        // directive of its own and `html` is not configured
        assert_eq!(matched.len(), 1);
        assert_eq!(
            u32::from(matched[0].span.start) as usize,
            source.find("html").unwrap()
        );
    }

    #[test]
    fn test_each_template_takes_its_nearest_preceding_directive() {
        let source = "/* @jsx-dom */\nconst a = jsx`<p>1</p>`;\n/* @jsx-react */\nconst b = jsx`<p>2</p>`;\n";
        let matched = discover(source);
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].mode, TagMode::Dom);
        assert_eq!(matched[1].mode, TagMode::React);
    }

    #[test]
    fn test_template_without_directive_keeps_tag_mode() {
        let source = "const a = jsx`<p>1</p>`;\n/* @jsx-react */\nconst b = jsx`<p>2</p>`;\n";
        let matched = discover(source);
        assert_eq!(matched.len(), 2);
        assert_eq!(matched[0].mode, TagMode::Dom);
        assert_eq!(matched[1].mode, TagMode::React);
    }

    #[test]
    fn test_directive_after_template_does_not_apply() {
        let source = "const a = html`<p>1</p>`;\n/* @jsx-dom */\n";
        assert!(discover(source).is_empty());
    }

    #[test]
    fn test_parse_failure_is_an_error() {
        let result = discover_templates(
            Utf8Path::new("broken.ts"),
            "const = ][",
            &NormalizedConfig::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_nested_templates_are_collected() {
        let source = "const el = jsx`<div>${jsx`<span>${x}</span>`}</div>`;\n";
        let matched = discover(source);
        assert_eq!(matched.len(), 2);
    }
}
