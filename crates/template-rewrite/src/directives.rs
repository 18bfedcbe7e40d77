//! Inline mode directive scanning.
//!
//! Directives override the tag-derived mode for the templates that follow
//! them. They are recognized in raw text, independent of the syntax tree:
//!
//! - `/* @jsx-dom */` or `/* @jsx-react */` block comments
//! - `// @jsx-dom ...` or `// @jsx-react ...` line comments (the directive
//!   extends to the end of the line)

use crate::config::TagMode;

/// One directive occurrence: the offset just past the directive comment and
/// the mode it selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeDirective {
    /// End offset of the directive in the source text.
    pub end: u32,
    pub mode: TagMode,
}

/// Scans text for mode directives and returns them sorted by end offset.
///
/// This is a pure function of the text; repeated calls see no shared state.
pub fn extract_mode_directives(text: &str) -> Vec<ModeDirective> {
    let mut directives = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0;

    while i + 1 < bytes.len() {
        if bytes[i] == b'/' {
            let matched = match bytes[i + 1] {
                b'*' => match_block_directive(text, i),
                b'/' => match_line_directive(text, i),
                _ => None,
            };
            if let Some((mode, end)) = matched {
                directives.push(ModeDirective {
                    end: end as u32,
                    mode,
                });
                i = end;
                continue;
            }
        }
        i += 1;
    }

    directives.sort_by_key(|d| d.end);
    directives
}

/// Matches `@jsx-dom` or `@jsx-react` at the start of `rest`, returning the
/// mode and the number of bytes consumed.
fn match_mode_marker(rest: &str) -> Option<(TagMode, usize)> {
    let after = rest.strip_prefix("@jsx-")?;
    if after.starts_with("dom") {
        Some((TagMode::Dom, "@jsx-dom".len()))
    } else if after.starts_with("react") {
        Some((TagMode::React, "@jsx-react".len()))
    } else {
        None
    }
}

/// Matches `/* @jsx-<mode> */` starting at `start`. Returns the mode and the
/// offset just past the closing `*/`.
fn match_block_directive(text: &str, start: usize) -> Option<(TagMode, usize)> {
    let mut pos = start + 2;
    pos += leading_whitespace(&text[pos..]);
    let (mode, consumed) = match_mode_marker(&text[pos..])?;
    pos += consumed;
    pos += leading_whitespace(&text[pos..]);
    if text[pos..].starts_with("*/") {
        Some((mode, pos + 2))
    } else {
        None
    }
}

/// Matches `// @jsx-<mode>` starting at `start`. The directive runs to the
/// end of the line; the mode word must end at a non-word character.
fn match_line_directive(text: &str, start: usize) -> Option<(TagMode, usize)> {
    let mut pos = start + 2;
    pos += text[pos..]
        .bytes()
        .take_while(|b| *b == b' ' || *b == b'\t')
        .count();
    let (mode, consumed) = match_mode_marker(&text[pos..])?;
    pos += consumed;
    let boundary = text[pos..].bytes().next();
    if matches!(boundary, Some(b) if b == b'_' || b.is_ascii_alphanumeric()) {
        return None;
    }
    let line_end = text[pos..]
        .find(['\n', '\r'])
        .map(|i| pos + i)
        .unwrap_or(text.len());
    Some((mode, line_end))
}

fn leading_whitespace(text: &str) -> usize {
    text.len() - text.trim_start().len()
}
