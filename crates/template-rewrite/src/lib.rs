//! Tagged-template JSX rewriting for jsx-check-rs.
//!
//! This crate turns tagged template literals like `` jsx`<div>${x}</div>` ``
//! into parenthesized JSX expressions a TypeScript checker can analyze,
//! while recording a byte-precise span table so every position in the
//! synthesized document maps back to the author's text. It handles:
//! - Normalizing the host configuration into a tag-to-mode table
//! - Discovering tagged templates and resolving inline mode directives
//! - Synthesizing template bodies with the brace-insertion heuristic
//! - Building per-template segment tables
//! - Composing all replacements into one synthesized document
//!
//! # Example
//!
//! ```
//! use camino::Utf8Path;
//! use template_rewrite::{rewrite, NormalizedConfig};
//!
//! let source = "const el = jsx`<button onClick=${handler}>go</button>`;";
//! let config = NormalizedConfig::default();
//! let record = rewrite(Utf8Path::new("view.ts"), source, &config)
//!     .unwrap()
//!     .unwrap();
//! assert!(record.text.contains("onClick={handler}"));
//! ```

mod compose;
mod config;
mod directives;
mod discover;
mod rewrite;
mod segments;
mod synthesize;

pub use compose::{compose, TransformRecord};
pub use config::{NormalizedConfig, TagMode};
pub use directives::{extract_mode_directives, ModeDirective};
pub use discover::{
    discover_templates, DiscoverError, MatchedTemplate, Substitution, TemplateChunk,
};
pub use rewrite::rewrite;
pub use segments::build_segments;
pub use synthesize::{synthesize_body, SynthesizedBody};
