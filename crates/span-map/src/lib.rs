//! Byte-offset spans and position translation for jsx-check-rs.
//!
//! This crate holds the mapping table produced when a tagged template is
//! rewritten into a JSX expression: one [`ReplacementSpan`] per rewritten
//! template, each carrying the [`Segment`]s that tie every synthesized byte
//! back to the author-written text (or to a synthetic filler character), and
//! the [`translate`] functions that convert positions between the original
//! and the synthesized document.

mod segment;
mod span;
pub mod translate;

pub use segment::{Fallback, ReplacementSpan, Segment, SegmentKind};
pub use span::{ByteOffset, Span};
