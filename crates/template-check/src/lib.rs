//! Language-service layer for jsx-check-rs.
//!
//! Wraps a host analysis engine so that files containing matched tagged
//! templates are checked twice: once as the author wrote them, and once
//! through the JSX rewrite. Query positions are translated into the
//! synthesized document before hitting the auxiliary engine, and every
//! result coming back (diagnostics, completions, hover info, text edits)
//! is remapped into the author's coordinates. Transforms and auxiliary
//! sessions are cached per (file, version, configuration signature).

mod cache;
mod engine;
mod remap;
mod service;

pub use cache::{CacheEntry, TransformCache, TransformedEntry};
pub use engine::{
    AnalysisSession, CodeAction, CompletionDetails, CompletionEntry, CompletionList, Diagnostic,
    DiagnosticCategory, FileTextChanges, LanguageHost, LanguageService, QuickInfo, SessionFactory,
    TextChange,
};
pub use remap::{
    diagnostic_key, remap_code_actions, remap_completion_entries, remap_diagnostic,
    remap_quick_info, ASSIGNABILITY_CODE,
};
pub use service::TemplateService;
