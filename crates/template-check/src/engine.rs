//! Analysis-engine traits and result shapes.
//!
//! The static-analysis engine itself is a black box behind these traits:
//! text and positions go in, diagnostics, completions and hover info come
//! out. The service layer only cares that positions and spans in the
//! results can be relocated.

use camino::{Utf8Path, Utf8PathBuf};
use smol_str::SmolStr;
use span_map::Span;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCategory {
    Error,
    Warning,
    Suggestion,
    Message,
}

/// One reported problem. `file`, `start` and `length` are optional the way
/// engines leave them unset for project-level diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub code: u32,
    pub category: DiagnosticCategory,
    pub message: String,
    pub file: Option<Utf8PathBuf>,
    pub start: Option<u32>,
    pub length: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionEntry {
    pub name: SmolStr,
    pub kind: Option<SmolStr>,
    /// The range the completion would replace, when the engine proposes one.
    pub replacement_span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompletionList {
    pub entries: Vec<CompletionEntry>,
    pub is_incomplete: bool,
}

/// One text edit in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChange {
    pub span: Span,
    pub new_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTextChanges {
    pub file: Utf8PathBuf,
    pub text_changes: Vec<TextChange>,
}

/// A fix-it attached to a completion detail, e.g. an auto-import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeAction {
    pub description: String,
    pub changes: Vec<FileTextChanges>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionDetails {
    pub name: SmolStr,
    pub display: String,
    pub documentation: Option<String>,
    pub code_actions: Vec<CodeAction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickInfo {
    pub text_span: Span,
    pub display: String,
    pub documentation: Option<String>,
}

/// The four queries the service relocates. Implemented both by the host's
/// engine (un-rewritten view) and by auxiliary sessions (rewritten view).
pub trait LanguageService {
    fn diagnostics_for(&mut self, file: &Utf8Path) -> Vec<Diagnostic>;

    fn completions_at(&mut self, file: &Utf8Path, position: u32) -> Option<CompletionList>;

    fn completion_details_at(
        &mut self,
        file: &Utf8Path,
        position: u32,
        entry_name: &str,
    ) -> Option<CompletionDetails>;

    fn quick_info_at(&mut self, file: &Utf8Path, position: u32) -> Option<QuickInfo>;
}

/// What the surrounding host supplies about its documents.
pub trait LanguageHost {
    /// Current text of a file, or `None` when the host does not track it.
    fn file_text(&self, file: &Utf8Path) -> Option<String>;

    /// Per-file content version; changes whenever the text changes.
    fn script_version(&self, file: &Utf8Path) -> Option<String>;

    /// Project-wide version; changes whenever any file changes.
    fn project_version(&self) -> Option<String>;
}

/// An engine instance that sees the synthesized text in place of exactly
/// one file. Released explicitly when its transform is invalidated.
pub trait AnalysisSession: LanguageService {
    fn release(&mut self);
}

/// Opens auxiliary sessions over a shadowed file.
pub trait SessionFactory {
    fn open_session(
        &self,
        file: &Utf8Path,
        synthesized_text: &str,
        version: &str,
    ) -> Box<dyn AnalysisSession>;
}
