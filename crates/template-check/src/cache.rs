//! Per-file transform cache.
//!
//! Each file maps to the outcome of its last rewrite, keyed by content
//! version and configuration signature. A transformed entry also owns the
//! auxiliary session and the memoized extra diagnostics computed against
//! it; both die with the entry.

use crate::engine::{AnalysisSession, Diagnostic, SessionFactory};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;
use template_rewrite::TransformRecord;

/// Lexically normalizes a path: drops `.`, folds `..` into its parent.
pub fn normalize_path(path: &Utf8Path) -> Utf8PathBuf {
    let mut normalized = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Cached state for one rewritten file.
pub struct TransformedEntry {
    pub record: TransformRecord,
    /// Remapped diagnostics from the auxiliary pass, memoized per project
    /// version.
    pub extra_diagnostics: Option<Vec<Diagnostic>>,
    pub diagnostics_version: Option<String>,
    session: Option<Box<dyn AnalysisSession>>,
    session_version: String,
}

impl TransformedEntry {
    fn new(record: TransformRecord, version: Option<&str>) -> Self {
        Self {
            record,
            extra_diagnostics: None,
            diagnostics_version: None,
            session: None,
            session_version: format!("{}-transformed", version.unwrap_or("0")),
        }
    }

    /// The auxiliary session for this transform, opened on first use.
    pub fn session_mut(
        &mut self,
        factory: &impl SessionFactory,
        file: &Utf8Path,
    ) -> &mut Box<dyn AnalysisSession> {
        let record = &self.record;
        let version = &self.session_version;
        self.session
            .get_or_insert_with(|| factory.open_session(file, &record.text, version))
    }

    fn release(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.release();
        }
    }
}

/// What the cache remembers about a file at a given version and
/// configuration.
pub enum CacheEntry {
    /// The file has no matched templates (or fails closed); queries go
    /// straight to the host.
    NoTemplates,
    /// The file was rewritten.
    Transformed(Box<TransformedEntry>),
}

struct Keyed {
    version: Option<String>,
    config_key: String,
    entry: CacheEntry,
}

/// The per-service transform cache, keyed by normalized path.
#[derive(Default)]
pub struct TransformCache {
    entries: FxHashMap<Utf8PathBuf, Keyed>,
}

impl TransformCache {
    /// Looks up the entry for a file, rebuilding it when the version or
    /// configuration signature moved. `build` runs only on a miss and
    /// returns the new transform outcome.
    pub fn ensure(
        &mut self,
        file: &Utf8Path,
        version: Option<&str>,
        config_key: &str,
        build: impl FnOnce() -> Option<TransformRecord>,
    ) -> &mut CacheEntry {
        let normalized = normalize_path(file);
        let rebuild = || {
            let entry = match build() {
                Some(record) => {
                    CacheEntry::Transformed(Box::new(TransformedEntry::new(record, version)))
                }
                None => CacheEntry::NoTemplates,
            };
            Keyed {
                version: version.map(str::to_string),
                config_key: config_key.to_string(),
                entry,
            }
        };

        let keyed = match self.entries.entry(normalized) {
            Entry::Occupied(occupied)
                if occupied.get().version.as_deref() == version
                    && occupied.get().config_key == config_key =>
            {
                occupied.into_mut()
            }
            Entry::Occupied(occupied) => {
                let stale = occupied.into_mut();
                if let CacheEntry::Transformed(entry) = &mut stale.entry {
                    entry.release();
                }
                *stale = rebuild();
                stale
            }
            Entry::Vacant(vacant) => vacant.insert(rebuild()),
        };
        &mut keyed.entry
    }

    /// Releases every cached session and drops all entries.
    pub fn release_all(&mut self) {
        for keyed in self.entries.values_mut() {
            if let CacheEntry::Transformed(entry) = &mut keyed.entry {
                entry.release();
            }
        }
        self.entries.clear();
    }
}
