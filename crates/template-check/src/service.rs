//! The author-facing service.
//!
//! Every query runs against the host engine's view of the file unless the
//! file has matched templates, in which case the query position is moved
//! into the synthesized document, answered by the auxiliary session, and
//! the result is moved back. Any miss along the way (no transform, no
//! synthesized position, an empty engine answer) falls back to the host's
//! own result.

use crate::cache::{normalize_path, CacheEntry, TransformCache, TransformedEntry};
use crate::engine::{
    CompletionDetails, CompletionList, Diagnostic, LanguageHost, LanguageService, QuickInfo,
    SessionFactory,
};
use crate::remap::{
    diagnostic_key, remap_code_actions, remap_completion_entries, remap_diagnostic,
    remap_quick_info,
};
use camino::Utf8Path;
use rustc_hash::FxHashSet;
use serde_json::Value;
use span_map::translate::to_synthesized;
use template_rewrite::{rewrite, NormalizedConfig};

pub struct TemplateService<H, F> {
    host: H,
    factory: F,
    config: NormalizedConfig,
    config_key: String,
    cache: TransformCache,
}

/// Looks up (or rebuilds) the transform entry for a file. Free function so
/// the caller keeps `host` and `factory` usable while holding the entry.
fn ensure_entry<'a, H: LanguageHost>(
    cache: &'a mut TransformCache,
    host: &H,
    config: &NormalizedConfig,
    config_key: &str,
    file: &Utf8Path,
) -> Option<&'a mut TransformedEntry> {
    let text = host.file_text(file)?;
    let version = host.script_version(file);
    let entry = cache.ensure(file, version.as_deref(), config_key, || {
        rewrite(file, &text, config).ok().flatten()
    });
    match entry {
        CacheEntry::Transformed(entry) => Some(entry),
        CacheEntry::NoTemplates => None,
    }
}

impl<H, F> TemplateService<H, F>
where
    H: LanguageHost + LanguageService,
    F: SessionFactory,
{
    pub fn new(host: H, factory: F, config: &Value) -> Self {
        let config = NormalizedConfig::from_value(config);
        let config_key = config.signature();
        Self {
            host,
            factory,
            config,
            config_key,
            cache: TransformCache::default(),
        }
    }

    /// Swaps in a new configuration. Cached transforms and their sessions
    /// are dropped; files re-transform lazily under the new signature.
    pub fn set_config(&mut self, config: &Value) {
        self.config = NormalizedConfig::from_value(config);
        self.config_key = self.config.signature();
        self.cache.release_all();
    }

    /// Releases every auxiliary session and clears the cache.
    pub fn dispose(&mut self) {
        self.cache.release_all();
    }

    /// The host's diagnostics plus the deduplicated extra diagnostics found
    /// in the rewritten view of the file.
    pub fn diagnostics_for(&mut self, file: &Utf8Path) -> Vec<Diagnostic> {
        let mut base = self.host.diagnostics_for(file);
        let Some(entry) = ensure_entry(
            &mut self.cache,
            &self.host,
            &self.config,
            &self.config_key,
            file,
        ) else {
            return base;
        };

        let project_version = self
            .host
            .project_version()
            .unwrap_or_else(|| "static".to_string());

        if entry.extra_diagnostics.is_none()
            || entry.diagnostics_version.as_deref() != Some(project_version.as_str())
        {
            let target = normalize_path(file);
            let raw = entry.session_mut(&self.factory, file).diagnostics_for(file);
            let extra = raw
                .iter()
                .filter(|d| {
                    d.file
                        .as_deref()
                        .is_some_and(|f| normalize_path(f) == target)
                })
                .map(|d| remap_diagnostic(d, &entry.record))
                .collect();
            entry.extra_diagnostics = Some(extra);
            entry.diagnostics_version = Some(project_version);
        }

        let base_keys: FxHashSet<String> = base.iter().map(diagnostic_key).collect();
        if let Some(extra) = &entry.extra_diagnostics {
            base.extend(
                extra
                    .iter()
                    .filter(|d| !base_keys.contains(&diagnostic_key(d)))
                    .cloned(),
            );
        }
        base
    }

    pub fn completions_at(&mut self, file: &Utf8Path, position: u32) -> Option<CompletionList> {
        if let Some(list) = self.transformed_completions(file, position) {
            return Some(list);
        }
        self.host.completions_at(file, position)
    }

    fn transformed_completions(
        &mut self,
        file: &Utf8Path,
        position: u32,
    ) -> Option<CompletionList> {
        let entry = ensure_entry(
            &mut self.cache,
            &self.host,
            &self.config,
            &self.config_key,
            file,
        )?;
        let synthesized = to_synthesized(&entry.record.spans, position)?;
        let mut list = entry
            .session_mut(&self.factory, file)
            .completions_at(file, synthesized)?;
        remap_completion_entries(&mut list.entries, &entry.record.spans);
        Some(list)
    }

    pub fn completion_details_at(
        &mut self,
        file: &Utf8Path,
        position: u32,
        entry_name: &str,
    ) -> Option<CompletionDetails> {
        if let Some(details) = self.transformed_completion_details(file, position, entry_name) {
            return Some(details);
        }
        self.host.completion_details_at(file, position, entry_name)
    }

    fn transformed_completion_details(
        &mut self,
        file: &Utf8Path,
        position: u32,
        entry_name: &str,
    ) -> Option<CompletionDetails> {
        let entry = ensure_entry(
            &mut self.cache,
            &self.host,
            &self.config,
            &self.config_key,
            file,
        )?;
        let synthesized = to_synthesized(&entry.record.spans, position)?;
        let mut details = entry
            .session_mut(&self.factory, file)
            .completion_details_at(file, synthesized, entry_name)?;
        remap_code_actions(
            &normalize_path(file),
            &entry.record.spans,
            &mut details.code_actions,
        );
        Some(details)
    }

    pub fn quick_info_at(&mut self, file: &Utf8Path, position: u32) -> Option<QuickInfo> {
        if let Some(info) = self.transformed_quick_info(file, position) {
            return Some(info);
        }
        self.host.quick_info_at(file, position)
    }

    fn transformed_quick_info(&mut self, file: &Utf8Path, position: u32) -> Option<QuickInfo> {
        let entry = ensure_entry(
            &mut self.cache,
            &self.host,
            &self.config,
            &self.config_key,
            file,
        )?;
        let synthesized = to_synthesized(&entry.record.spans, position)?;
        let mut info = entry
            .session_mut(&self.factory, file)
            .quick_info_at(file, synthesized)?;
        remap_quick_info(&mut info, &entry.record.spans);
        Some(info)
    }
}

impl<H, F> Drop for TemplateService<H, F> {
    fn drop(&mut self) {
        self.cache.release_all();
    }
}
