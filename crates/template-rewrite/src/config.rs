//! Tag/mode configuration normalization.
//!
//! The host hands over an arbitrary configuration object. Everything it
//! recognizes is folded into a canonical tag-to-mode table; malformed or
//! unknown shapes are dropped silently and never fail the host.

use serde_json::Value;
use smol_str::SmolStr;
use std::collections::BTreeMap;

/// The synthesis dialect a tagged template resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagMode {
    /// Container-style markup checked against DOM element types.
    Dom,
    /// Component-style markup checked against React component types.
    React,
}

impl TagMode {
    /// Parses a configured mode string. `"runtime"` is accepted as a legacy
    /// alias for dom. Anything else is dropped.
    pub fn parse(value: &str) -> Option<TagMode> {
        match value {
            "dom" | "runtime" => Some(TagMode::Dom),
            "react" => Some(TagMode::React),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TagMode::Dom => "dom",
            TagMode::React => "react",
        }
    }
}

/// Canonical configuration: the tag-to-mode table plus the per-file cap.
///
/// Immutable once built; a fresh table is produced for every configuration
/// object the host supplies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedConfig {
    tag_modes: BTreeMap<SmolStr, TagMode>,
    max_templates_per_file: Option<usize>,
}

impl Default for NormalizedConfig {
    fn default() -> Self {
        let mut tag_modes = BTreeMap::new();
        tag_modes.insert(SmolStr::new_static("jsx"), TagMode::Dom);
        tag_modes.insert(SmolStr::new_static("reactJsx"), TagMode::React);
        Self {
            tag_modes,
            max_templates_per_file: None,
        }
    }
}

impl NormalizedConfig {
    /// Builds the canonical configuration from an opaque host object.
    ///
    /// Recognized options, applied over the defaults in this order (last
    /// write wins):
    /// - `tag`: a single tag name taking the legacy `mode`
    /// - `tags`: an array of tag names taking the legacy `mode`
    /// - `tagModes`: a tag-to-mode map (preferred, additive)
    /// - `maxTemplatesPerFile`: a numeric cap on templates per file
    pub fn from_value(config: &Value) -> Self {
        let mut normalized = Self::default();
        let Some(object) = config.as_object() else {
            return normalized;
        };

        let legacy_mode = object
            .get("mode")
            .and_then(Value::as_str)
            .and_then(TagMode::parse);

        if let Some(tag) = object.get("tag").and_then(Value::as_str) {
            let tag = tag.trim();
            if !tag.is_empty() {
                normalized
                    .tag_modes
                    .insert(SmolStr::new(tag), legacy_mode.unwrap_or(TagMode::Dom));
            }
        }

        if let Some(tags) = object.get("tags").and_then(Value::as_array) {
            for tag in tags.iter().filter_map(Value::as_str) {
                let tag = tag.trim();
                if !tag.is_empty() {
                    normalized
                        .tag_modes
                        .insert(SmolStr::new(tag), legacy_mode.unwrap_or(TagMode::Dom));
                }
            }
        }

        if let Some(map) = object.get("tagModes").and_then(Value::as_object) {
            for (tag, mode) in map {
                let Some(mode) = mode.as_str().and_then(TagMode::parse) else {
                    continue;
                };
                let tag = tag.trim();
                if !tag.is_empty() {
                    normalized.tag_modes.insert(SmolStr::new(tag), mode);
                }
            }
        }

        normalized.max_templates_per_file = object
            .get("maxTemplatesPerFile")
            .and_then(Value::as_u64)
            .filter(|cap| *cap > 0)
            .map(|cap| cap as usize);

        normalized
    }

    /// The mode configured for a tag, if any.
    pub fn mode_for(&self, tag: &str) -> Option<TagMode> {
        self.tag_modes.get(tag).copied()
    }

    /// The per-file template cap, if configured.
    pub fn max_templates_per_file(&self) -> Option<usize> {
        self.max_templates_per_file
    }

    /// A deterministic signature of this configuration, usable as a cache
    /// key component: changing any tag, mode, or the cap changes it.
    pub fn signature(&self) -> String {
        let mut signature = String::new();
        for (tag, mode) in &self.tag_modes {
            signature.push_str(tag);
            signature.push(':');
            signature.push_str(mode.as_str());
            signature.push('|');
        }
        match self.max_templates_per_file {
            Some(cap) => signature.push_str(&cap.to_string()),
            None => signature.push_str("none"),
        }
        signature
    }
}
