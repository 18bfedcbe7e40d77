//! Top-level rewrite entry point.

use crate::compose::{compose, TransformRecord};
use crate::config::NormalizedConfig;
use crate::discover::{discover_templates, DiscoverError};
use camino::Utf8Path;

/// Rewrites every matched tagged template in `text` into parenthesized JSX.
///
/// Returns `Ok(None)` when the file needs no transform: no template
/// matched, or a configured per-file cap was exceeded. The cap fails the
/// whole file closed rather than rewriting a prefix of its templates.
pub fn rewrite(
    file: &Utf8Path,
    text: &str,
    config: &NormalizedConfig,
) -> Result<Option<TransformRecord>, DiscoverError> {
    let matched = discover_templates(file, text, config)?;
    if matched.is_empty() {
        return Ok(None);
    }
    if let Some(cap) = config.max_templates_per_file() {
        if matched.len() > cap {
            return Ok(None);
        }
    }
    Ok(Some(compose(text, &matched)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_file_without_templates_is_untouched() {
        let record = rewrite(
            Utf8Path::new("plain.ts"),
            "export const n = 1;\n",
            &NormalizedConfig::default(),
        )
        .expect("parse");
        assert_eq!(record, None);
    }

    #[test]
    fn test_cap_fails_the_whole_file_closed() {
        let config = NormalizedConfig::from_value(&json!({ "maxTemplatesPerFile": 1 }));
        let source = "jsx`<i>1</i>`; jsx`<i>2</i>`;";
        let record = rewrite(Utf8Path::new("view.ts"), source, &config).expect("parse");
        assert_eq!(record, None);

        // under the cap the file transforms normally
        let relaxed = NormalizedConfig::from_value(&json!({ "maxTemplatesPerFile": 2 }));
        let record = rewrite(Utf8Path::new("view.ts"), source, &relaxed).expect("parse");
        assert!(record.is_some());
    }

    #[test]
    fn test_parse_failure_surfaces_an_error() {
        let result = rewrite(
            Utf8Path::new("broken.ts"),
            "const = ][",
            &NormalizedConfig::default(),
        );
        assert!(result.is_err());
    }
}
