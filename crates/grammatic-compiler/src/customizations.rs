//! The `Customizations` configuration object (§4.11, §6): external bindings
//! for builtin productions, postcondition predicates, mixins, and
//! per-production custom artifact content.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Mixin {
    #[serde(default)]
    pub state: Vec<(String, String)>,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub extends: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CustomNodeContent {
    pub body_text: String,
    #[serde(default)]
    pub extra_imports: Vec<String>,
}

/// Deserialized with `deny_unknown_fields`: an unrecognized top-level key is
/// a load-time error naming the offending key, rather than being silently
/// ignored (§4.11, §9's "unknown keys" open question, resolved as rejection).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Customizations {
    pub tokens: Option<String>,
    pub postconds: Option<String>,
    #[serde(default)]
    pub mixins: BTreeMap<String, Mixin>,
    #[serde(default)]
    pub custom_node_content: BTreeMap<String, CustomNodeContent>,
}

#[derive(Debug, thiserror::Error)]
pub enum CustomizationsError {
    #[error("failed to read customizations file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse customizations file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Customizations {
    /// Loads a customizations object from a JSON file, or returns the
    /// all-defaults object when `path` is `None` (§4.11: "a grammar with no
    /// customizations file compiles against the all-defaults object").
    pub fn load(path: Option<&Path>) -> Result<Self, CustomizationsError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| CustomizationsError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| CustomizationsError::Parse {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_path_yields_all_defaults() {
        let c = Customizations::load(None).unwrap();
        assert!(c.tokens.is_none());
        assert!(c.mixins.is_empty());
    }

    #[test]
    fn unknown_top_level_key_is_rejected() {
        let err = serde_json::from_str::<Customizations>(r#"{"bogus": 1}"#).unwrap_err();
        assert!(err.to_string().contains("bogus"));
    }

    #[test]
    fn mixin_with_only_required_defaults_deserializes() {
        let c: Customizations = serde_json::from_str(r#"{"mixins": {"Sep": {}}}"#).unwrap();
        assert!(c.mixins.contains_key("Sep"));
        assert!(c.mixins["Sep"].state.is_empty());
    }
}
