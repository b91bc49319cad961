//! In-memory representation of a single configuration source

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Sequence, Value};
use std::path::PathBuf;

/// Top-level key naming the control repositories
pub const CONTROL_REPOS: &str = "control_repos";
/// Top-level key holding settings inherited by every node
pub const DEFAULTS: &str = "defaults";
/// Top-level key holding puppetmaster settings and names
pub const PUPPETMASTER: &str = "puppetmaster";
/// Top-level key holding node definitions
pub const NODES: &str = "nodes";

/// An ordered mapping parsed from one YAML source
///
/// Key order is preserved through loading, merging and serialization, so
/// `rizzo config` prints keys in the order the files declare them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigDocument(Mapping);

impl ConfigDocument {
    /// Create an empty document
    #[must_use]
    pub fn new() -> Self {
        Self(Mapping::new())
    }

    /// Look up a top-level key
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Insert or replace a top-level key
    pub fn insert<V: Into<Value>>(&mut self, key: &str, value: V) {
        self.0.insert(Value::from(key), value.into());
    }

    /// Borrow the underlying mapping
    #[must_use]
    pub const fn as_mapping(&self) -> &Mapping {
        &self.0
    }

    /// Mutably borrow the underlying mapping
    pub fn as_mapping_mut(&mut self) -> &mut Mapping {
        &mut self.0
    }

    /// The `defaults` map, if present and a map
    #[must_use]
    pub fn defaults(&self) -> Option<&Mapping> {
        self.get(DEFAULTS).and_then(Value::as_mapping)
    }

    /// The `puppetmaster` map, if present and a map
    #[must_use]
    pub fn puppetmaster(&self) -> Option<&Mapping> {
        self.get(PUPPETMASTER).and_then(Value::as_mapping)
    }

    /// The `nodes` sequence; absent or malformed reads as empty
    #[must_use]
    pub fn nodes(&self) -> &[Value] {
        self.get(NODES)
            .and_then(Value::as_sequence)
            .map(Sequence::as_slice)
            .unwrap_or_default()
    }

    /// Every string entry of `control_repos`, in declared order
    ///
    /// Non-string entries are skipped here; schema validation reports them.
    #[must_use]
    pub fn control_repos(&self) -> Vec<PathBuf> {
        self.get(CONTROL_REPOS)
            .and_then(Value::as_sequence)
            .map(|repos| {
                repos
                    .iter()
                    .filter_map(Value::as_str)
                    .map(PathBuf::from)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Convert to JSON for schema validation
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A mapping key is not a string (JSON objects require string keys)
    pub fn to_json(&self) -> Result<serde_json::Value> {
        serde_json::to_value(&self.0).context("Configuration cannot be represented as JSON")
    }

    /// Serialize the document as YAML text
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The document contains a value YAML cannot serialize
    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(&self.0).context("Failed to serialize configuration as YAML")
    }
}

impl From<Mapping> for ConfigDocument {
    fn from(mapping: Mapping) -> Self {
        Self(mapping)
    }
}

/// Render a scalar as text; strings pass through, numbers and booleans are formatted
#[must_use]
pub fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) | Value::Tagged(_) => None,
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;

    fn doc(yaml: &str) -> ConfigDocument {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn control_repos_skips_non_strings() {
        let config = doc("control_repos: [/a, 3, /b]");
        assert_eq!(
            config.control_repos(),
            vec![PathBuf::from("/a"), PathBuf::from("/b")]
        );
    }

    #[test]
    fn missing_sections_read_as_empty() {
        let config = ConfigDocument::new();
        assert!(config.nodes().is_empty());
        assert!(config.control_repos().is_empty());
        assert!(config.defaults().is_none());
        assert!(config.puppetmaster().is_none());
    }

    #[test]
    fn yaml_output_preserves_key_order() {
        let config = doc("zeta: 1\nalpha: 2\nmid: 3\n");
        assert_eq!(config.to_yaml_string().unwrap(), "zeta: 1\nalpha: 2\nmid: 3\n");
    }

    #[test]
    fn non_string_keys_cannot_become_json() {
        let config = doc("? [a, b]\n: one\n");
        assert!(config.to_json().is_err());
    }

    #[test]
    fn scalars_render_as_text() {
        assert_eq!(scalar_to_string(&Value::from(2048)), Some("2048".to_owned()));
        assert_eq!(scalar_to_string(&Value::from(true)), Some("true".to_owned()));
        assert_eq!(scalar_to_string(&Value::Null), None);
    }
}
