//! YAML configuration loading and parsing

use crate::config::document::ConfigDocument;
use crate::error::RizzoError;
use crate::system::System;
use crate::utils::path::{expand_path, path_to_string};
use anyhow::Result;
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the override file at the root of every control repository
pub const REPO_CONFIG_FILE: &str = ".rizzo.yaml";

/// Default location of the personal configuration file
pub const DEFAULT_PERSONAL_CONFIG: &str = "~/.rizzo.yaml";

/// Load and parse one YAML configuration source
///
/// The path is expanded (`~`, relative to the current directory) before use.
///
/// # Errors
///
/// Returns an error if:
/// - The path cannot be expanded
/// - The file does not exist, is not a regular file, or cannot be read
///   ([`RizzoError::NotReadable`])
/// - The content is not YAML, or its top level is not a mapping
///   ([`RizzoError::Parse`])
pub fn load(system: &dyn System, path: &Path) -> Result<ConfigDocument> {
    let config_file = expand_path(system, &path_to_string(path))?;

    if !system.is_file(&config_file) || !system.is_readable(&config_file) {
        return Err(RizzoError::not_readable(&config_file).into());
    }

    let content = system
        .read_to_string(&config_file)
        .map_err(|_| RizzoError::not_readable(&config_file))?;

    let document = parse(&config_file, &content)?;
    debug!("Loaded {}", config_file.display());
    Ok(document)
}

/// Parse YAML text into a document, attributing failures to `path`
///
/// An empty source is an empty document.
///
/// # Errors
///
/// Returns an error if:
/// - The content is not valid YAML
/// - The top-level value is neither a mapping nor empty
pub fn parse(path: &Path, content: &str) -> Result<ConfigDocument, RizzoError> {
    if is_blank(content) {
        return Ok(ConfigDocument::new());
    }

    let value: Value = serde_yaml::from_str(content).map_err(|e| {
        // Extract line and column information from serde_yaml error
        if let Some(location) = e.location() {
            RizzoError::parse(
                path,
                format!(
                    "line {}, column {}: {}",
                    location.line(),
                    location.column(),
                    e
                ),
            )
        } else {
            RizzoError::parse(path, e.to_string())
        }
    })?;

    match value {
        Value::Mapping(mapping) => Ok(ConfigDocument::from(mapping)),
        Value::Null => Ok(ConfigDocument::new()),
        other => Err(RizzoError::parse(
            path,
            format!(
                "top level must be a mapping of keys to values, found {}",
                kind_name(&other)
            ),
        )),
    }
}

/// Path of the override file inside a control repository
#[must_use]
pub fn repo_config_path(repo: &Path) -> PathBuf {
    repo.join(REPO_CONFIG_FILE)
}

// Comments and document markers only
fn is_blank(content: &str) -> bool {
    content.lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;
    use crate::system::MockSystem;

    #[test]
    fn load_valid_config() {
        let system = MockSystem::new()
            .with_file("/home/jeff/.rizzo.yaml", b"control_repos:\n  - /repos/a\n")
            .unwrap();
        let doc = load(&system, Path::new("/home/jeff/.rizzo.yaml")).unwrap();
        assert_eq!(doc.control_repos(), vec![PathBuf::from("/repos/a")]);
    }

    #[test]
    fn load_expands_home() {
        let system = MockSystem::new()
            .with_env("HOME", "/home/jeff")
            .unwrap()
            .with_file("/home/jeff/.rizzo.yaml", b"defaults: {}\n")
            .unwrap();
        let doc = load(&system, Path::new(DEFAULT_PERSONAL_CONFIG)).unwrap();
        assert!(doc.defaults().is_some());
    }

    #[test]
    fn load_nonexistent_file() {
        let system = MockSystem::new();
        let err = load(&system, Path::new("/nonexistent/.rizzo.yaml")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RizzoError>(),
            Some(RizzoError::NotReadable { .. })
        ));
    }

    #[test]
    fn load_directory_is_not_readable() {
        let system = MockSystem::new().with_dir("/repos/a").unwrap();
        let err = load(&system, Path::new("/repos/a")).unwrap_err();
        assert!(err.to_string().contains("Cannot read config file /repos/a"));
    }

    #[test]
    fn load_unreadable_file() {
        let system = MockSystem::new()
            .with_file("/locked.yaml", b"a: 1\n")
            .unwrap()
            .with_unreadable("/locked.yaml")
            .unwrap();
        let err = load(&system, Path::new("/locked.yaml")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RizzoError>(),
            Some(RizzoError::NotReadable { .. })
        ));
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let system = MockSystem::new()
            .with_file("/bad.yaml", b"control_repos: [\n")
            .unwrap();
        let err = load(&system, Path::new("/bad.yaml")).unwrap_err();
        let typed = err.downcast_ref::<RizzoError>().unwrap();
        assert!(matches!(typed, RizzoError::Parse { .. }));
        assert!(typed.to_string().contains("/bad.yaml"));
    }

    #[test]
    fn empty_file_is_empty_document() {
        let doc = parse(Path::new("/empty.yaml"), "").unwrap();
        assert_eq!(doc, ConfigDocument::new());
        let doc = parse(Path::new("/comments.yaml"), "---\n# nothing yet\n").unwrap();
        assert_eq!(doc, ConfigDocument::new());
    }

    #[test]
    fn scalar_root_is_parse_error() {
        let err = parse(Path::new("/scalar.yaml"), "just a string").unwrap_err();
        assert!(err.to_string().contains("top level must be a mapping"));
    }
}
