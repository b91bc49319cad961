//! JSON Schema validation for rizzo configuration

use crate::config::document::ConfigDocument;
use crate::config::validation::Issue;
use anyhow::{Result, anyhow};
use jsonschema::Validator;
use serde_json::Value;
use tracing::debug;

/// The fixed schemas a document can be checked against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaKind {
    /// `~/.rizzo.yaml`: just enough to find the control repositories
    Personal,
    /// The merged configuration of every control repository
    Complete,
    /// One node after defaults and role settings have been applied
    Node,
}

impl SchemaKind {
    /// Embedded schema source
    #[must_use]
    pub const fn source(self) -> &'static str {
        match self {
            Self::Personal => include_str!("../../schemas/personal.json"),
            Self::Complete => include_str!("../../schemas/complete.json"),
            Self::Node => include_str!("../../schemas/node.json"),
        }
    }

    /// Prefix for issue messages produced by this schema
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Personal => "Personal config problem",
            Self::Complete => "Schema violation",
            Self::Node => "Node definition problem",
        }
    }
}

/// Get the compiled validator for a schema
///
/// # Errors
///
/// Returns an error if:
/// - The embedded schema is not valid JSON or not a valid Draft 7 schema
pub fn get_schema(kind: SchemaKind) -> Result<Validator> {
    let schema: Value = serde_json::from_str(kind.source())
        .map_err(|e| anyhow!("Failed to parse embedded JSON schema: {}", e))?;

    jsonschema::draft7::new(&schema).map_err(|e| anyhow!("Failed to compile JSON schema: {}", e))
}

/// Validate a JSON value, returning one issue per violation
#[must_use]
pub fn validate_value(instance: &Value, kind: SchemaKind) -> Vec<Issue> {
    let validator = match get_schema(kind) {
        Ok(validator) => validator,
        Err(e) => return vec![Issue::schema_violation(format!("{}: {e}", kind.label()))],
    };

    let issues: Vec<Issue> = validator
        .iter_errors(instance)
        .map(|e| {
            Issue::schema_violation(format!(
                "{}: The property '#{}' {}",
                kind.label(),
                e.instance_path,
                e
            ))
        })
        .collect();

    if issues.is_empty() {
        debug!("No {:?} schema violations found", kind);
    }
    issues
}

/// Validate a configuration document against a schema
///
/// Validation is structural only; the filesystem is never consulted.
#[must_use]
pub fn validate(document: &ConfigDocument, kind: SchemaKind) -> Vec<Issue> {
    match document.to_json() {
        Ok(instance) => validate_value(&instance, kind),
        Err(e) => vec![Issue::schema_violation(format!("{}: {e:#}", kind.label()))],
    }
}
