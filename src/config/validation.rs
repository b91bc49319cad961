//! Configuration validation logic
//!
//! Validation never stops at the first problem. Every check in a list runs
//! and contributes zero or more [`Issue`]s, so the user sees everything that
//! is wrong with their configuration in one run. Whether the collected issues
//! abort the program is decided afterwards by [`validate_inform`].

use crate::config::document::{CONTROL_REPOS, ConfigDocument, DEFAULTS};
use crate::config::schema::{self, SchemaKind};
use crate::error::RizzoError;
use crate::system::System;
use crate::utils::path::is_absolute_path;
use core::fmt;
use serde_yaml::Value;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Category of a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum IssueKind {
    /// Structural mismatch against a schema
    SchemaViolation,
    /// A configured path is relative, missing, unreadable, or not a git checkout
    PathInvalid,
    /// Two nodes claim the same ip, forwarded port, or name
    Conflict,
}

/// A single human-readable validation finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    kind: IssueKind,
    message: String,
}

impl Issue {
    /// Create an issue of the given kind
    #[inline]
    pub fn new<S: Into<String>>(kind: IssueKind, message: S) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create a schema violation issue
    #[inline]
    pub fn schema_violation<S: Into<String>>(message: S) -> Self {
        Self::new(IssueKind::SchemaViolation, message)
    }

    /// Create an invalid path issue
    #[inline]
    pub fn path_invalid<S: Into<String>>(message: S) -> Self {
        Self::new(IssueKind::PathInvalid, message)
    }

    /// Create a conflict issue
    #[inline]
    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::new(IssueKind::Conflict, message)
    }

    #[must_use]
    pub const fn kind(&self) -> IssueKind {
        self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// How collected issues are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Any issue aborts with exit status 2
    Hard,
    /// Issues are logged as warnings and processing continues
    Soft,
}

/// A named validation step
#[derive(Clone, Copy)]
pub struct Check {
    pub name: &'static str,
    pub run: fn(&dyn System, &ConfigDocument) -> Vec<Issue>,
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check").field("name", &self.name).finish()
    }
}

/// Checks for the personal configuration, in order
pub const PERSONAL_CHECKS: &[Check] = &[
    Check {
        name: "personal_schema",
        run: validate_personal_schema,
    },
    Check {
        name: "control_repos",
        run: validate_control_repos,
    },
];

/// Checks for the complete, merged configuration, in order
pub const COMPLETE_CHECKS: &[Check] = &[
    Check {
        name: "schema",
        run: validate_schema,
    },
    Check {
        name: "defaults_key",
        run: validate_defaults_key,
    },
    Check {
        name: "control_repos",
        run: validate_control_repos,
    },
    Check {
        name: "forwarded_ports",
        run: validate_forwarded_ports,
    },
    Check {
        name: "ip_addresses",
        run: validate_ip_addresses,
    },
    Check {
        name: "unique_names",
        run: validate_unique_names,
    },
];

/// Run every check against `config` and collect all issues
#[must_use]
pub fn compute_issues(system: &dyn System, checks: &[Check], config: &ConfigDocument) -> Vec<Issue> {
    checks
        .iter()
        .flat_map(|check| {
            debug!("Checking config for {} issues", check.name);
            (check.run)(system, config)
        })
        .collect()
}

/// Report collected issues according to `mode`
///
/// # Errors
///
/// Returns [`RizzoError::Validation`] carrying every issue message when
/// `mode` is [`ValidationMode::Hard`] and `issues` is not empty.
pub fn validate_inform(issues: &[Issue], mode: ValidationMode, context: &str) -> Result<(), RizzoError> {
    if issues.is_empty() {
        debug!("No issues detected with the {context}");
        return Ok(());
    }

    match mode {
        ValidationMode::Hard => Err(RizzoError::validation(
            context,
            issues.iter().map(ToString::to_string).collect(),
        )),
        ValidationMode::Soft => {
            for issue in issues {
                warn!("{issue}");
            }
            Ok(())
        }
    }
}

/// Validate the personal configuration against its schema
#[must_use]
pub fn validate_personal_schema(_system: &dyn System, config: &ConfigDocument) -> Vec<Issue> {
    schema::validate(config, SchemaKind::Personal)
}

/// Validate the merged configuration against the complete schema
#[must_use]
pub fn validate_schema(_system: &dyn System, config: &ConfigDocument) -> Vec<Issue> {
    schema::validate(config, SchemaKind::Complete)
}

/// Validate the top-level `defaults` map and its `bootstrap_repo_path`
#[must_use]
pub fn validate_defaults_key(system: &dyn System, config: &ConfigDocument) -> Vec<Issue> {
    let Some(defaults) = config.get(DEFAULTS) else {
        return vec![Issue::schema_violation(
            "Configuration does not contain top level \"defaults\" key",
        )];
    };
    let Some(defaults) = defaults.as_mapping() else {
        return vec![Issue::schema_violation(
            "Top level key \"defaults\" must have a Hash value",
        )];
    };

    match defaults.get("bootstrap_repo_path") {
        None => vec![Issue::schema_violation(
            "Configuration \"defaults\" value does not contain a \"bootstrap_repo_path\" key.  \
             For example, {\"defaults\":{\"bootstrap_repo_path\":\"/tmp/foo\"}}",
        )],
        Some(Value::String(path)) => {
            validate_existence(system, path, "#/defaults/bootstrap_repo_path value of ")
                .into_iter()
                .collect()
        }
        Some(_) => vec![Issue::schema_violation(
            "#/defaults/bootstrap_repo_path is not a String",
        )],
    }
}

/// Validate every entry of `control_repos` exists as a readable git checkout
#[must_use]
pub fn validate_control_repos(system: &dyn System, config: &ConfigDocument) -> Vec<Issue> {
    let Some(repos) = config.get(CONTROL_REPOS) else {
        return vec![Issue::schema_violation(
            "Top level key \"control_repos\" is not specified.  \
             It must be an Array of paths to your control repos.",
        )];
    };
    let Some(repos) = repos.as_sequence() else {
        return vec![Issue::schema_violation(
            "Top level key \"control_repos\" must have an Array value",
        )];
    };

    repos
        .iter()
        .filter_map(Value::as_str)
        .filter_map(|path| validate_existence(system, path, "#/control_repos "))
        .collect()
}

/// Validate a path is fully qualified, a readable directory, and a git checkout
///
/// Only the first failing condition is reported for each path.
#[must_use]
pub fn validate_existence(system: &dyn System, path: &str, prefix: &str) -> Option<Issue> {
    let dir = Path::new(path);
    let git = dir.join(".git");

    if !is_absolute_path(path) {
        return Some(Issue::path_invalid(format!(
            "{prefix}{path} is not an absolute path.  It must be fully qualified, not relative"
        )));
    }
    if !system.is_dir(dir) {
        return Some(Issue::path_invalid(format!(
            "{prefix}{path} is not a directory.  Has it been cloned?"
        )));
    }
    if !system.is_readable(dir) {
        return Some(Issue::path_invalid(format!(
            "{prefix}{path} is not readable.  Are permissions correct?"
        )));
    }
    if !system.is_dir(&git) {
        return Some(Issue::path_invalid(format!(
            "{prefix}{} does not exist.  Has {path} been cloned properly?",
            git.display()
        )));
    }
    None
}

/// Report forwarded host ports claimed more than once across all nodes
#[must_use]
pub fn validate_forwarded_ports(_system: &dyn System, config: &ConfigDocument) -> Vec<Issue> {
    let mut seen: HashMap<u64, String> = HashMap::new();
    let mut issues = Vec::new();

    for node in config.nodes() {
        let name = node_name(node);
        let ports = node
            .get("forwarded_ports")
            .and_then(Value::as_sequence)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for port in ports.iter().filter_map(|p| p.get("host")).filter_map(port_number) {
            if let Some(first) = seen.get(&port) {
                issues.push(Issue::conflict(format!(
                    "host port {port} on node {name} is a duplicate of node {first}.  \
                     Ports must be unique.  Check .rizzo.yaml files in each control \
                     repository for duplicate forwarded_ports entries."
                )));
            } else {
                seen.insert(port, name.clone());
            }
        }
    }
    issues
}

/// Report private network addresses used by more than one node
#[must_use]
pub fn validate_ip_addresses(_system: &dyn System, config: &ConfigDocument) -> Vec<Issue> {
    let mut seen: HashMap<&str, String> = HashMap::new();
    let mut issues = Vec::new();

    for node in config.nodes() {
        let Some(ip) = node.get("ip").and_then(Value::as_str) else {
            continue;
        };
        let name = node_name(node);
        if let Some(first) = seen.get(ip) {
            issues.push(Issue::conflict(format!(
                "host ip {ip} on node {name} is a duplicate of node {first}.  \
                 IP addresses must be unique.  Check .rizzo.yaml files in each \
                 control repository for duplicate ip entries"
            )));
        } else {
            seen.insert(ip, name);
        }
    }
    issues
}

/// Report node names defined more than once
#[must_use]
pub fn validate_unique_names(_system: &dyn System, config: &ConfigDocument) -> Vec<Issue> {
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for name in config.nodes().iter().filter_map(|n| n.get("name")).filter_map(Value::as_str) {
        match counts.iter_mut().find(|(seen, _)| *seen == name) {
            Some((_, count)) => *count += 1,
            None => counts.push((name, 1)),
        }
    }

    counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(name, count)| {
            Issue::conflict(format!(
                "node {name} is defined {count} times.  Node names must be unique."
            ))
        })
        .collect()
}

/// Validate node settings after role projection against the node schema
#[must_use]
pub fn validate_nodes<'a, I>(nodes: I) -> Vec<Issue>
where
    I: IntoIterator<Item = &'a ConfigDocument>,
{
    nodes
        .into_iter()
        .flat_map(|node| {
            let name = node
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("<unnamed>")
                .to_owned();
            schema::validate(node, SchemaKind::Node)
                .into_iter()
                .map(move |issue| Issue::new(issue.kind(), format!("{issue} (node {name})")))
        })
        .collect()
}

fn node_name(node: &Value) -> String {
    node.get("name")
        .and_then(Value::as_str)
        .unwrap_or("<unnamed>")
        .to_owned()
}

fn port_number(value: &Value) -> Option<u64> {
    match value {
        Value::String(s) => s.trim().parse().ok(),
        Value::Number(n) => n.as_u64(),
        _ => None,
    }
}
