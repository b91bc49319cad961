//! `roles` subcommand: list node names

use crate::config::{ConfigDocument, ConfigPipeline};
use crate::operations::output::write_output;
use crate::system::System;
use anyhow::Result;
use serde_yaml::Value;

/// Node names in input order; nodes without a name are skipped
#[must_use]
pub fn roles(config: &ConfigDocument) -> Vec<&str> {
    config
        .nodes()
        .iter()
        .filter_map(|node| node.get("name").and_then(Value::as_str))
        .collect()
}

/// Resolve the configuration and write one role per line to `output`
///
/// # Errors
///
/// Returns an error if:
/// - The configuration pipeline fails
/// - The output cannot be written
pub fn execute_roles(system: &dyn System, personal_config: &str, output: &str) -> Result<()> {
    let config = ConfigPipeline::new(system, personal_config)?.run()?;
    let content: String = roles(&config)
        .into_iter()
        .map(|name| format!("{name}\n"))
        .collect();
    write_output(system, output, &content)?;
    Ok(())
}
