//! `config` subcommand: dump the canonical configuration

use crate::config::ConfigPipeline;
use crate::operations::output::write_output;
use crate::system::System;
use anyhow::Result;

/// Resolve the configuration and write it as YAML to `output`
///
/// # Errors
///
/// Returns an error if:
/// - The configuration pipeline fails
/// - The configuration cannot be serialized or written
pub fn execute_config(system: &dyn System, personal_config: &str, output: &str) -> Result<()> {
    let config = ConfigPipeline::new(system, personal_config)?.run()?;
    let yaml = config.to_yaml_string()?;
    write_output(system, output, &yaml)?;
    Ok(())
}
