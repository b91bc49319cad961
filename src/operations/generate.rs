//! `generate` subcommand: write a Vagrantfile

use crate::config::validation::{ValidationMode, validate_inform, validate_nodes};
use crate::config::{ConfigDocument, ConfigPipeline};
use crate::operations::output::write_output;
use crate::render::{RenderInput, Renderer, VagrantfileRenderer};
use crate::roles::{ProjectedNode, project};
use crate::system::System;
use anyhow::Result;
use tracing::{debug, info};

/// Project, validate and render the canonical configuration
///
/// # Errors
///
/// Returns an error if:
/// - A projected node fails the node schema (exit status 2)
/// - The renderer fails
pub fn render_config(config: &ConfigDocument, renderer: &dyn Renderer) -> Result<String> {
    let projection = project(config);
    debug!(
        "Projected {} puppetmaster(s) and {} agent(s)",
        projection.puppetmasters.len(),
        projection.agents.len()
    );

    let issues = validate_nodes(projection.nodes().map(ProjectedNode::settings));
    validate_inform(&issues, ValidationMode::Hard, "nodes")?;

    let input = RenderInput::new(config, &projection);
    debug!("Rendering with {}", renderer.name());
    renderer.render(&input)
}

/// Resolve the configuration and write a Vagrantfile to `vagrantfile`
///
/// # Errors
///
/// Returns an error if:
/// - The configuration pipeline fails
/// - Rendering fails
/// - The Vagrantfile cannot be written
pub fn execute_generate(system: &dyn System, personal_config: &str, vagrantfile: &str) -> Result<()> {
    let config = ConfigPipeline::new(system, personal_config)?.run()?;
    let content = render_config(&config, &VagrantfileRenderer::new())?;
    write_output(system, vagrantfile, &content)?;

    info!("Wrote vagrant config to {vagrantfile}");
    eprintln!("Wrote vagrant config to {vagrantfile}");
    Ok(())
}
