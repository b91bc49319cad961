//! Rendering projected nodes into provisioning files

pub mod vagrantfile;

use crate::config::document::ConfigDocument;
use crate::roles::{ProjectedNode, Projection};
use anyhow::Result;
use serde_yaml::{Mapping, Value};

pub use vagrantfile::VagrantfileRenderer;

/// Default proxy exclusion list when `config` is present without `no_proxy`
pub const DEFAULT_NO_PROXY: &str = "localhost,127.0.0.1";

/// Everything a renderer may draw on
#[derive(Debug, Clone)]
pub struct RenderInput<'a> {
    /// Projected nodes, puppetmasters first
    pub nodes: Vec<&'a ProjectedNode>,
    pub defaults: Option<&'a Mapping>,
    pub puppetmaster: Option<&'a Mapping>,
    pub no_proxy: Option<String>,
}

impl<'a> RenderInput<'a> {
    /// Collect render input from the canonical config and its projection
    #[must_use]
    pub fn new(config: &'a ConfigDocument, projection: &'a Projection) -> Self {
        Self {
            nodes: projection.nodes().collect(),
            defaults: config.defaults(),
            puppetmaster: config.puppetmaster(),
            no_proxy: proxy_config(config),
        }
    }
}

/// Output format producer
pub trait Renderer {
    /// Short name used in log output
    fn name(&self) -> &'static str;

    /// Render `input` to text
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The output cannot be assembled
    fn render(&self, input: &RenderInput<'_>) -> Result<String>;
}

/// Proxy exclusion list, present only when the config has a `config` map
#[must_use]
pub fn proxy_config(config: &ConfigDocument) -> Option<String> {
    let section = config.get("config")?.as_mapping()?;
    Some(
        section
            .get("no_proxy")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_NO_PROXY)
            .to_owned(),
    )
}
