//! Node role projection
//!
//! Splits the canonical node list into puppetmasters and agents and computes
//! each node's effective settings. The node's own settings always win. For
//! puppetmasters `defaults` beats `puppetmaster`, which only fills gaps.

use crate::config::document::{ConfigDocument, PUPPETMASTER};
use crate::config::merge::layered;
use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

/// A node with its effective settings
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedNode {
    settings: ConfigDocument,
    puppetmaster: bool,
}

impl ProjectedNode {
    /// The node's `name`
    #[must_use]
    pub fn name(&self) -> &str {
        self.settings
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    #[must_use]
    pub const fn is_puppetmaster(&self) -> bool {
        self.puppetmaster
    }

    /// Effective settings after inheritance
    #[must_use]
    pub const fn settings(&self) -> &ConfigDocument {
        &self.settings
    }

    /// Look up one effective setting
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }
}

/// Nodes partitioned by role
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Projection {
    pub puppetmasters: Vec<ProjectedNode>,
    pub agents: Vec<ProjectedNode>,
}

impl Projection {
    /// Every node, puppetmasters first, each group in input order
    pub fn nodes(&self) -> impl Iterator<Item = &ProjectedNode> {
        self.puppetmasters.iter().chain(self.agents.iter())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.puppetmasters.len() + self.agents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Names listed under `puppetmaster.name`
#[must_use]
pub fn puppetmaster_names(config: &ConfigDocument) -> Vec<&str> {
    config
        .puppetmaster()
        .and_then(|pm| pm.get("name"))
        .and_then(Value::as_sequence)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

/// Partition `config.nodes` into puppetmasters and agents
///
/// Absent or empty `nodes` yields an empty projection. No sorting is done.
#[must_use]
pub fn project(config: &ConfigDocument) -> Projection {
    let empty = Mapping::new();
    let defaults = config.defaults().unwrap_or(&empty);
    let pm_settings = config.puppetmaster().unwrap_or(&empty);
    let pm_names = puppetmaster_names(config);

    let mut projection = Projection::default();

    for node in config.nodes() {
        let Some(node) = node.as_mapping() else {
            warn!("Ignoring node definition that is not a map: {node:?}");
            continue;
        };
        let name = node.get("name").and_then(Value::as_str).unwrap_or_default();

        if pm_names.contains(&name) {
            let mut settings = layered(&[pm_settings, defaults, node]);
            settings.insert(Value::from(PUPPETMASTER), Value::Bool(true));
            debug!("puppetmaster {name} = {settings:?}");
            projection.puppetmasters.push(ProjectedNode {
                settings: ConfigDocument::from(settings),
                puppetmaster: true,
            });
        } else {
            let settings = layered(&[defaults, node]);
            debug!("puppetagent {name} = {settings:?}");
            projection.agents.push(ProjectedNode {
                settings: ConfigDocument::from(settings),
                puppetmaster: false,
            });
        }
    }

    projection
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "These are unit tests")]
mod tests {
    use super::*;

    fn doc(yaml: &str) -> ConfigDocument {
        serde_yaml::from_str(yaml).unwrap()
    }

    const CONFIG: &str = r#"
defaults:
  box: el6
  memory: "1024"
  shutdown: true
puppetmaster:
  name: [m1]
  modulepath: [./modules]
  memory: "2048"
  synced_folders:
    /: {}
nodes:
  - name: a1
    hostname: a1.local
    ip: 10.0.0.2
  - name: m1
    hostname: m1.local
    ip: 10.0.0.1
  - name: a2
    hostname: a2.local
    ip: 10.0.0.3
    memory: "512"
    shutdown: false
"#;

    #[test]
    fn partitions_masters_and_agents() {
        let projection = project(&doc(CONFIG));
        let masters: Vec<&str> = projection.puppetmasters.iter().map(ProjectedNode::name).collect();
        let agents: Vec<&str> = projection.agents.iter().map(ProjectedNode::name).collect();
        assert_eq!(masters, ["m1"]);
        assert_eq!(agents, ["a1", "a2"]);
        assert_eq!(projection.len(), 3);
    }

    #[test]
    fn nodes_are_masters_first_in_input_order() {
        let projection = project(&doc(CONFIG));
        let order: Vec<&str> = projection.nodes().map(ProjectedNode::name).collect();
        assert_eq!(order, ["m1", "a1", "a2"]);
    }

    #[test]
    fn masters_are_marked() {
        let projection = project(&doc(CONFIG));
        let master = &projection.puppetmasters[0];
        assert!(master.is_puppetmaster());
        assert_eq!(master.get("puppetmaster"), Some(&Value::Bool(true)));
        assert!(!projection.agents[0].is_puppetmaster());
        assert_eq!(projection.agents[0].get("puppetmaster"), None);
    }

    #[test]
    fn agents_inherit_defaults_only() {
        let projection = project(&doc(CONFIG));
        let a1 = &projection.agents[0];
        assert_eq!(a1.get("box"), Some(&Value::from("el6")));
        assert_eq!(a1.get("memory"), Some(&Value::from("1024")));
        assert_eq!(a1.get("modulepath"), None);

        let a2 = &projection.agents[1];
        assert_eq!(a2.get("memory"), Some(&Value::from("512")));
        assert_eq!(a2.get("shutdown"), Some(&Value::Bool(false)));
    }

    #[test]
    fn masters_prefer_defaults_over_puppetmaster() {
        let projection = project(&doc(CONFIG));
        let m1 = &projection.puppetmasters[0];
        assert_eq!(m1.get("memory"), Some(&Value::from("1024")));
        assert_eq!(m1.get("box"), Some(&Value::from("el6")));
        assert_eq!(m1.get("shutdown"), Some(&Value::Bool(true)));
        assert!(m1.get("modulepath").is_some());
        // The node's own name wins over the puppetmaster name list.
        assert_eq!(m1.name(), "m1");
    }

    #[test]
    fn node_settings_win_for_masters() {
        let config = doc(&CONFIG.replace(
            "  - name: m1\n",
            "  - name: m1\n    memory: \"8192\"\n",
        ));
        let projection = project(&config);
        assert_eq!(
            projection.puppetmasters[0].get("memory"),
            Some(&Value::from("8192"))
        );
    }

    #[test]
    fn puppetmaster_fills_keys_missing_from_defaults() {
        let config = doc(
            "defaults: {memory: '1024'}\n\
             puppetmaster: {name: [m], memory: '4096', box: pm-box}\n\
             nodes: [{name: m}]",
        );
        let projection = project(&config);
        let m = &projection.puppetmasters[0];
        assert_eq!(m.get("memory"), Some(&Value::from("1024")));
        assert_eq!(m.get("box"), Some(&Value::from("pm-box")));
    }

    #[test]
    fn input_is_not_modified() {
        let config = doc(CONFIG);
        let before = config.clone();
        let _projection = project(&config);
        assert_eq!(config, before);
    }

    #[test]
    fn no_nodes_is_empty() {
        let projection = project(&doc("defaults: {}\npuppetmaster: {name: [m]}"));
        assert!(projection.puppetmasters.is_empty());
        assert!(projection.agents.is_empty());
        assert!(projection.is_empty());

        let projection = project(&doc("nodes: []"));
        assert!(projection.is_empty());
    }

    #[test]
    fn missing_puppetmaster_makes_everyone_an_agent() {
        let projection = project(&doc("nodes: [{name: a}, {name: b}]"));
        assert!(projection.puppetmasters.is_empty());
        assert_eq!(projection.agents.len(), 2);
    }
}
