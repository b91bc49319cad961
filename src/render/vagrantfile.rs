//! Vagrantfile renderer
//!
//! Emits one `config.vm.define` block per projected node. Every value taken
//! from configuration is written as a double-quoted Ruby string literal.

use super::{RenderInput, Renderer};
use crate::config::document::scalar_to_string;
use crate::roles::ProjectedNode;
use anyhow::Result;
use core::fmt::Write as _;
use serde_yaml::Value;
use tracing::debug;

/// Netmask for the private network when a node does not set one
pub const DEFAULT_NETMASK: &str = "255.255.255.0";

/// `synced_folders` key describing the control repository itself
const ROOT_FOLDER: &str = "/";

/// Renders a `Vagrantfile` for the projected nodes
#[derive(Debug, Clone, Copy, Default)]
pub struct VagrantfileRenderer;

impl VagrantfileRenderer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Renderer for VagrantfileRenderer {
    fn name(&self) -> &'static str {
        "vagrantfile"
    }

    fn render(&self, input: &RenderInput<'_>) -> Result<String> {
        let mut out = String::new();

        writeln!(out, "# This file generated with Rizzo {}", env!("CARGO_PKG_VERSION"))?;
        writeln!(out, "# https://github.com/ghoneycutt/rizzo")?;
        writeln!(out, "Vagrant.configure(2) do |config|")?;
        write_proxy(&mut out, input.no_proxy.as_deref())?;

        for node in &input.nodes {
            debug!("Rendering node {}", node.name());
            writeln!(out)?;
            write_node(&mut out, node)?;
        }

        writeln!(out, "end")?;
        writeln!(out, "# -*- mode: ruby -*-")?;
        writeln!(out, "# vim:ft=ruby")?;
        Ok(out)
    }
}

fn write_proxy(out: &mut String, no_proxy: Option<&str>) -> core::fmt::Result {
    writeln!(out, "  # use 'vagrant plugin install vagrant-proxyconf' to install")?;
    writeln!(out, "  if Vagrant.has_plugin?('vagrant-proxyconf')")?;
    writeln!(out, "    config.proxy.http  = ENV['HTTP_PROXY']  if ENV['HTTP_PROXY']")?;
    writeln!(out, "    config.proxy.https = ENV['HTTPS_PROXY'] if ENV['HTTPS_PROXY']")?;
    if let Some(no_proxy) = no_proxy {
        writeln!(out, "    config.proxy.no_proxy = {}", ruby_string(no_proxy))?;
    }
    writeln!(out, "  end")
}

fn write_node(out: &mut String, node: &ProjectedNode) -> core::fmt::Result {
    let windows = flag(node, "windows");

    writeln!(
        out,
        "  config.vm.define {}, autostart: false do |cfg|",
        ruby_string(node.name())
    )?;

    if windows {
        writeln!(out, "    cfg.vm.guest = :windows")?;
        writeln!(out, "    cfg.vm.communicator = \"winrm\"")?;
    }

    for key in ["box", "box_url", "box_download_checksum", "box_download_checksum_type"] {
        if let Some(value) = text(node, key) {
            writeln!(out, "    cfg.vm.{key} = {}", ruby_string(&value))?;
        }
    }

    if let Some(memory) = text(node, "memory") {
        writeln!(out, "    cfg.vm.provider :virtualbox do |vb|")?;
        writeln!(
            out,
            "      vb.customize ['modifyvm', :id, '--memory', {}]",
            ruby_string(&memory)
        )?;
        writeln!(out, "    end")?;
    }

    if let Some(hostname) = text(node, "hostname") {
        writeln!(out, "    cfg.vm.hostname = {}", ruby_string(&hostname))?;
    }

    if let Some(ip) = text(node, "ip") {
        let netmask = text(node, "netmask").unwrap_or_else(|| DEFAULT_NETMASK.to_owned());
        writeln!(out, "    cfg.vm.network 'private_network',")?;
        writeln!(out, "      ip: {},", ruby_string(&ip))?;
        writeln!(out, "      netmask: {}", ruby_string(&netmask))?;
    }

    write_forwarded_ports(out, node)?;

    if node.is_puppetmaster() {
        write_synced_folders(out, node)?;
    }

    let guest_path = text(node, "bootstrap_guest_path");
    if let (Some(repo), Some(guest)) = (text(node, "bootstrap_repo_path"), guest_path.as_deref()) {
        writeln!(out, "    cfg.vm.synced_folder {},", ruby_string(&repo))?;
        writeln!(out, "      {},", ruby_string(guest))?;
        writeln!(out, "      owner: 'vagrant', group: 'root'")?;
    }

    if !windows {
        write_provisioners(out, node, guest_path.as_deref())?;
    }

    writeln!(out, "  end")
}

fn write_forwarded_ports(out: &mut String, node: &ProjectedNode) -> core::fmt::Result {
    let ports = node
        .get("forwarded_ports")
        .and_then(Value::as_sequence)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for port in ports {
        let guest = port.get("guest").and_then(scalar_to_string);
        let host = port.get("host").and_then(scalar_to_string);
        if let (Some(guest), Some(host)) = (guest, host) {
            writeln!(out, "    cfg.vm.network 'forwarded_port',")?;
            writeln!(out, "      guest: {},", ruby_string(&guest))?;
            writeln!(out, "      host: {}", ruby_string(&host))?;
        }
    }
    Ok(())
}

fn write_synced_folders(out: &mut String, node: &ProjectedNode) -> core::fmt::Result {
    let Some(folders) = node.get("synced_folders").and_then(Value::as_mapping) else {
        return Ok(());
    };

    for (guest, folder) in folders {
        let Some(guest) = guest.as_str() else {
            continue;
        };
        if guest == ROOT_FOLDER {
            continue;
        }
        let Some(local) = folder.get("local").and_then(scalar_to_string) else {
            debug!("Synced folder {guest} has no local path");
            continue;
        };

        let options: Vec<String> = ["owner", "group"]
            .into_iter()
            .filter_map(|key| {
                folder
                    .get(key)
                    .and_then(scalar_to_string)
                    .map(|value| format!("{key}: {}", ruby_string(&value)))
            })
            .collect();

        if options.is_empty() {
            writeln!(
                out,
                "    cfg.vm.synced_folder {}, {}",
                ruby_string(&local),
                ruby_string(guest)
            )?;
        } else {
            writeln!(
                out,
                "    cfg.vm.synced_folder {}, {},",
                ruby_string(&local),
                ruby_string(guest)
            )?;
            writeln!(out, "      {}", options.join(", "))?;
        }
    }
    Ok(())
}

fn write_provisioners(
    out: &mut String,
    node: &ProjectedNode,
    guest_path: Option<&str>,
) -> core::fmt::Result {
    if node.is_puppetmaster()
        && let Some(guest) = guest_path
        && let Some(modulepath) = node.get("modulepath").and_then(Value::as_sequence)
    {
        let joined: Vec<String> = modulepath.iter().filter_map(scalar_to_string).collect();
        let command = format!(
            "echo 'modulepath = {}' > {guest}/environment.conf",
            joined.join(":")
        );
        writeln!(out, "    cfg.vm.provision 'shell', inline: {}", ruby_string(&command))?;
    }

    if let (Some(guest), Some(script)) = (guest_path, text(node, "bootstrap_script_path")) {
        let script = if script.starts_with('/') {
            script
        } else {
            format!("{guest}/{script}")
        };
        let command = match text(node, "bootstrap_script_args") {
            Some(args) if !args.is_empty() => format!("/bin/bash {script} {args}"),
            _ => format!("/bin/bash {script}"),
        };
        writeln!(out, "    cfg.vm.provision 'shell', inline: {}", ruby_string(&command))?;
    }

    if flag(node, "update_packages") {
        writeln!(out, "    cfg.vm.provision 'shell', inline: \"yum -y update\"")?;
    }
    if flag(node, "shutdown") {
        writeln!(out, "    cfg.vm.provision 'shell', inline: \"/sbin/shutdown -h now\"")?;
    }
    Ok(())
}

fn text(node: &ProjectedNode, key: &str) -> Option<String> {
    node.get(key).and_then(scalar_to_string)
}

/// Only a real boolean `true` switches a feature on
fn flag(node: &ProjectedNode, key: &str) -> bool {
    matches!(node.get(key), Some(Value::Bool(true)))
}

/// Quote `raw` as a Ruby double-quoted string literal
#[must_use]
pub fn ruby_string(raw: &str) -> String {
    let mut quoted = String::with_capacity(raw.len() + 2);
    quoted.push('"');

    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            '\n' => quoted.push_str("\\n"),
            '#' if matches!(chars.peek(), Some('{' | '@' | '$')) => quoted.push_str("\\#"),
            _ => quoted.push(c),
        }
    }

    quoted.push('"');
    quoted
}
