//! `Rizzo` - Vagrant environments from Puppet control repositories
//!
//! This library loads a personal configuration, layers the `.rizzo.yaml` of
//! every control repository it names on top, validates the result and
//! projects nodes into puppetmaster and agent roles for rendering.

pub mod cli;
pub mod config;
pub mod error;
pub mod operations;
pub mod render;
pub mod roles;
pub mod system;
pub mod utils;

use anyhow::Result;
use cli::{Args, Command};
use error::RizzoError;
use operations::{execute_config, execute_generate, execute_roles};
use system::System;

/// Main entry point for the rizzo library
///
/// # Errors
///
/// Returns an error if:
/// - No subcommand was given
/// - The selected subcommand fails
pub fn run(args: &Args, system: &dyn System) -> Result<()> {
    match args.command.as_ref() {
        Some(Command::Config { output }) => execute_config(system, &args.config, output),
        Some(Command::Generate { vagrantfile }) => {
            execute_generate(system, &args.config, vagrantfile)
        }
        Some(Command::Roles { output }) => execute_roles(system, &args.config, output),
        None => Err(RizzoError::usage("No subcommand given. See rizzo --help").into()),
    }
}
