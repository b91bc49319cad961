//! # `Rizzo`
//!
//! `Rizzo` builds a Vagrant environment for a Puppet control repository. It
//! merges the personal `~/.rizzo.yaml` with the `.rizzo.yaml` of every listed
//! control repository, validates the result and writes a `Vagrantfile`.
//!
//! ## Usage
//!
//! ```sh
//! rizzo config             # print the merged configuration as YAML
//! rizzo roles              # list node names, one per line
//! rizzo generate           # write ./Vagrantfile
//! ```
//!
//! Exit status is 0 on success, 2 when the configuration fails validation and
//! 1 for any other error.

use anyhow::{Context as _, Result};
use clap::{CommandFactory as _, Parser as _};
use clap::error::ErrorKind;
use rizzo::cli::Args;
use rizzo::error::RizzoError;
use rizzo::system::{RealSystem, System};
use rizzo::utils::path::expand_path;
use std::fs::OpenOptions;
use std::io::{self, IsTerminal as _};
use std::process;
use std::sync::Mutex;
use tracing::error;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{EnvFilter, fmt};

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => 0,
                _ => 1,
            };
            let _ = err.print();
            process::exit(code);
        }
    };

    if args.command.is_none() {
        eprintln!("{}", Args::command().render_help());
        process::exit(1);
    }

    let system = RealSystem::new();

    if let Err(err) = init_logging(&args, &system) {
        eprintln!("{err:#}");
        process::exit(1);
    }

    match rizzo::run(&args, &system) {
        Ok(()) => process::exit(0),
        Err(err) => {
            error!("{err:#}");
            let typed = err.downcast_ref::<RizzoError>();
            for issue in typed.map(RizzoError::issues).unwrap_or_default() {
                error!("{issue}");
            }
            process::exit(typed.map_or(1, RizzoError::exit_code));
        }
    }
}

/// Send log output to `--logto` at the level chosen by `--verbose`/`--debug`
///
/// `RUST_LOG` overrides the level when set.
fn init_logging(args: &Args, system: &dyn System) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(args.log_level()));

    let (writer, ansi) = match args.logto.as_str() {
        "STDERR" => (BoxMakeWriter::new(io::stderr), io::stderr().is_terminal()),
        "STDOUT" => (BoxMakeWriter::new(io::stdout), io::stdout().is_terminal()),
        dest => {
            let path = expand_path(system, dest)?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Cannot open log file {}", path.display()))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
    };

    fmt()
        .with_target(false)
        .with_ansi(ansi)
        .with_env_filter(filter)
        .with_writer(writer)
        .init();
    Ok(())
}
