use clap::{Parser, Subcommand};

/// Command-line arguments for rizzo
#[derive(Parser, Debug, Clone)]
#[command(name = "rizzo")]
#[command(about = "Build a Vagrantfile from layered Puppet control repository configuration")]
#[command(long_about = None)]
#[command(version)]
pub struct Args {
    /// Rizzo personal configuration file
    #[arg(
        short,
        long,
        global = true,
        value_name = "PATH",
        env = "RZO_CONFIG",
        default_value = "~/.rizzo.yaml"
    )]
    pub config: String,

    /// Log destination: STDERR, STDOUT or a file path
    #[arg(
        short,
        long,
        global = true,
        value_name = "DEST",
        env = "RZO_LOGTO",
        default_value = "STDERR"
    )]
    pub logto: String,

    /// Set log level to INFO
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Set log level to DEBUG
    #[arg(short, long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Rizzo subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print out the combined rizzo json config
    Config {
        /// Output destination: STDOUT, STDERR or a file path
        #[arg(short, long, value_name = "DEST", env = "RZO_OUTPUT", default_value = "STDOUT")]
        output: String,
    },
    /// Initialize Vagrantfile in top level of control repo
    Generate {
        /// Vagrantfile output path
        #[arg(
            short = 'o',
            long,
            value_name = "PATH",
            env = "RZO_VAGRANTFILE",
            default_value = "Vagrantfile"
        )]
        vagrantfile: String,
    },
    /// Output a list of puppet roles, one per line
    Roles {
        /// Output destination: STDOUT, STDERR or a file path
        #[arg(short, long, value_name = "DEST", env = "RZO_OUTPUT", default_value = "STDOUT")]
        output: String,
    },
}

impl Args {
    /// Log filter directive implied by `--verbose` and `--debug`
    #[must_use]
    pub const fn log_level(&self) -> &'static str {
        if self.debug {
            "debug"
        } else if self.verbose {
            "info"
        } else {
            "warn"
        }
    }
}
