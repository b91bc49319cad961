//! Operations module
//!
//! One entry point per subcommand, plus the output sink they share

pub mod config;
pub mod generate;
pub mod output;
pub mod roles;

pub use config::execute_config;
pub use generate::execute_generate;
pub use output::write_output;
pub use roles::execute_roles;
