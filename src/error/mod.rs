//! Error handling module
//!
//! Defines custom error types with appropriate exit codes

pub mod types;

pub use types::*;
