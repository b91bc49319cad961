//! Configuration management module
//!
//! Handles YAML configuration loading, JSON schema validation, control
//! repository precedence and the deep merge that produces the canonical
//! configuration.

pub mod document;
pub mod loader;
pub mod merge;
pub mod pipeline;
pub mod precedence;
pub mod schema;
pub mod validation;

pub use document::ConfigDocument;
pub use pipeline::ConfigPipeline;
pub use validation::{Issue, IssueKind, ValidationMode};
