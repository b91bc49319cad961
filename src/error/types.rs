//! Custom error types with exit codes

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Main error type for rizzo operations
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RizzoError {
    /// A configuration file is missing, is not a file, or cannot be read
    #[error("Cannot read config file {}", path.display())]
    NotReadable { path: PathBuf },

    /// A configuration file is not valid YAML
    #[error("Could not parse rizzo config {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// Hard-mode validation found one or more issues
    #[error("Validation issues found with {context}")]
    Validation { context: String, issues: Vec<String> },

    /// Writing to the output sink failed
    #[error("Cannot write output to {target}: {message}")]
    Output { target: String, message: String },

    /// The command line did not select anything to do
    #[error("{message}")]
    Usage { message: String },
}

impl RizzoError {
    /// Get the appropriate exit code for this error type
    #[must_use]
    #[inline]
    pub const fn exit_code(&self) -> i32 {
        match *self {
            Self::Validation { .. } => 2,
            Self::NotReadable { .. }
            | Self::Parse { .. }
            | Self::Output { .. }
            | Self::Usage { .. } => 1,
        }
    }

    /// Create a not-readable error
    #[inline]
    pub fn not_readable<P: AsRef<Path>>(path: P) -> Self {
        Self::NotReadable {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a parse error
    #[inline]
    pub fn parse<P: AsRef<Path>, S: Into<String>>(path: P, message: S) -> Self {
        Self::Parse {
            path: path.as_ref().to_path_buf(),
            message: message.into(),
        }
    }

    /// Create a validation error carrying every issue message
    #[inline]
    pub fn validation<S: Into<String>>(context: S, issues: Vec<String>) -> Self {
        Self::Validation {
            context: context.into(),
            issues,
        }
    }

    /// Create an output error
    #[inline]
    pub fn output<T: Into<String>, S: Into<String>>(target: T, message: S) -> Self {
        Self::Output {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Create a usage error
    #[inline]
    pub fn usage<S: Into<String>>(message: S) -> Self {
        Self::Usage {
            message: message.into(),
        }
    }

    /// Issue messages carried by a validation error, empty for every other kind
    #[must_use]
    pub fn issues(&self) -> &[String] {
        match self {
            Self::Validation { issues, .. } => issues,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_exits_with_two() {
        let err = RizzoError::validation("nodes", vec!["bad".to_owned()]);
        assert_eq!(err.exit_code(), 2);
        assert_eq!(err.to_string(), "Validation issues found with nodes");
        assert_eq!(err.issues(), ["bad".to_owned()]);
    }

    #[test]
    fn operational_errors_exit_with_one() {
        assert_eq!(RizzoError::not_readable("/nope").exit_code(), 1);
        assert_eq!(RizzoError::parse("/bad.yaml", "oops").exit_code(), 1);
        assert_eq!(RizzoError::output("STDOUT", "closed").exit_code(), 1);
        assert_eq!(RizzoError::usage("no subcommand").exit_code(), 1);
        assert!(RizzoError::usage("x").issues().is_empty());
    }

    #[test]
    fn parse_error_names_the_path() {
        let err = RizzoError::parse("/home/u/.rizzo.yaml", "did not find expected key");
        let msg = err.to_string();
        assert!(msg.contains("/home/u/.rizzo.yaml"));
        assert!(msg.contains("did not find expected key"));
    }
}
