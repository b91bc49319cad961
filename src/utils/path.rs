//! Path manipulation and validation utilities

use crate::system::System;
use anyhow::{Result, anyhow};
use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

/// Absolute POSIX path, optionally prefixed by a Windows drive letter
static ABSOLUTE_PATH: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^([a-zA-Z]:){0,1}(/[^/]+)+$").ok());

/// Normalize a path by resolving `.` and `..` components
///
/// `..` never climbs above the root of an absolute path.
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => components.push(component),
            },
            _ => components.push(component),
        }
    }

    components.iter().collect()
}

/// Expand `~`, resolve relative paths against the current directory, and
/// normalize the result
///
/// # Errors
///
/// Returns an error if:
/// - The path starts with `~` and no home directory is known
/// - The current directory cannot be determined
pub fn expand_path(system: &dyn System, raw: &str) -> Result<PathBuf> {
    let expanded = if raw == "~" {
        home(system)?
    } else if let Some(rest) = raw.strip_prefix("~/") {
        home(system)?.join(rest)
    } else {
        PathBuf::from(raw)
    };

    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        system.current_dir()?.join(expanded)
    };

    Ok(normalize_path(&absolute))
}

fn home(system: &dyn System) -> Result<PathBuf> {
    system
        .home_dir()
        .ok_or_else(|| anyhow!("Cannot expand '~': home directory is unknown"))
}

/// Check that a configured path string is fully qualified
///
/// Accepts `/a/b` and drive-prefixed forms such as `C:/a/b`. The root, empty
/// segments and a trailing `/` are rejected.
#[must_use]
pub fn is_absolute_path(path: &str) -> bool {
    ABSOLUTE_PATH.as_ref().is_some_and(|re| re.is_match(path))
}

/// Render a path for storage in a YAML document
#[must_use]
pub fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
