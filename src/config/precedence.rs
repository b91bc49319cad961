//! Control repository precedence
//!
//! Running rizzo from inside a checked-out control repository makes that
//! repository's `.rizzo.yaml` the strongest source, even when it is not
//! listed in `control_repos`.

use crate::config::loader::REPO_CONFIG_FILE;
use crate::system::System;
use crate::utils::path::normalize_path;
use std::path::{Path, PathBuf};
use tracing::debug;

/// How many directory levels are searched above the working directory
pub const MAX_SEARCH_DEPTH: usize = 100;

/// Find the nearest directory at or above `pwd` holding a `.rizzo.yaml`
///
/// Files listed in `excluded` (the personal configuration) never identify
/// a project directory. The search stops at the filesystem root or after
/// [`MAX_SEARCH_DEPTH`] levels.
#[must_use]
pub fn project_dir(system: &dyn System, pwd: &Path, excluded: &[PathBuf]) -> Option<PathBuf> {
    let excluded: Vec<PathBuf> = excluded.iter().map(|p| resolve(system, p)).collect();

    for dir in pwd.ancestors().take(MAX_SEARCH_DEPTH) {
        let candidate = dir.join(REPO_CONFIG_FILE);
        if !system.is_file(&candidate) {
            continue;
        }
        if excluded.contains(&resolve(system, &candidate)) {
            debug!("Ignoring personal config {} during project search", candidate.display());
            continue;
        }
        debug!("Found project directory {}", dir.display());
        return Some(dir.to_path_buf());
    }
    None
}

/// Move `project` to the front of `repos`, dropping duplicate entries
///
/// The result lists every path once, strongest first. Without a project
/// directory the order of `repos` is kept.
#[must_use]
pub fn reorder_repos(repos: &[PathBuf], project: Option<&Path>) -> Vec<PathBuf> {
    let mut ordered: Vec<PathBuf> = Vec::with_capacity(repos.len() + 1);

    for repo in project.into_iter().chain(repos.iter().map(PathBuf::as_path)) {
        let repo = normalize_path(repo);
        if !ordered.contains(&repo) {
            ordered.push(repo);
        }
    }
    ordered
}

/// Resolve precedence for `repos` as seen from `pwd`
#[must_use]
pub fn resolve_precedence(
    system: &dyn System,
    repos: &[PathBuf],
    pwd: &Path,
    excluded: &[PathBuf],
) -> Vec<PathBuf> {
    let project = project_dir(system, pwd, excluded);
    reorder_repos(repos, project.as_deref())
}

fn resolve(system: &dyn System, path: &Path) -> PathBuf {
    system
        .canonicalize(path)
        .unwrap_or_else(|_| normalize_path(path))
}
