//! Configuration resolution pipeline
//!
//! Loads the personal configuration, resolves control repository precedence,
//! merges every repository override and validates the result.

use crate::config::document::{CONTROL_REPOS, ConfigDocument};
use crate::config::loader::{self, repo_config_path};
use crate::config::merge::merge_all;
use crate::config::precedence::resolve_precedence;
use crate::config::validation::{
    COMPLETE_CHECKS, PERSONAL_CHECKS, ValidationMode, compute_issues, validate_inform,
};
use crate::system::System;
use crate::utils::path::{expand_path, path_to_string};
use anyhow::Result;
use core::fmt;
use serde_yaml::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    LoadPersonal,
    ValidatePersonal,
    ResolvePrecedence,
    LoadAndMergeRepos,
    ValidateComplete,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::LoadPersonal => "load personal config",
            Self::ValidatePersonal => "validate personal config",
            Self::ResolvePrecedence => "resolve precedence",
            Self::LoadAndMergeRepos => "load and merge control repos",
            Self::ValidateComplete => "validate complete config",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Builds the canonical configuration from the personal config and every
/// control repository it names
pub struct ConfigPipeline<'a> {
    system: &'a dyn System,
    personal_path: PathBuf,
}

impl<'a> ConfigPipeline<'a> {
    /// Create a pipeline for the personal configuration at `personal_path`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path cannot be expanded (`~` with no home directory)
    pub fn new(system: &'a dyn System, personal_path: &str) -> Result<Self> {
        let personal_path = expand_path(system, personal_path)?;
        Ok(Self {
            system,
            personal_path,
        })
    }

    /// Resolved location of the personal configuration
    #[must_use]
    pub fn personal_path(&self) -> &Path {
        &self.personal_path
    }

    /// Run every stage and return the canonical configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The personal configuration cannot be read or parsed
    /// - A repository override exists but cannot be parsed
    /// - The merged configuration fails validation (exit status 2)
    pub fn run(&self) -> Result<ConfigDocument> {
        self.enter(Stage::LoadPersonal);
        let personal = loader::load(self.system, &self.personal_path)?;

        self.enter(Stage::ValidatePersonal);
        let issues = compute_issues(self.system, PERSONAL_CHECKS, &personal);
        validate_inform(&issues, ValidationMode::Soft, "personal configuration")?;

        self.enter(Stage::ResolvePrecedence);
        let repos = self.resolve_repos(&personal)?;

        self.enter(Stage::LoadAndMergeRepos);
        let mut config = self.load_repo_configs(&personal, &repos)?;
        pin_control_repos(&mut config, &personal, &repos);
        if let Ok(dump) = config.to_yaml_string() {
            debug!("Merged configuration:\n{dump}");
        }

        self.enter(Stage::ValidateComplete);
        let issues = compute_issues(self.system, COMPLETE_CHECKS, &config);
        validate_inform(
            &issues,
            ValidationMode::Hard,
            &self.personal_path.display().to_string(),
        )?;

        self.enter(Stage::Done);
        Ok(config)
    }

    /// Control repositories in precedence order, strongest first
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The current directory cannot be determined
    pub fn resolve_repos(&self, personal: &ConfigDocument) -> Result<Vec<PathBuf>> {
        let pwd = self.system.current_dir()?;
        let excluded = self.excluded_paths();
        let repos = resolve_precedence(self.system, &personal.control_repos(), &pwd, &excluded);
        debug!("Control repos in precedence order: {repos:?}");
        Ok(repos)
    }

    /// Merge every readable repository override onto `personal`
    ///
    /// `repos` is strongest first, so overrides are applied in reverse: the
    /// first repository is merged last and wins every conflict.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An override file is readable but not valid YAML
    pub fn load_repo_configs(
        &self,
        personal: &ConfigDocument,
        repos: &[PathBuf],
    ) -> Result<ConfigDocument> {
        let mut overlays = Vec::with_capacity(repos.len());

        for repo in repos.iter().rev() {
            let path = repo_config_path(repo);
            if self.system.is_file(&path) && self.system.is_readable(&path) {
                overlays.push(loader::load(self.system, &path)?);
            } else {
                debug!("Skipped {} (it is not readable)", path.display());
            }
        }

        Ok(merge_all(personal, &overlays))
    }

    fn excluded_paths(&self) -> Vec<PathBuf> {
        let mut excluded = vec![self.personal_path.clone()];
        if let Ok(default) = expand_path(self.system, loader::DEFAULT_PERSONAL_CONFIG)
            && default != self.personal_path
        {
            excluded.push(default);
        }
        excluded
    }

    fn enter(&self, stage: Stage) {
        debug!("Config pipeline stage: {stage} ({})", self.personal_path.display());
    }
}

/// Set `control_repos` to the resolved order
///
/// Returns the value a repository override had put there, if any. That value
/// never takes effect.
pub fn pin_control_repos(
    config: &mut ConfigDocument,
    personal: &ConfigDocument,
    repos: &[PathBuf],
) -> Option<Value> {
    let resolved = Value::Sequence(
        repos
            .iter()
            .map(|repo| Value::String(path_to_string(repo)))
            .collect(),
    );
    let discarded = config
        .as_mapping_mut()
        .insert(Value::from(CONTROL_REPOS), resolved)
        .filter(|merged| Some(merged) != personal.get(CONTROL_REPOS));

    if let Some(value) = discarded.as_ref() {
        debug!("Ignoring control_repos set by a control repo override: {value:?}");
    }
    discarded
}
