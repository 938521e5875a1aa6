//! Configuration: built-in defaults, optional config file, environment.
//!
//! Precedence, lowest to highest: built-in defaults, then
//! `~/.config/pr-merge/config.toml`, then `PRM_REPO`/`PRM_BRANCH`
//! environment variables, then command-line flags. The resolved
//! [`Config`] is constructed once in `main` and passed down; there is
//! no global state.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Built-in default repository.
pub const DEFAULT_REPO: &str = "angular/angular.js";

/// Built-in default target branch.
pub const DEFAULT_BRANCH: &str = "master";

/// Built-in host serving raw PR patches.
pub const DEFAULT_PATCH_HOST: &str = "patch-diff.githubusercontent.com";

/// Built-in CLA verification executable.
pub const DEFAULT_CLA_TOOL: &str = "ng-cla-check";

/// Built-in CI task-runner executable.
pub const DEFAULT_CI_TOOL: &str = "grunt";

/// Optional on-disk configuration (all fields optional).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    /// Default repository as `owner/name`
    pub repo: Option<String>,
    /// Default target branch
    pub branch: Option<String>,
    /// Host serving raw PR patches
    pub patch_host: Option<String>,
    /// CLA verification executable
    pub cla_tool: Option<String>,
    /// CI task-runner executable
    pub ci_tool: Option<String>,
}

impl FileConfig {
    /// Load the config file if it exists; an absent file is not an error.
    pub fn load() -> Result<Self> {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from an explicit path. An absent file yields the defaults; an
    /// unreadable or malformed file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
    }

    /// Path of the config file (`<config-dir>/pr-merge/config.toml`).
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pr-merge").join("config.toml"))
    }
}

/// Fully-resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Repository as `owner/name`
    pub repo: String,
    /// Target branch to merge into
    pub branch: String,
    /// Host serving raw PR patches
    pub patch_host: String,
    /// CLA verification executable
    pub cla_tool: String,
    /// CI task-runner executable
    pub ci_tool: String,
}

impl Config {
    /// Resolve the configuration from all sources.
    ///
    /// `cli_repo`/`cli_branch` are the command-line flags, which win over
    /// everything else.
    pub fn load(cli_repo: Option<&str>, cli_branch: Option<&str>) -> Result<Self> {
        let file = FileConfig::load()?;
        let env_repo = std::env::var("PRM_REPO").ok();
        let env_branch = std::env::var("PRM_BRANCH").ok();
        Self::resolve(
            &file,
            env_repo.as_deref(),
            env_branch.as_deref(),
            cli_repo,
            cli_branch,
        )
    }

    /// Pure resolution step, separated out for testing.
    pub fn resolve(
        file: &FileConfig,
        env_repo: Option<&str>,
        env_branch: Option<&str>,
        cli_repo: Option<&str>,
        cli_branch: Option<&str>,
    ) -> Result<Self> {
        let repo = cli_repo
            .or(env_repo)
            .or(file.repo.as_deref())
            .unwrap_or(DEFAULT_REPO)
            .to_string();
        let branch = cli_branch
            .or(env_branch)
            .or(file.branch.as_deref())
            .unwrap_or(DEFAULT_BRANCH)
            .to_string();

        if !repo.contains('/') {
            return Err(Error::InvalidRepo(repo));
        }

        Ok(Self {
            repo,
            branch,
            patch_host: file
                .patch_host
                .clone()
                .unwrap_or_else(|| DEFAULT_PATCH_HOST.to_string()),
            cla_tool: file
                .cla_tool
                .clone()
                .unwrap_or_else(|| DEFAULT_CLA_TOOL.to_string()),
            ci_tool: file
                .ci_tool
                .clone()
                .unwrap_or_else(|| DEFAULT_CI_TOOL.to_string()),
        })
    }
}
