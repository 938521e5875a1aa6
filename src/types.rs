//! Core types for pr-merge

use crate::config::Config;

/// Immutable input for one merge run, derived from configuration plus the
/// PR number given on the command line.
#[derive(Debug, Clone)]
pub struct MergeInput {
    /// Repository as `owner/name`
    pub repo: String,
    /// Target branch to merge into
    pub branch: String,
    /// Pull-request number
    pub pr_no: u64,
    /// Ephemeral branch the PR patch is staged on (`pr-<prNo>`)
    pub temp_branch: String,
    /// URL the PR patch is fetched from
    pub patch_url: String,
}

impl MergeInput {
    /// Derive the merge input from the resolved configuration.
    pub fn new(config: &Config, pr_no: u64) -> Self {
        Self {
            repo: config.repo.clone(),
            branch: config.branch.clone(),
            pr_no,
            temp_branch: format!("pr-{pr_no}"),
            patch_url: format!(
                "https://{}/raw/{}/pull/{}.patch",
                config.patch_host, config.repo, pr_no
            ),
        }
    }
}
