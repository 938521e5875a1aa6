//! Git operations used by the merge workflow.
//!
//! Thin wrappers over [`CommandRunner`] that spell out the exact git
//! command lines. Nothing here touches the clean-up registry; scheduling
//! reversal tasks around these calls is the orchestrator's job.

use crate::error::Result;
use crate::exec::{Cmd, CommandRunner};
use std::sync::Arc;
use tracing::debug;

/// Git command wrappers over a shared [`CommandRunner`].
///
/// Cheap to clone; clones share the runner.
#[derive(Clone)]
pub struct GitOps {
    runner: Arc<dyn CommandRunner>,
}

impl GitOps {
    /// Create git ops over the given runner.
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    /// `git checkout <branch>`
    pub async fn checkout(&self, branch: &str) -> Result<()> {
        self.runner
            .run(&Cmd::new("git").args(["checkout", branch]))
            .await
    }

    /// `git pull --rebase origin <branch>`
    pub async fn pull_rebase(&self, branch: &str) -> Result<()> {
        self.runner
            .run(&Cmd::new("git").args(["pull", "--rebase", "origin", branch]))
            .await
    }

    /// `git checkout -b <branch>`
    pub async fn create_branch(&self, branch: &str) -> Result<()> {
        self.runner
            .run(&Cmd::new("git").args(["checkout", "-b", branch]))
            .await
    }

    /// `git branch --delete [--force] <branch>`
    pub async fn delete_branch(&self, branch: &str, force: bool) -> Result<()> {
        let mut cmd = Cmd::new("git").args(["branch", "--delete"]);
        if force {
            cmd = cmd.arg("--force");
        }
        self.runner.run(&cmd.arg(branch)).await
    }

    /// Number of commits on `HEAD` that are not on `commit`
    /// (`git rev-list --count <commit>..HEAD`).
    pub async fn count_commits_since(&self, commit: &str) -> Result<u64> {
        let output = self
            .runner
            .run_captured(
                &Cmd::new("git")
                    .args(["rev-list", "--count"])
                    .arg(format!("{commit}..HEAD")),
            )
            .await?;
        let count = output.trim().parse::<u64>().map_err(|e| {
            crate::error::Error::Internal(format!(
                "unexpected rev-list output {:?}: {e}",
                output.trim()
            ))
        })?;
        debug!(commit, count, "counted commits");
        Ok(count)
    }

    /// `git rebase <commit>`
    pub async fn rebase_onto(&self, commit: &str) -> Result<()> {
        self.runner
            .run(&Cmd::new("git").args(["rebase", commit]))
            .await
    }

    /// `git rebase --interactive HEAD~<count>` (for squashing)
    pub async fn rebase_interactive(&self, count: u64) -> Result<()> {
        self.runner
            .run(
                &Cmd::new("git")
                    .args(["rebase", "--interactive"])
                    .arg(format!("HEAD~{count}")),
            )
            .await
    }

    /// `git rebase --abort`
    pub async fn abort_rebase(&self) -> Result<()> {
        self.runner
            .run(&Cmd::new("git").args(["rebase", "--abort"]))
            .await
    }

    /// `git am --abort`
    pub async fn abort_am(&self) -> Result<()> {
        self.runner
            .run(&Cmd::new("git").args(["am", "--abort"]))
            .await
    }

    /// Pipe patch bytes into `git am -3`.
    pub async fn apply_patch(&self, patch: &[u8]) -> Result<()> {
        self.runner
            .run_with_stdin(&Cmd::new("git").args(["am", "-3"]), patch)
            .await
    }

    /// `git diff <commit>`
    pub async fn diff(&self, commit: &str) -> Result<()> {
        self.runner
            .run(&Cmd::new("git").args(["diff", commit]))
            .await
    }

    /// `git log`. A non-zero exit is swallowed: paged `git log` exits
    /// non-zero when the pager is quit.
    pub async fn log(&self) -> Result<()> {
        if let Err(err) = self.runner.run(&Cmd::new("git").arg("log")).await {
            debug!(error = %err, "ignoring git log exit status");
        }
        Ok(())
    }

    /// `git reset --hard <commit>`
    pub async fn hard_reset(&self, commit: &str) -> Result<()> {
        self.runner
            .run(&Cmd::new("git").args(["reset", "--hard", commit]))
            .await
    }

    /// `git push origin <branch>`
    pub async fn push(&self, branch: &str) -> Result<()> {
        self.runner
            .run(&Cmd::new("git").args(["push", "origin", branch]))
            .await
    }

    /// Full message of the `HEAD` commit
    /// (`git show --no-patch --format=%B HEAD`).
    pub async fn head_commit_message(&self) -> Result<String> {
        self.runner
            .run_captured(&Cmd::new("git").args(["show", "--no-patch", "--format=%B", "HEAD"]))
            .await
    }

    /// Rewrite the `HEAD` commit message, preserving newlines, by piping
    /// it into `git commit --amend --file=-`.
    pub async fn set_head_commit_message(&self, message: &str) -> Result<()> {
        self.runner
            .run_with_stdin(
                &Cmd::new("git").args(["commit", "--amend", "--file=-"]),
                message.as_bytes(),
            )
            .await
    }
}
