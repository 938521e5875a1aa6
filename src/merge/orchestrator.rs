//! The merge orchestrator: a fixed, forward-only phase state machine.
//!
//! Phases run strictly in order; each phase's future settles before the
//! next starts. Destructive sub-steps are bracketed by schedule/unschedule
//! calls on the clean-up registry, so at any point the pending stack
//! describes exactly what would have to be undone.

use crate::cleanup::{CleanupRegistry, TaskId};
use crate::config::Config;
use crate::error::Result;
use crate::exec::{Cmd, CommandRunner};
use crate::git::GitOps;
use crate::merge::message::rewrite_commit_message;
use crate::merge::phases::phase_list;
use crate::patch::PatchSource;
use crate::phase::{Phase, PhaseRunner};
use crate::prompt::{Prompter, confirm};
use crate::style::Stylize;
use crate::types::MergeInput;
use anstream::println;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Pause before showing diff/log output so the operator notices the
/// section headers.
const INSPECT_PAUSE: Duration = Duration::from_millis(500);

/// Handles to the reversal tasks registered at construction.
///
/// The catalog is fixed for the run; phases schedule and retire these
/// as their risky sub-steps come and go.
struct Tasks {
    checkout_branch: TaskId,
    delete_temp_branch: TaskId,
    abort_am: TaskId,
    abort_rebase: TaskId,
    hard_reset: TaskId,
}

/// Drives the six merge phases against the injected collaborators.
pub struct MergeOrchestrator {
    input: MergeInput,
    config: Config,
    git: GitOps,
    runner: Arc<dyn CommandRunner>,
    prompter: Arc<dyn Prompter>,
    patches: Arc<dyn PatchSource>,
    registry: Arc<CleanupRegistry>,
    phase_runner: PhaseRunner,
    phases: Vec<Phase>,
    tasks: Tasks,
}

impl MergeOrchestrator {
    /// Build the orchestrator and register its clean-up task catalog.
    pub fn new(
        config: Config,
        pr_no: u64,
        runner: Arc<dyn CommandRunner>,
        prompter: Arc<dyn Prompter>,
        patches: Arc<dyn PatchSource>,
    ) -> Self {
        let input = MergeInput::new(&config, pr_no);
        let git = GitOps::new(Arc::clone(&runner));
        let registry = Arc::new(CleanupRegistry::new());
        let phases = phase_list(&input, &config);
        let tasks = register_tasks(&registry, &git, &input);
        let phase_runner = PhaseRunner::new(Arc::clone(&registry), Arc::clone(&prompter));

        Self {
            input,
            config,
            git,
            runner,
            prompter,
            patches,
            registry,
            phase_runner,
            phases,
            tasks,
        }
    }

    /// Run all phases in order.
    ///
    /// Resolves with whether the changes were pushed to origin. Any phase
    /// failure aborts the run after the phase runner has walked the
    /// report-and-clean-up path; later phases are never invoked.
    pub async fn merge(&self) -> Result<bool> {
        self.phase_runner
            .run(&self.phases[0], self.verify_cla())
            .await?;
        self.phase_runner
            .run(&self.phases[1], self.fetch_pr())
            .await?;
        self.phase_runner
            .run(&self.phases[2], self.merge_into_branch())
            .await?;
        self.phase_runner
            .run(&self.phases[3], self.inspect_changes())
            .await?;
        self.phase_runner
            .run(&self.phases[4], self.run_ci_checks())
            .await?;
        self.phase_runner
            .run(&self.phases[5], self.push_to_origin())
            .await
    }

    /// PHASE 1 - verify the CLA signature.
    ///
    /// A failed check degrades to an operator override prompt; declining
    /// the override surfaces the original check failure.
    async fn verify_cla(&self) -> Result<()> {
        let cmd = Cmd::new(&self.config.cla_tool)
            .arg(self.input.pr_no.to_string())
            .arg(format!("--repo={}", self.input.repo));

        match self.runner.run(&cmd).await {
            Ok(()) => Ok(()),
            Err(err) => {
                debug!(error = %err, "CLA check failed, asking for override");
                let question = format!(
                    "{} {}",
                    "Failed to verify the CLA signature. Proceed anyway?".warn(),
                    "(NOT RECOMMENDED)".danger()
                );
                if confirm(self.prompter.as_ref(), &question, false).await? {
                    Ok(())
                } else {
                    Err(err)
                }
            }
        }
    }

    /// PHASE 2 - fetch the PR as a local branch.
    ///
    /// Both the checkout and the temp branch stay scheduled for clean-up
    /// after this phase succeeds: the working tree is still in a state
    /// that phase 3 has to resolve.
    async fn fetch_pr(&self) -> Result<()> {
        let branch = &self.input.branch;

        self.git.checkout(branch).await?;
        self.registry.schedule(self.tasks.checkout_branch);

        self.git.pull_rebase(branch).await?;
        self.git.create_branch(&self.input.temp_branch).await?;
        self.registry.schedule(self.tasks.delete_temp_branch);

        let patch = self.patches.fetch(&self.input.patch_url).await?;
        self.registry
            .with_task(self.tasks.abort_am, self.git.apply_patch(&patch))
            .await
    }

    /// PHASE 3 - merge the temp branch into the target branch.
    async fn merge_into_branch(&self) -> Result<()> {
        let branch = &self.input.branch;
        let temp_branch = &self.input.temp_branch;

        // Gates the extra interactive-squash step below
        let commit_count = self.git.count_commits_since(branch).await?;

        self.git.checkout(branch).await?;
        // The checkout just happened as real work, not as a fallback
        self.registry.unschedule(self.tasks.checkout_branch);

        self.registry
            .with_task(self.tasks.abort_rebase, self.git.rebase_onto(temp_branch))
            .await?;

        self.registry
            .with_task(self.tasks.hard_reset, async {
                self.git.delete_branch(temp_branch, true).await?;
                self.registry.unschedule(self.tasks.delete_temp_branch);

                if commit_count > 1 {
                    self.git.rebase_interactive(commit_count).await?;
                }

                let old_message = self.git.head_commit_message().await?;
                let new_message = rewrite_commit_message(&old_message, self.input.pr_no);
                self.git.set_head_commit_message(&new_message).await
            })
            .await
    }

    /// PHASE 4 - show the diff and log against the remote target branch.
    async fn inspect_changes(&self) -> Result<()> {
        println!("{}", "    GIT diff:\n".warn());
        tokio::time::sleep(INSPECT_PAUSE).await;
        self.git
            .diff(&format!("origin/{}", self.input.branch))
            .await?;

        println!("{}", "\n    GIT log:\n".warn());
        tokio::time::sleep(INSPECT_PAUSE).await;
        self.git.log().await
    }

    /// PHASE 5 - optionally run the CI checks.
    async fn run_ci_checks(&self) -> Result<()> {
        let question = format!(
            "{} {}",
            "Do you want to run the CI checks now?".warn(),
            "(RECOMMENDED)".success()
        );
        if !confirm(self.prompter.as_ref(), &question, true).await? {
            return Ok(());
        }

        println!("    Initializing the CI checks...\n");
        self.runner
            .run(&Cmd::new(&self.config.ci_tool).arg("ci-checks"))
            .await
    }

    /// PHASE 6 - optionally push to origin.
    ///
    /// Resolves with `true` when the changes were pushed. Declining is
    /// not an error; the caller reminds the operator to push manually.
    async fn push_to_origin(&self) -> Result<bool> {
        let branch = &self.input.branch;
        let question = format!(
            "{} {}",
            "CAUTION".danger().emphasis(),
            format!("Do you want to push the changes to 'origin/{branch}'?").warn()
        );

        if confirm(self.prompter.as_ref(), &question, false).await? {
            self.git.push(branch).await?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/// Register the fixed catalog of reversal tasks.
///
/// The abort tasks swallow their own errors: there is legitimately
/// nothing to abort when the corresponding operation never started or
/// already finished, and a failing reversal must not block the rest of
/// the drain.
fn register_tasks(registry: &CleanupRegistry, git: &GitOps, input: &MergeInput) -> Tasks {
    let checkout_branch = {
        let git = git.clone();
        let branch = input.branch.clone();
        registry.register(format!("Check out the '{branch}' branch."), move || {
            let git = git.clone();
            let branch = branch.clone();
            async move { git.checkout(&branch).await }
        })
    };

    let delete_temp_branch = {
        let git = git.clone();
        let temp_branch = input.temp_branch.clone();
        registry.register(
            format!("Delete the '{temp_branch}' branch."),
            move || {
                let git = git.clone();
                let temp_branch = temp_branch.clone();
                async move { git.delete_branch(&temp_branch, true).await }
            },
        )
    };

    let abort_am = {
        let git = git.clone();
        registry.register("Abort `git am`.", move || {
            let git = git.clone();
            async move {
                if let Err(err) = git.abort_am().await {
                    debug!(error = %err, "ignoring git am --abort failure");
                }
                Ok(())
            }
        })
    };

    let abort_rebase = {
        let git = git.clone();
        registry.register("Abort `git rebase`.", move || {
            let git = git.clone();
            async move {
                if let Err(err) = git.abort_rebase().await {
                    debug!(error = %err, "ignoring git rebase --abort failure");
                }
                Ok(())
            }
        })
    };

    let hard_reset = {
        let git = git.clone();
        let remote_branch = format!("origin/{}", input.branch);
        registry.register(
            format!("Hard-reset to '{remote_branch}'."),
            move || {
                let git = git.clone();
                let remote_branch = remote_branch.clone();
                async move { git.hard_reset(&remote_branch).await }
            },
        )
    };

    Tasks {
        checkout_branch,
        delete_temp_branch,
        abort_am,
        abort_rebase,
        hard_reset,
    }
}
