//! Command-line interface: argument parsing, banners, and wiring.

use anstream::println;
use clap::Parser;
use pr_merge::config::Config;
use pr_merge::error::Result;
use pr_merge::exec::ShellRunner;
use pr_merge::merge::{MergeOrchestrator, phase_list};
use pr_merge::patch::HttpPatchSource;
use pr_merge::prompt::TerminalPrompter;
use pr_merge::style::Stylize;
use pr_merge::types::MergeInput;
use std::sync::Arc;

/// Merge a GitHub PR into the target branch, with guided clean-up when
/// something goes wrong.
#[derive(Debug, Parser)]
#[command(name = "prm", version, about)]
pub struct Cli {
    /// Pull-request number to merge
    pub pr: u64,

    /// Repository as `owner/name`
    #[arg(long)]
    pub repo: Option<String>,

    /// Target branch to merge into
    #[arg(long)]
    pub branch: Option<String>,

    /// Print the commands each phase would run, without executing anything
    #[arg(long)]
    pub instructions: bool,
}

/// Resolve configuration and run the requested mode.
pub async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.repo.as_deref(), cli.branch.as_deref())?;
    let input = MergeInput::new(&config, cli.pr);

    if cli.instructions {
        display_instructions(&input, &config);
        return Ok(());
    }

    display_warning();
    display_header(&input);

    let orchestrator = MergeOrchestrator::new(
        config,
        cli.pr,
        Arc::new(ShellRunner::new()),
        Arc::new(TerminalPrompter::new()),
        Arc::new(HttpPatchSource::new()),
    );

    let pushed = orchestrator.merge().await?;
    display_epilogue(pushed);
    Ok(())
}

fn display_warning() {
    println!(
        "{}",
        "\n\
         :::::::::::::::::::::::::::::::::::::::::::::\n\
         ::  WARNING:                               ::\n\
         ::    This is still an experimental tool.  ::\n\
         ::    Use at your own risk!                ::\n\
         :::::::::::::::::::::::::::::::::::::::::::::\n"
            .warn()
    );
}

fn display_header(input: &MergeInput) {
    println!(
        "{}",
        format!(
            "MERGING PR #{} (to '{}#{}'):",
            input.pr_no, input.repo, input.branch
        )
        .emphasis()
    );
}

/// Print each phase's command list with the actual repo/branch/PR values
/// interpolated, without running anything.
fn display_instructions(input: &MergeInput, config: &Config) {
    println!(
        "{}",
        format!(
            "\nInstructions for merging PR #{} to '{}#{}':",
            input.pr_no, input.repo, input.branch
        )
        .emphasis()
    );

    for phase in phase_list(input, config) {
        if phase.instructions.is_empty() {
            continue;
        }
        println!(
            "{}",
            format!("\n\n  PHASE {} - {}\n", phase.number, phase.description).accent()
        );
        for instruction in &phase.instructions {
            println!("    - {}", instruction.accent());
        }
    }
    println!();
}

fn display_epilogue(pushed: bool) {
    println!("{}", "\n  OPERATION COMPLETED SUCCESSFULLY!".success());
    if !pushed {
        println!(
            "{}",
            "  (Don't forget to manually push the changes.)".warn()
        );
    }
}
