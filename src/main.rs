//! Binary entry point for `prm`.

mod cli;

use clap::Parser;
use clap::error::ErrorKind;
use pr_merge::error::Error;
use pr_merge::style::Stylize;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Logging is off unless PRM_LOG is set (e.g. PRM_LOG=debug)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("PRM_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let cli = match cli::Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help/--version are not failures; missing PR number is
            let code = match err.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
            let _ = err.print();
            return code;
        }
    };

    match cli::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::Phase { .. }) => {
            // Already reported (and clean-up offered) by the phase runner
            ExitCode::FAILURE
        }
        Err(err @ (Error::InvalidRepo(_) | Error::Config(_))) => {
            anstream::eprintln!("{}", format!("\n  ERROR: {err}").danger());
            anstream::eprintln!(
                "\n  USAGE: prm <PRNO> [--branch=<BRANCH>] [--repo=<REPO>]"
            );
            ExitCode::FAILURE
        }
        Err(err) => {
            anstream::eprintln!("\n{err}");
            anstream::eprintln!("{}", "\n  ERROR: Unexpected error!".danger());
            anstream::eprintln!("\n  {}", "OPERATION ABORTED!".danger().emphasis());
            ExitCode::FAILURE
        }
    }
}
