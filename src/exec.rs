//! External command execution.
//!
//! Every git/CLA/CI invocation goes through the [`CommandRunner`] trait so
//! the merge logic can be exercised with a scripted double in tests. The
//! production implementation ([`ShellRunner`]) spawns real processes via
//! `tokio::process` and inherits the terminal for interactive commands
//! (e.g. `git rebase --interactive`).

use crate::error::{Error, Result};
use async_trait::async_trait;
use std::fmt;
use std::process::{ExitStatus, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

/// A command line: program plus arguments, no shell interpretation.
#[derive(Debug, Clone)]
pub struct Cmd {
    program: String,
    args: Vec<String>,
}

impl Cmd {
    /// Start building a command for `program`.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append a single argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    fn to_tokio(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl fmt::Display for Cmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{arg}\"")?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        Ok(())
    }
}

/// Executes external commands.
///
/// All three entry points resolve only when the process has exited, and
/// treat a non-zero exit status (or signal death) as an error.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run with stdio inherited from the terminal.
    async fn run(&self, cmd: &Cmd) -> Result<()>;

    /// Run with stdout captured; stderr stays on the terminal.
    async fn run_captured(&self, cmd: &Cmd) -> Result<String>;

    /// Run with `input` piped to the child's stdin.
    async fn run_with_stdin(&self, cmd: &Cmd, input: &[u8]) -> Result<()>;
}

/// Production [`CommandRunner`] backed by `tokio::process`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellRunner;

impl ShellRunner {
    /// Create a new shell runner.
    pub fn new() -> Self {
        Self
    }
}

fn io_error(cmd: &Cmd, source: std::io::Error) -> Error {
    Error::CommandIo {
        command: cmd.to_string(),
        source,
    }
}

fn check_status(cmd: &Cmd, status: ExitStatus) -> Result<()> {
    if status.success() {
        Ok(())
    } else {
        Err(Error::CommandFailed {
            command: cmd.to_string(),
            status: status.to_string(),
        })
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, cmd: &Cmd) -> Result<()> {
        debug!(command = %cmd, "running");
        let status = cmd
            .to_tokio()
            .status()
            .await
            .map_err(|e| io_error(cmd, e))?;
        check_status(cmd, status)
    }

    async fn run_captured(&self, cmd: &Cmd) -> Result<String> {
        debug!(command = %cmd, "running (captured)");
        let output = cmd
            .to_tokio()
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .output()
            .await
            .map_err(|e| io_error(cmd, e))?;
        check_status(cmd, output.status)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn run_with_stdin(&self, cmd: &Cmd, input: &[u8]) -> Result<()> {
        debug!(command = %cmd, bytes = input.len(), "running (piped stdin)");
        let mut child = cmd
            .to_tokio()
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| io_error(cmd, e))?;

        // Take stdin and drop it after writing so the child sees EOF.
        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| Error::Internal(format!("no stdin handle for `{cmd}`")))?;
        stdin.write_all(input).await.map_err(|e| io_error(cmd, e))?;
        drop(stdin);

        let status = child.wait().await.map_err(|e| io_error(cmd, e))?;
        check_status(cmd, status)
    }
}
