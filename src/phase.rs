//! Phase execution: start/done markers and the fatal-error path.
//!
//! A phase is one ordinal step of the merge workflow. The runner prints
//! the phase marker, awaits the phase's work, and on failure walks the
//! abort path: report the error, offer to run the pending clean-up
//! tasks, and surface a phase error so no later phase runs.

use crate::cleanup::CleanupRegistry;
use crate::error::{Error, Result};
use crate::prompt::{Prompter, confirm};
use crate::style::Stylize;
use anstream::{eprintln, println};
use std::future::Future;
use std::sync::Arc;

/// Render the `PHASE <n> - <description>...` marker.
///
/// Phase 0 is reserved for the clean-up pass and renders as `PHASE X`.
fn phase_marker(number: u8, description: &str) -> String {
    let ordinal = if number == 0 {
        "X".to_string()
    } else {
        number.to_string()
    };
    format!("\n\n  PHASE {ordinal} - {description}...\n").accent()
}

/// One step of the merge workflow.
///
/// Immutable once built; the ordered list of phases is fixed
/// configuration, not runtime state.
#[derive(Debug, Clone)]
pub struct Phase {
    /// Ordinal, starting at 1
    pub number: u8,
    /// Human-readable description, shown in the phase marker
    pub description: String,
    /// Rendered commands for `--instructions` display
    pub instructions: Vec<String>,
    /// Message shown when the phase fails. `None` means the failure is
    /// reported without an alarming phase-specific message (used for the
    /// purely informational inspect phase).
    pub error: Option<String>,
}

/// Runs phases and owns the abort path.
pub struct PhaseRunner {
    registry: Arc<CleanupRegistry>,
    prompter: Arc<dyn Prompter>,
}

impl PhaseRunner {
    /// Create a runner over the shared registry and prompter.
    pub fn new(registry: Arc<CleanupRegistry>, prompter: Arc<dyn Prompter>) -> Self {
        Self { registry, prompter }
    }

    /// Run one phase, offering clean-up on failure.
    pub async fn run<T, Fut>(&self, phase: &Phase, work: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        println!("{}", phase_marker(phase.number, &phase.description));

        match work.await {
            Ok(value) => {
                println!("{}", "\n  ...done".success());
                Ok(value)
            }
            Err(err) => {
                self.report_abort(phase, &err).await;
                Err(Error::Phase {
                    number: phase.number,
                    source: Box::new(err),
                })
            }
        }
    }

    /// Report a phase failure and offer clean-up when tasks are pending.
    ///
    /// Prints the triggering error, the phase's message (when it has
    /// one), and the abort marker. The process terminates with a
    /// non-zero status once the error propagates back to `main`; by then
    /// clean-up has either run or its pending tasks have been listed.
    async fn report_abort(&self, phase: &Phase, err: &Error) {
        eprintln!("\n{err}");
        if let Some(message) = &phase.error {
            eprintln!("{}", format!("\n  ERROR: {message}").danger());
        }
        eprintln!("\n  {}", "OPERATION ABORTED!".danger().emphasis());

        if self.registry.has_pending() {
            self.offer_cleanup().await;
        }
    }

    /// Ask whether to run the pending clean-up tasks.
    ///
    /// Accepting drains the stack for real (inside its own phase marker);
    /// declining only lists what still needs manual attention. A prompt
    /// I/O failure counts as declining.
    async fn offer_cleanup(&self) {
        let question = format!(
            "Do you want to run the {} pending clean-up task(s) now?",
            self.registry.pending_descriptions().len()
        );
        let accepted = confirm(self.prompter.as_ref(), &question.warn(), false)
            .await
            .unwrap_or(false);

        if accepted {
            // Not a numbered phase, and never re-offers clean-up itself
            println!("{}", phase_marker(0, "Cleaning up"));
            let _ = self.registry.run_cleanup(false).await;
            println!("{}", "\n  ...done".success());
        } else {
            println!(
                "\n{}",
                "OK, not doing anything. The pending tasks are:".warn()
            );
            let _ = self.registry.run_cleanup(true).await;
        }
    }
}
