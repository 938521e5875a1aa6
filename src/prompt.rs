//! Interactive yes/no confirmation.
//!
//! The terminal I/O sits behind the [`Prompter`] trait; the yes/no
//! interpretation itself is a pure function so the defaulting and
//! matching rules stay unit-testable.

use crate::error::{Error, Result};
use crate::style::Stylize;
use async_trait::async_trait;

/// Reads one line of operator input.
#[async_trait]
pub trait Prompter: Send + Sync {
    /// Show `prompt` and return the raw answer line.
    async fn read_answer(&self, prompt: &str) -> Result<String>;
}

/// Production [`Prompter`] reading from the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalPrompter;

impl TerminalPrompter {
    /// Create a new terminal prompter.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Prompter for TerminalPrompter {
    async fn read_answer(&self, prompt: &str) -> Result<String> {
        let prompt = prompt.to_string();
        // dialoguer is blocking; keep it off the async executor threads
        tokio::task::spawn_blocking(move || {
            dialoguer::Input::<String>::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
                .map_err(|e| Error::Prompt(e.to_string()))
        })
        .await
        .map_err(|e| Error::Prompt(e.to_string()))?
    }
}

/// Ask a yes/no question and return the operator's choice.
///
/// The rendered prompt shows which option is the default (`[Y/n]` or
/// `[y/N]`). An empty answer takes the default; otherwise the answer is
/// matched case-insensitively against the full word or its first letter.
pub async fn confirm(
    prompter: &dyn Prompter,
    question: &str,
    default_yes: bool,
) -> Result<bool> {
    let options = if default_yes {
        format!("[{}/n]", "Y".emphasis())
    } else {
        format!("[y/{}]", "N".emphasis())
    };
    let answer = prompter
        .read_answer(&format!("\n{question} {}", options.muted()))
        .await?;
    Ok(interpret_answer(&answer, default_yes))
}

/// Interpret a raw answer against the default.
///
/// Matching is case-insensitive and accepts the full word (`yes`/`no`)
/// or its first letter. Only an explicit non-default answer flips the
/// outcome; anything else (including an empty answer) yields the default.
pub fn interpret_answer(answer: &str, default_yes: bool) -> bool {
    let non_default = if default_yes { "no" } else { "yes" };
    let flipped = matches_answer(answer, non_default);
    default_yes != flipped
}

fn matches_answer(actual: &str, expected: &str) -> bool {
    let actual = actual.trim().to_lowercase();
    actual == expected || actual == expected[..1]
}
