//! Scripted test doubles for the merge workflow.

use async_trait::async_trait;
use pr_merge::config::{Config, FileConfig};
use pr_merge::error::{Error, Result};
use pr_merge::exec::{Cmd, CommandRunner};
use pr_merge::patch::PatchSource;
use pr_merge::prompt::Prompter;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Resolve a config with explicit repo/branch and built-in defaults for
/// everything else.
pub fn test_config(repo: &str, branch: &str) -> Config {
    Config::resolve(&FileConfig::default(), None, None, Some(repo), Some(branch)).unwrap()
}

/// Records every command; fails commands matching configured needles and
/// serves scripted stdout for captured runs.
#[derive(Default)]
pub struct MockRunner {
    log: Mutex<Vec<String>>,
    stdin_log: Mutex<Vec<(String, Vec<u8>)>>,
    fail_on: Mutex<Vec<String>>,
    captured: Mutex<Vec<(String, String)>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any command whose rendered line contains `needle`.
    pub fn fail_matching(&self, needle: &str) {
        self.fail_on.lock().unwrap().push(needle.to_string());
    }

    /// Serve `output` as stdout for captured commands containing `needle`.
    /// Later registrations win, so tests can override scenario defaults.
    pub fn captured_output(&self, needle: &str, output: &str) {
        self.captured
            .lock()
            .unwrap()
            .push((needle.to_string(), output.to_string()));
    }

    /// All rendered command lines, in invocation order.
    pub fn commands(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Stdin bytes piped to the first command containing `needle`.
    pub fn stdin_for(&self, needle: &str) -> Option<Vec<u8>> {
        self.stdin_log
            .lock()
            .unwrap()
            .iter()
            .find(|(cmd, _)| cmd.contains(needle))
            .map(|(_, bytes)| bytes.clone())
    }

    fn record_and_check(&self, cmd: &Cmd) -> Result<String> {
        let rendered = cmd.to_string();
        self.log.lock().unwrap().push(rendered.clone());

        let failing = self
            .fail_on
            .lock()
            .unwrap()
            .iter()
            .any(|needle| rendered.contains(needle));
        if failing {
            return Err(Error::CommandFailed {
                command: rendered,
                status: "exit status: 1".to_string(),
            });
        }
        Ok(rendered)
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, cmd: &Cmd) -> Result<()> {
        self.record_and_check(cmd).map(|_| ())
    }

    async fn run_captured(&self, cmd: &Cmd) -> Result<String> {
        let rendered = self.record_and_check(cmd)?;
        let captured = self.captured.lock().unwrap();
        Ok(captured
            .iter()
            .rev()
            .find(|(needle, _)| rendered.contains(needle))
            .map(|(_, output)| output.clone())
            .unwrap_or_default())
    }

    async fn run_with_stdin(&self, cmd: &Cmd, input: &[u8]) -> Result<()> {
        let rendered = self.record_and_check(cmd)?;
        self.stdin_log
            .lock()
            .unwrap()
            .push((rendered, input.to_vec()));
        Ok(())
    }
}

/// Serves scripted answers in order; an exhausted script answers with an
/// empty line (i.e. the prompt's default).
#[derive(Default)]
pub struct MockPrompter {
    answers: Mutex<VecDeque<String>>,
    questions: Mutex<Vec<String>>,
}

impl MockPrompter {
    pub fn with_answers(answers: &[&str]) -> Self {
        Self {
            answers: Mutex::new(answers.iter().map(ToString::to_string).collect()),
            questions: Mutex::new(Vec::new()),
        }
    }

    /// Every prompt shown, in order.
    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

#[async_trait]
impl Prompter for MockPrompter {
    async fn read_answer(&self, prompt: &str) -> Result<String> {
        self.questions.lock().unwrap().push(prompt.to_string());
        Ok(self
            .answers
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }
}

/// Serves a fixed patch body and records requested URLs.
pub struct MockPatchSource {
    patch: Vec<u8>,
    urls: Mutex<Vec<String>>,
}

impl MockPatchSource {
    pub fn new(patch: &[u8]) -> Self {
        Self {
            patch: patch.to_vec(),
            urls: Mutex::new(Vec::new()),
        }
    }

    pub fn requested_urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PatchSource for MockPatchSource {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.urls.lock().unwrap().push(url.to_string());
        Ok(self.patch.clone())
    }
}
