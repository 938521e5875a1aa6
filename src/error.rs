//! Error types for pr-merge

use thiserror::Error;

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, Error>;

/// All errors that can occur in pr-merge
#[derive(Debug, Error)]
pub enum Error {
    /// Repository argument did not look like `owner/name`
    #[error("invalid repository '{0}' (expected 'owner/name')")]
    InvalidRepo(String),

    /// An external command exited with a non-zero status or was killed
    #[error("command `{command}` failed ({status})")]
    CommandFailed {
        /// The rendered command line
        command: String,
        /// Exit status description (code or signal)
        status: String,
    },

    /// An external command could not be spawned or its I/O failed
    #[error("failed to run `{command}`: {source}")]
    CommandIo {
        /// The rendered command line
        command: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Downloading the PR patch failed
    #[error("failed to fetch patch from {url}: {source}")]
    PatchFetch {
        /// The patch URL
        url: String,
        /// Underlying HTTP error
        #[source]
        source: reqwest::Error,
    },

    /// Reading an interactive answer failed
    #[error("failed to read answer: {0}")]
    Prompt(String),

    /// Configuration file could not be read or parsed
    #[error("config error: {0}")]
    Config(String),

    /// A merge phase failed; wraps the error that triggered the abort
    #[error("phase {number} failed")]
    Phase {
        /// Ordinal of the failed phase
        number: u8,
        /// The error that caused the failure
        #[source]
        source: Box<Error>,
    },

    /// Catch-all for internal errors
    #[error("{0}")]
    Internal(String),
}

impl Error {
    /// Ordinal of the failed phase, if this is a phase failure.
    pub fn phase_number(&self) -> Option<u8> {
        match self {
            Self::Phase { number, .. } => Some(*number),
            _ => None,
        }
    }
}
