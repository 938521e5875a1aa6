//! Terminal styling helpers.
//!
//! Thin extension trait over `owo-colors` so call sites read as
//! `"text".accent()` rather than spelling out color names everywhere.
//! Colors are only emitted when the stream supports them.

use owo_colors::{OwoColorize, Stream};

/// Styling roles used across the CLI output.
pub trait Stylize {
    /// Bold, for headers and important statements
    fn emphasis(&self) -> String;
    /// Cyan, for phase markers and command text
    fn accent(&self) -> String;
    /// Dimmed, for secondary information
    fn muted(&self) -> String;
    /// Green, for success messages
    fn success(&self) -> String;
    /// Yellow, for warnings and reminders
    fn warn(&self) -> String;
    /// Red, for errors and dangerous prompts
    fn danger(&self) -> String;
}

impl Stylize for str {
    fn emphasis(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.bold()).to_string()
    }

    fn accent(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.cyan()).to_string()
    }

    fn muted(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.dimmed()).to_string()
    }

    fn success(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.green()).to_string()
    }

    fn warn(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.yellow()).to_string()
    }

    fn danger(&self) -> String {
        self.if_supports_color(Stream::Stdout, |t| t.red()).to_string()
    }
}

impl Stylize for String {
    fn emphasis(&self) -> String {
        self.as_str().emphasis()
    }

    fn accent(&self) -> String {
        self.as_str().accent()
    }

    fn muted(&self) -> String {
        self.as_str().muted()
    }

    fn success(&self) -> String {
        self.as_str().success()
    }

    fn warn(&self) -> String {
        self.as_str().warn()
    }

    fn danger(&self) -> String {
        self.as_str().danger()
    }
}
