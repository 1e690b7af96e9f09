//! Terminal styling helpers

use indicatif::ProgressStyle;
use owo_colors::{OwoColorize, Stream};
use std::fmt::Display;

/// Color roles used across command output.
///
/// Colors are dropped when stdout does not support them.
pub trait Stylize: Display {
    /// Secondary text
    fn muted(&self) -> String {
        let text = self.to_string();
        text.if_supports_color(Stream::Stdout, |t| t.dimmed())
            .to_string()
    }

    /// Headings
    fn emphasis(&self) -> String {
        let text = self.to_string();
        text.if_supports_color(Stream::Stdout, |t| t.bold())
            .to_string()
    }

    /// Branch names and counts
    fn accent(&self) -> String {
        let text = self.to_string();
        text.if_supports_color(Stream::Stdout, |t| t.cyan())
            .to_string()
    }

    /// Completed work
    fn success(&self) -> String {
        let text = self.to_string();
        text.if_supports_color(Stream::Stdout, |t| t.green())
            .to_string()
    }

    /// Failures and anything needing attention
    fn warn(&self) -> String {
        let text = self.to_string();
        text.if_supports_color(Stream::Stdout, |t| t.yellow())
            .to_string()
    }
}

impl<T: Display + ?Sized> Stylize for T {}

/// Green check mark
pub fn check() -> String {
    "✓".success()
}

/// Spinner used while talking to git and the host
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "✓"])
}
