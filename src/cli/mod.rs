//! Command-line front end

pub mod context;
pub mod style;
pub mod sweep;

use anstream::println;
use async_trait::async_trait;
use branch_sweep::sweep::ProgressCallback;
use branch_sweep::types::{DeletionAction, Outcome};
use indicatif::ProgressBar;
use style::{Stylize, check};

/// Console progress reporter
///
/// Gather messages go to the spinner when one is attached. Deletion outcomes
/// are printed as they complete unless the reporter is quiet.
pub struct CliProgress {
    spinner: Option<ProgressBar>,
    quiet: bool,
}

impl CliProgress {
    /// One line per event, no spinner
    pub const fn compact() -> Self {
        Self {
            spinner: None,
            quiet: false,
        }
    }

    /// Print nothing to stdout (machine-readable output follows)
    pub const fn quiet() -> Self {
        Self {
            spinner: None,
            quiet: true,
        }
    }

    /// Route messages to `spinner`
    pub fn with_spinner(spinner: ProgressBar, quiet: bool) -> Self {
        Self {
            spinner: Some(spinner),
            quiet,
        }
    }
}

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_message(&self, message: &str) {
        if let Some(spinner) = &self.spinner {
            spinner.set_message(format!("{message}..."));
        } else if !self.quiet {
            println!("{}", message.muted());
        }
    }

    async fn on_outcome(&self, action: &DeletionAction, outcome: &Outcome) {
        if self.quiet {
            return;
        }
        match outcome {
            Outcome::Succeeded => println!(
                "  {} Deleted {} branch {}",
                check(),
                action.target,
                action.branch.accent()
            ),
            Outcome::Failed(message) => {
                println!(
                    "  {} Failed to delete {} branch {}",
                    "✗".warn(),
                    action.target,
                    action.branch.accent()
                );
                println!("      {}", message.muted());
            }
            Outcome::NotAttempted => {}
        }
    }
}
