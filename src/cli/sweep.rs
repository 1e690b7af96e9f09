//! Sweep command - delete merged and orphaned branches

use crate::cli::CliProgress;
use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check, spinner_style};
use anstream::{eprintln, println};
use branch_sweep::error::{EXIT_INTERRUPTED, Error, Result};
use branch_sweep::sweep::{
    DeletionPlan, RunReport, Summary, TargetSummary, execute_plan, gather,
};
use branch_sweep::types::{DeletionAction, Outcome, Target};
use clap::ValueEnum;
use dialoguer::Confirm;
use indicatif::ProgressBar;
use serde::Serialize;
use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::warn;

/// Report format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON document on stdout
    Json,
}

/// Options for the sweep command
#[derive(Debug, Clone, Default)]
pub struct SweepOptions {
    /// Show the plan without deleting anything
    pub dry_run: bool,
    /// Preview the plan and prompt before deleting
    pub confirm: bool,
    /// Report format
    pub format: OutputFormat,
}

/// Stream human-readable plan output is written to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Channel {
    Stdout,
    Stderr,
}

impl SweepOptions {
    /// With `--format json` stdout carries only the JSON document
    fn preview_channel(&self) -> Channel {
        match self.format {
            OutputFormat::Text => Channel::Stdout,
            OutputFormat::Json => Channel::Stderr,
        }
    }
}

fn emit(channel: Channel, lines: &[String]) {
    for line in lines {
        match channel {
            Channel::Stdout => println!("{line}"),
            Channel::Stderr => eprintln!("{line}"),
        }
    }
}

#[derive(Serialize)]
struct JsonPlan<'a> {
    dry_run: bool,
    actions: &'a [DeletionAction],
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a RunReport,
    summary: Summary,
}

/// Run the sweep command
///
/// Returns the process exit code of a run that got as far as a plan.
#[allow(clippy::future_not_send)]
pub async fn run_sweep(ctx: &CommandContext, options: SweepOptions) -> Result<ExitCode> {
    let json = options.format == OutputFormat::Json;

    // =========================================================================
    // Phase 1: GATHER - sync, list, query merge status
    // =========================================================================

    let spinner = if json {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    spinner.set_style(spinner_style());
    spinner.enable_steady_tick(Duration::from_millis(80));
    let progress = CliProgress::with_spinner(spinner.clone(), json);

    let gather_options = ctx.config.gather_options();
    let gathered = tokio::select! {
        result = gather(ctx.platform.as_ref(), &ctx.repo, &gather_options, &progress) => result,
        Ok(()) = tokio::signal::ctrl_c() => Err(Error::Interrupted),
    };
    let snapshot = match gathered {
        Ok(snapshot) => snapshot,
        Err(e) => {
            spinner.finish_and_clear();
            return Err(e);
        }
    };
    spinner.finish_with_message(format!(
        "{} Checked {} remote and {} local branch(es) against {}",
        check(),
        snapshot.remote.len(),
        snapshot.local.len(),
        ctx.config.base_branch.emphasis()
    ));

    // =========================================================================
    // Phase 2: PLAN - pure function, easily testable
    // =========================================================================

    let plan = snapshot.plan(&ctx.config.plan_options());

    // =========================================================================
    // Phase 3: EXECUTE - effectful operations
    // =========================================================================

    if options.dry_run {
        if json {
            print_json(&JsonPlan {
                dry_run: true,
                actions: &plan.actions,
            })?;
        } else {
            emit(Channel::Stdout, &plan_lines(&plan, true));
        }
        return Ok(ExitCode::SUCCESS);
    }

    if options.confirm && !plan.is_empty() {
        let channel = options.preview_channel();
        emit(channel, &plan_lines(&plan, false));
        if !Confirm::new()
            .with_prompt("Proceed with deletion?")
            .default(false)
            .interact()
            .map_err(|e| Error::Internal(format!("Failed to read confirmation: {e}")))?
        {
            emit(channel, &["Aborted".muted()]);
            return Ok(ExitCode::SUCCESS);
        }
        emit(channel, &[String::new()]);
    }

    if !json {
        if plan.is_empty() {
            println!("{}", "No merged or orphaned branches to delete.".muted());
        } else {
            println!(
                "{} {}",
                "Deleting".emphasis(),
                format!("{} branch(es)...", plan.delete_count()).accent()
            );
        }
    }

    let interrupt = Arc::new(AtomicBool::new(false));
    let listener = {
        let interrupt = Arc::clone(&interrupt);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupt received; no further deletions will be issued");
                interrupt.store(true, Ordering::SeqCst);
            }
        })
    };

    let progress = if json {
        CliProgress::quiet()
    } else {
        CliProgress::compact()
    };
    let report = execute_plan(
        &plan,
        ctx.platform.as_ref(),
        &ctx.repo,
        &ctx.config.execute_options(),
        &progress,
        &interrupt,
    )
    .await;
    listener.abort();

    if json {
        print_json(&JsonReport {
            report: &report,
            summary: report.summary(),
        })?;
    } else {
        emit(Channel::Stdout, &report_lines(&report));
    }

    if report.interrupted {
        Ok(ExitCode::from(EXIT_INTERRUPTED))
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| Error::Internal(format!("Failed to serialize report: {e}")))?;
    println!("{text}");
    Ok(())
}

/// Plan preview. `dry_run_hint` adds the "run without --dry-run" footer.
fn plan_lines(plan: &DeletionPlan, dry_run_hint: bool) -> Vec<String> {
    let mut lines = vec![format!("{}:", "Sweep plan".emphasis()), String::new()];

    if plan.is_empty() {
        lines.push(format!("  {}", "Nothing to delete".muted()));
    }

    for action in plan.deletions() {
        lines.push(format!(
            "  {} {} branch {} ({})",
            "✗ Would delete".warn(),
            action.target,
            action.branch.accent(),
            action.reason
        ));
    }

    for action in plan.skips() {
        lines.push(format!(
            "  {} {} branch {} ({})",
            "- Would keep".muted(),
            action.target,
            action.branch,
            action.reason.muted()
        ));
    }

    lines.push(String::new());
    if dry_run_hint && !plan.is_empty() {
        lines.push("Run without --dry-run to execute.".muted());
    }
    lines
}

/// Final summary: status, per-target counts, then every action that did not
/// delete anything, by name
fn report_lines(report: &RunReport) -> Vec<String> {
    let summary = report.summary();
    let mut lines = vec![String::new()];
    if report.interrupted {
        lines.push(format!("{} Sweep interrupted", "⚠".warn()));
    } else if report.is_success() {
        lines.push(format!("{} Sweep complete", check()));
    } else {
        lines.push(format!("{} Sweep finished with failures", "⚠".warn()));
    }

    for target in [Target::Remote, Target::Local] {
        lines.push(target_summary_line(target, summary.for_target(target)));
    }

    for entry in &report.entries {
        let action = &entry.action;
        let line = if !action.is_delete() {
            format!(
                "   {} {} branch {} ({})",
                "- Kept".muted(),
                action.target,
                action.branch,
                action.reason.muted()
            )
        } else if entry.outcome == Outcome::NotAttempted {
            format!(
                "   {} {} branch {}",
                "⚠ Not attempted".warn(),
                action.target,
                action.branch.accent()
            )
        } else if let Outcome::Failed(message) = &entry.outcome {
            format!(
                "   {} {} branch {}: {}",
                "✗ Failed".warn(),
                action.target,
                action.branch.accent(),
                message.muted()
            )
        } else {
            continue;
        };
        lines.push(line);
    }
    lines
}

fn target_summary_line(target: Target, counts: &TargetSummary) -> String {
    let mut line = format!(
        "   {target}: {} deleted, {} failed, {} skipped",
        counts.deleted.accent(),
        counts.failed,
        counts.skipped_total()
    );
    if !counts.skipped.is_empty() {
        let reasons: Vec<String> = counts
            .skipped
            .iter()
            .map(|(reason, n)| format!("{n} {reason}"))
            .collect();
        line.push_str(&format!(" ({})", reasons.join(", ")).muted());
    }
    if counts.not_attempted > 0 {
        line.push_str(&format!(", {} not attempted", counts.not_attempted).warn());
    }
    line
}
