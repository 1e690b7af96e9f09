//! `sweep` - prune branches already merged into the base branch

mod cli;

use anstream::eprintln;
use branch_sweep::config::Settings;
use branch_sweep::error::Error;
use branch_sweep::types::Platform;
use clap::{ArgAction, Parser};
use cli::context::{CommandContext, ExplicitTokens};
use cli::style::Stylize;
use cli::sweep::{OutputFormat, SweepOptions, run_sweep};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Delete branches that are merged into the base branch, on the remote host
/// and in the local clone, plus local branches whose remote is gone.
#[derive(Debug, Parser)]
#[command(name = "sweep", version)]
struct Cli {
    /// Path inside the repository
    #[arg(long, default_value = ".")]
    path: PathBuf,

    /// Config file (default: .branch-sweep.toml, then the user config dir)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Git remote to sync and detect the repository from [default: origin]
    #[arg(long)]
    remote: Option<String>,

    /// Base branch merges are checked against
    #[arg(long, env = "BASE_BRANCH")]
    base: Option<String>,

    #[arg(long = "main-branch", env = "MAIN_BRANCH", hide = true)]
    main_branch: Option<String>,

    /// Repository owner (default: from the remote URL)
    #[arg(long, env = "REPO_OWNER")]
    owner: Option<String>,

    /// Repository name (default: from the remote URL)
    #[arg(long, env = "REPO_NAME")]
    repo: Option<String>,

    /// Self-hosted GitHub or GitLab host
    #[arg(long)]
    host: Option<String>,

    /// Platform, when the remote host name gives no hint
    #[arg(long, value_name = "github|gitlab")]
    platform: Option<Platform>,

    /// API token (default: GITHUB_TOKEN/GITLAB_TOKEN, then gh/glab)
    #[arg(long, hide_env_values = true)]
    token: Option<String>,

    #[arg(long = "github-token", env = "GITHUB_TOKEN", hide = true, hide_env_values = true)]
    github_token: Option<String>,

    #[arg(long = "gitlab-token", env = "GITLAB_TOKEN", hide = true, hide_env_values = true)]
    gitlab_token: Option<String>,

    /// Seconds allowed per remote call or git command [default: 30]
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Remote calls in flight at once [default: 4]
    #[arg(long)]
    concurrency: Option<usize>,

    /// Extra local branch never deleted as an orphan (repeatable; main and master always are)
    #[arg(long = "keep", value_name = "BRANCH")]
    keep: Vec<String>,

    /// Leave branches on the remote host alone
    #[arg(long)]
    no_remote: bool,

    /// Leave local branches alone
    #[arg(long)]
    no_local: bool,

    /// Show what would be deleted without deleting anything
    #[arg(long)]
    dry_run: bool,

    /// Preview the plan and ask before deleting
    #[arg(long, conflicts_with = "dry_run")]
    confirm: bool,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// More logging on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Command-line layer of the settings
    fn settings(&self) -> Settings {
        Settings {
            base_branch: self.base.clone().or_else(|| self.main_branch.clone()),
            remote: self.remote.clone(),
            owner: self.owner.clone(),
            repo: self.repo.clone(),
            host: self.host.clone(),
            platform: self.platform,
            timeout_secs: self.timeout,
            concurrency: self.concurrency,
            keep: (!self.keep.is_empty()).then(|| self.keep.clone()),
            no_remote: self.no_remote.then_some(true),
            no_local: self.no_local.then_some(true),
        }
    }

    fn tokens(&self) -> ExplicitTokens {
        ExplicitTokens {
            any: self.token.clone(),
            github: self.github_token.clone(),
            gitlab: self.gitlab_token.clone(),
        }
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = if verbose > 0 {
        EnvFilter::new(default)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine
    dotenv::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = SweepOptions {
        dry_run: cli.dry_run,
        confirm: cli.confirm,
        format: cli.format,
    };

    let result: branch_sweep::error::Result<ExitCode> = async {
        let ctx = CommandContext::new(
            &cli.path,
            cli.settings(),
            cli.config.as_deref(),
            &cli.tokens(),
        )
        .await?;
        run_sweep(&ctx, options).await
    }
    .await;

    match result {
        Ok(code) => code,
        Err(e) => report_error(&e),
    }
}

fn report_error(error: &Error) -> ExitCode {
    eprintln!("{} {error}", "error:".warn());
    if error.is_transport() {
        eprintln!("{}", "No branches were deleted; the next run will retry.".muted());
    }
    ExitCode::from(error.exit_code())
}
