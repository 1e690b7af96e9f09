//! Local working-copy access through the git CLI
//!
//! All local operations go through [`LocalRepository`]; [`GitCli`] is the
//! implementation that shells out to `git`.

mod parse;

pub use parse::{parse_local_branches, parse_remote_tracking};

use crate::error::{Error, Result};
use crate::process::{CommandError, CommandOutput, run_command};
use crate::types::LocalBranch;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// The local branch universe
#[async_trait]
pub trait LocalRepository: Send + Sync {
    /// Fetch from `remote` and drop tracking refs whose branch is gone.
    ///
    /// Must run before listing so stale tracking refs do not hide orphans.
    async fn sync_with_remote(&self, remote: &str) -> Result<()>;

    /// List local branches, marking the current checkout
    async fn list_local_branches(&self) -> Result<Vec<LocalBranch>>;

    /// List remote-tracking branch names of `remote`, prefix stripped
    async fn list_remote_tracking(&self, remote: &str) -> Result<Vec<String>>;

    /// Force-delete a local branch
    async fn delete_branch(&self, name: &str) -> Result<()>;
}

/// [`LocalRepository`] backed by the `git` executable
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
    timeout: Duration,
}

impl GitCli {
    /// Use the repository at `root` as-is
    pub fn new(root: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            root: root.into(),
            timeout,
        }
    }

    /// Find the repository containing `path` (`git rev-parse --show-toplevel`)
    pub async fn discover(path: &Path, timeout: Duration) -> Result<Self> {
        let output = run_command(
            "git",
            &["rev-parse", "--show-toplevel"],
            Some(path),
            timeout,
        )
        .await
        .map_err(|e| {
            Error::Git(format!(
                "{} is not inside a git repository ({e})",
                path.display()
            ))
        })?;
        Ok(Self::new(PathBuf::from(output.stdout), timeout))
    }

    /// Repository root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// URL of a configured remote
    pub async fn remote_url(&self, remote: &str) -> Result<String> {
        let output = run_command(
            "git",
            &["remote", "get-url", remote],
            Some(&self.root),
            self.timeout,
        )
        .await
        .map_err(|_| Error::RemoteNotFound(remote.to_string()))?;
        Ok(output.stdout)
    }

    async fn run(&self, args: &[&str]) -> Result<CommandOutput> {
        debug!(?args, "running git");
        run_command("git", args, Some(&self.root), self.timeout)
            .await
            .map_err(|e| match e {
                CommandError::TimedOut(after) => Error::Timeout {
                    operation: format!("git {}", args.join(" ")),
                    after,
                },
                other => Error::Git(format!(
                    "git {} failed: {other}",
                    args.first().unwrap_or(&"")
                )),
            })
    }
}

#[async_trait]
impl LocalRepository for GitCli {
    async fn sync_with_remote(&self, remote: &str) -> Result<()> {
        self.run(&["fetch", "--prune", remote]).await?;
        debug!(remote, "fetched and pruned");
        Ok(())
    }

    async fn list_local_branches(&self) -> Result<Vec<LocalBranch>> {
        let output = self.run(&["branch", "--list", "--no-color"]).await?;
        let branches = parse_local_branches(&output.stdout);
        debug!(count = branches.len(), "listed local branches");
        Ok(branches)
    }

    async fn list_remote_tracking(&self, remote: &str) -> Result<Vec<String>> {
        let output = self.run(&["branch", "--remotes", "--no-color"]).await?;
        let names = parse_remote_tracking(&output.stdout, remote);
        debug!(remote, count = names.len(), "listed remote-tracking branches");
        Ok(names)
    }

    async fn delete_branch(&self, name: &str) -> Result<()> {
        // `--` keeps a name starting with '-' from being read as an option
        self.run(&["branch", "-D", "--", name]).await?;
        debug!(branch = name, "deleted local branch");
        Ok(())
    }
}
