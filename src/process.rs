//! External process invocation with captured output and a time budget

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Output of a command that exited successfully
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Standard output (trimmed)
    pub stdout: String,
    /// Standard error (trimmed)
    pub stderr: String,
}

/// Why a command did not produce usable output
#[derive(Debug)]
pub enum CommandError {
    /// The program could not be started (not installed, bad cwd)
    Spawn(std::io::Error),
    /// The time budget elapsed; the child was killed
    TimedOut(Duration),
    /// Non-zero exit status
    Failed {
        /// Exit code, `None` when killed by a signal
        code: Option<i32>,
        /// stderr, or stdout when stderr was empty
        message: String,
    },
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn(e) => write!(f, "failed to start: {e}"),
            Self::TimedOut(after) => write!(f, "timed out after {}s", after.as_secs()),
            Self::Failed {
                code: Some(code),
                message,
            } => write!(f, "exit code {code}: {message}"),
            Self::Failed {
                code: None,
                message,
            } => write!(f, "terminated by signal: {message}"),
        }
    }
}

/// Run `program args...`, killing it if `timeout` elapses.
///
/// Only the exit status and the captured streams are consulted.
pub async fn run_command(
    program: &str,
    args: &[&str],
    cwd: Option<&Path>,
    timeout: Duration,
) -> Result<CommandOutput, CommandError> {
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = cwd {
        command.current_dir(dir);
    }

    let output = tokio::time::timeout(timeout, command.output())
        .await
        .map_err(|_| CommandError::TimedOut(timeout))?
        .map_err(CommandError::Spawn)?;

    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

    if output.status.success() {
        Ok(CommandOutput { stdout, stderr })
    } else {
        let message = if stderr.is_empty() { stdout } else { stderr };
        Err(CommandError::Failed {
            code: output.status.code(),
            message,
        })
    }
}
