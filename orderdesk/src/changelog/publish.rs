//! Optional commit/push step for the changelog file.
//!
//! Runs after a successful changelog write and never alters the exit
//! status the write established: "nothing to commit" is a benign no-op,
//! any other failure is logged by the caller and swallowed.

use std::path::Path;
use std::process::Output;

use tokio::process::Command;
use tracing::info;

use crate::changelog::PipelineError;

/// Committer identity and commit message for the publish step.
#[derive(Debug, Clone)]
pub struct CommitOptions {
    pub author: String,
    pub email: String,
    pub message: String,
    pub push: bool,
}

impl Default for CommitOptions {
    fn default() -> Self {
        Self {
            author: "orderdesk-bot".to_string(),
            email: "orderdesk-bot@users.noreply.github.com".to_string(),
            message: "chore: update AI changelog [skip ci]".to_string(),
            push: false,
        }
    }
}

/// Result of a publish attempt that did not error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    Committed,
    NothingToCommit,
}

/// Stage and commit `file` inside the repository at `root`, pushing when
/// requested.
pub async fn publish(
    root: &Path,
    file: &Path,
    options: &CommitOptions,
) -> Result<PublishOutcome, PipelineError> {
    run_git(root, &["config", "user.name", &options.author]).await?;
    run_git(root, &["config", "user.email", &options.email]).await?;

    let file_arg = file.to_string_lossy();
    run_git(root, &["add", file_arg.as_ref()]).await?;

    let commit = git_output(root, &["commit", "-m", &options.message]).await?;
    if !commit.status.success() {
        let stdout = String::from_utf8_lossy(&commit.stdout);
        let stderr = String::from_utf8_lossy(&commit.stderr);
        if is_nothing_to_commit(&stdout, &stderr) {
            info!("changelog unchanged, nothing to commit");
            return Ok(PublishOutcome::NothingToCommit);
        }
        return Err(PipelineError::Publish(format!(
            "git commit failed: {}",
            stderr.trim()
        )));
    }

    if options.push {
        run_git(root, &["push"]).await?;
    }

    info!("changelog committed{}", if options.push { " and pushed" } else { "" });
    Ok(PublishOutcome::Committed)
}

/// Recognize git's no-op commit report on either stream.
pub fn is_nothing_to_commit(stdout: &str, stderr: &str) -> bool {
    stdout.contains("nothing to commit") || stderr.contains("nothing to commit")
}

async fn git_output(root: &Path, args: &[&str]) -> Result<Output, PipelineError> {
    Command::new("git")
        .arg("-C")
        .arg(root)
        .args(args)
        .output()
        .await
        .map_err(|e| PipelineError::Publish(format!("failed to run git {}: {}", args.join(" "), e)))
}

async fn run_git(root: &Path, args: &[&str]) -> Result<(), PipelineError> {
    let output = git_output(root, args).await?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(PipelineError::Publish(format!(
            "git {} failed: {}",
            args.join(" "),
            stderr.trim()
        )));
    }
    Ok(())
}
