//! Git command runner for grove.
//!
//! Provides a safe wrapper around git commands with captured stdout/stderr
//! and structured error handling. All git operations should go through this module.

use crate::error::{GroveError, Result};
use std::path::Path;
use std::process::{Command, Output};

/// Result of a successful git command execution.
#[derive(Debug, Clone)]
pub struct GitOutput {
    /// Standard output from the command (trimmed).
    pub stdout: String,
    /// Standard error from the command (trimmed).
    pub stderr: String,
}

impl GitOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }

    /// Returns true if stdout is empty.
    pub fn is_empty(&self) -> bool {
        self.stdout.is_empty()
    }
}

/// Run a git command with the specified working directory.
///
/// # Returns
///
/// * `Ok(GitOutput)` - On successful execution (exit code 0)
/// * `Err(GroveError::GitError)` - On non-zero exit code
pub fn run_git<P: AsRef<Path>>(cwd: P, args: &[&str]) -> Result<GitOutput> {
    let cwd = cwd.as_ref();

    let output = Command::new("git")
        .current_dir(cwd)
        .args(args)
        .output()
        .map_err(|e| {
            GroveError::GitError(format!(
                "failed to execute git {}: {}",
                args.first().unwrap_or(&""),
                e
            ))
        })?;

    let git_output = GitOutput::from_output(&output);

    if output.status.success() {
        Ok(git_output)
    } else {
        let exit_code = output.status.code().unwrap_or(-1);
        let error_msg = if git_output.stderr.is_empty() {
            git_output.stdout.clone()
        } else {
            git_output.stderr.clone()
        };

        Err(GroveError::GitError(format!(
            "git {} failed (exit code {}): {}",
            args.first().unwrap_or(&""),
            exit_code,
            error_msg
        )))
    }
}

/// Get the repository root directory using `git rev-parse --show-toplevel`.
///
/// Works from any location within a git repository, including worktrees.
pub fn get_repo_root<P: AsRef<Path>>(cwd: P) -> Result<std::path::PathBuf> {
    let cwd = cwd.as_ref();

    let output = Command::new("git")
        .current_dir(cwd)
        .args(["rev-parse", "--show-toplevel"])
        .output()
        .map_err(|e| {
            GroveError::UserError(format!("failed to execute git: {} (is git installed?)", e))
        })?;

    let git_output = GitOutput::from_output(&output);

    if output.status.success() {
        Ok(std::path::PathBuf::from(&git_output.stdout))
    } else if git_output.stderr.contains("not a git repository") {
        // "not in a git repo" is a clean user error, not a git failure.
        Err(GroveError::UserError(
            "not inside a git repository. Run this command from within a git repository."
                .to_string(),
        ))
    } else {
        Err(GroveError::UserError(format!(
            "git command failed: {}",
            if git_output.stderr.is_empty() {
                &git_output.stdout
            } else {
                &git_output.stderr
            }
        )))
    }
}

/// Check whether the working tree has any changes, including untracked files.
///
/// The agent git phase is a no-op when this returns false: no branch is
/// created and no commit is made.
pub fn has_working_tree_changes<P: AsRef<Path>>(cwd: P) -> Result<bool> {
    let output = run_git(cwd, &["status", "--porcelain"])?;
    Ok(!output.is_empty())
}

/// Check whether a local branch exists.
pub fn branch_exists<P: AsRef<Path>>(cwd: P, branch: &str) -> Result<bool> {
    let cwd = cwd.as_ref();
    let output = Command::new("git")
        .current_dir(cwd)
        .args(["rev-parse", "--verify", "--quiet", &format!("refs/heads/{}", branch)])
        .output()
        .map_err(|e| GroveError::GitError(format!("failed to execute git rev-parse: {}", e)))?;
    Ok(output.status.success())
}

/// Checkout a branch, creating it from HEAD if it does not exist yet.
pub fn checkout_or_create_branch<P: AsRef<Path>>(cwd: P, branch: &str) -> Result<()> {
    let cwd = cwd.as_ref();
    if branch_exists(cwd, branch)? {
        run_git(cwd, &["checkout", branch])?;
    } else {
        run_git(cwd, &["checkout", "-b", branch])?;
    }
    Ok(())
}

/// Get the short SHA of HEAD.
pub fn head_sha<P: AsRef<Path>>(cwd: P) -> Result<String> {
    let output = run_git(cwd, &["rev-parse", "--short", "HEAD"])?;
    Ok(output.stdout)
}
