//! Repository context resolution for grove.
//!
//! Finds the Git repository root from any working directory and resolves the
//! paths grove state lives under. All commands go through this module so the
//! queue, history, and log files always land in the canonical `.grove/`
//! directory regardless of where the command is invoked from.

use crate::error::{GroveError, Result};
use crate::git;
use std::env;
use std::path::{Path, PathBuf};

/// Grove state directory relative to repo root.
pub const STATE_DIR: &str = ".grove";

/// Directory that holds per-task worktrees (owned by the worktree registry).
pub const WORKTREES_DIR: &str = ".worktrees";

/// Resolved paths for grove operations. All paths are absolute.
#[derive(Debug, Clone)]
pub struct GroveContext {
    /// Absolute path to the repository root (primary checkout).
    pub repo_root: PathBuf,

    /// Absolute path to the grove state directory (`{repo_root}/.grove/`).
    pub state_dir: PathBuf,
}

impl GroveContext {
    /// Resolve the context from the current working directory.
    pub fn resolve() -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| {
            GroveError::UserError(format!("failed to get current working directory: {}", e))
        })?;
        Self::resolve_from(&cwd)
    }

    /// Resolve the context from a specific directory.
    ///
    /// Useful for tests or when the working directory is known.
    pub fn resolve_from<P: AsRef<Path>>(cwd: P) -> Result<Self> {
        let repo_root = git::get_repo_root(cwd)?;
        Ok(Self::at_root(repo_root))
    }

    /// Build a context for a known repository root without consulting git.
    pub fn at_root(repo_root: PathBuf) -> Self {
        let state_dir = repo_root.join(STATE_DIR);
        Self {
            repo_root,
            state_dir,
        }
    }

    /// Path to the agent task configuration file.
    pub fn agents_config_path(&self) -> PathBuf {
        self.state_dir.join("agents.yaml")
    }

    /// Path to the durable task queue file.
    pub fn queue_path(&self) -> PathBuf {
        self.state_dir.join("queue.json")
    }

    /// Path to the execution history file.
    pub fn history_path(&self) -> PathBuf {
        self.state_dir.join("history.json")
    }

    /// Path to the plain-text agent scheduler log.
    pub fn agent_log_path(&self) -> PathBuf {
        self.state_dir.join("agent.log")
    }

    /// Resolve the working directory for a target worktree name.
    ///
    /// Worktree creation belongs to the worktree registry; the agent core only
    /// resolves directories that already exist. An empty name, or a name with
    /// no matching directory under `.worktrees/`, falls back to the primary
    /// checkout.
    pub fn resolve_worktree(&self, name: &str) -> PathBuf {
        if name.is_empty() {
            return self.repo_root.clone();
        }
        let candidate = self.repo_root.join(WORKTREES_DIR).join(name);
        if candidate.is_dir() {
            candidate
        } else {
            self.repo_root.clone()
        }
    }
}
