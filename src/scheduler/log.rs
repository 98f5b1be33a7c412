//! Plain-text scheduler log.
//!
//! Line-oriented and human-readable, with no machine-parseable schema
//! guarantee. Each line carries a UTC timestamp and the acting user@host.
//! The file is opened in append mode per write, so lines survive an
//! unclean daemon exit up to the last completed write.

use crate::error::{GroveError, Result};
use chrono::Utc;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

pub struct SchedulerLog {
    path: PathBuf,
    actor: String,
}

impl SchedulerLog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            actor: resolve_actor(),
        }
    }

    /// Append one log line. Also echoed to stdout so a foreground daemon
    /// is observable without tailing the file.
    pub fn log(&self, message: &str) -> Result<()> {
        let line = format!(
            "[{}] {}: {}",
            Utc::now().format("%Y-%m-%d %H:%M:%S UTC"),
            self.actor,
            message
        );
        println!("{}", line);

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                GroveError::UserError(format!(
                    "failed to create log directory '{}': {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| {
                GroveError::UserError(format!(
                    "failed to open log file '{}': {}",
                    self.path.display(),
                    e
                ))
            })?;

        writeln!(file, "{}", line).map_err(|e| {
            GroveError::UserError(format!(
                "failed to write log file '{}': {}",
                self.path.display(),
                e
            ))
        })
    }
}

fn resolve_actor() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());
    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());
    format!("{}@{}", user, host)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lines_accumulate_with_actor_prefix() {
        let dir = TempDir::new().unwrap();
        let log = SchedulerLog::new(dir.path().join(".grove").join("agent.log"));

        log.log("daemon started").unwrap();
        log.log("task 'npm-audit' finished in 1200ms").unwrap();

        let content =
            std::fs::read_to_string(dir.path().join(".grove").join("agent.log")).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains('@'));
        assert!(lines[0].ends_with("daemon started"));
        assert!(lines[1].ends_with("task 'npm-audit' finished in 1200ms"));
    }
}
