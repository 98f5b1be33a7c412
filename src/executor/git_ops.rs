//! Git phase and rollback.
//!
//! The git phase runs only when push is enabled in the task's safety config.
//! A clean working tree makes the whole phase a no-op success: no branch is
//! created and no commit is made. Pull-request creation depends on the `gh`
//! CLI; a missing `gh` downgrades that step to a warning rather than
//! failing the phase.

use super::{tool_available, ExecutionReport, Executor};
use crate::error::Result;
use crate::git;
use std::process::Command;

impl Executor<'_> {
    pub(super) fn run_git_phase(&self, report: &mut ExecutionReport) -> Result<()> {
        let settings = &self.task.safety.git;
        if !settings.push.enabled {
            return Ok(());
        }

        if !git::has_working_tree_changes(&self.workdir)? {
            println!("git: working tree clean, nothing to commit");
            return Ok(());
        }

        let branch = self.render(&settings.branch);
        let message = self.render(&settings.commit_message);

        git::checkout_or_create_branch(&self.workdir, &branch)?;
        git::run_git(&self.workdir, &["add", "-A"])?;
        git::run_git(&self.workdir, &["commit", "-m", &message])?;
        report.commits.push(git::head_sha(&self.workdir)?);

        git::run_git(
            &self.workdir,
            &["push", "-u", &self.settings.remote, &branch],
        )?;
        println!("git: pushed '{}' to {}", branch, self.settings.remote);

        if settings.push.create_pr {
            self.create_pull_request(&branch, report);
        }

        Ok(())
    }

    /// Open a PR via the `gh` CLI. Degrades to a warning when `gh` is not
    /// installed or the PR cannot be created; the phase itself stays green.
    fn create_pull_request(&self, branch: &str, report: &mut ExecutionReport) {
        let push = &self.task.safety.git.push;

        if !tool_available("gh") {
            let warning = "gh CLI not available, skipping pull request creation".to_string();
            println!("git: {}", warning);
            report.warnings.push(warning);
            return;
        }

        let title = self.render(&push.pr_title);
        let body = self.render(&push.pr_body);

        match Command::new("gh")
            .args(["pr", "create", "--head", branch, "--title", &title, "--body", &body])
            .current_dir(&self.workdir)
            .output()
        {
            Ok(output) if output.status.success() => {
                let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
                println!("git: opened pull request {}", url);
                report.pr_url = Some(url);

                if push.auto_merge
                    && let Err(warning) = self.enable_auto_merge(branch)
                {
                    println!("git: {}", warning);
                    report.warnings.push(warning);
                }
            }
            Ok(output) => {
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
                let warning = format!("pull request creation failed: {}", stderr);
                println!("git: {}", warning);
                report.warnings.push(warning);
            }
            Err(e) => {
                let warning = format!("failed to execute gh: {}", e);
                println!("git: {}", warning);
                report.warnings.push(warning);
            }
        }
    }

    fn enable_auto_merge(&self, branch: &str) -> std::result::Result<(), String> {
        let output = Command::new("gh")
            .args(["pr", "merge", branch, "--auto", "--squash"])
            .current_dir(&self.workdir)
            .output()
            .map_err(|e| format!("failed to execute gh pr merge: {}", e))?;

        if output.status.success() {
            Ok(())
        } else {
            Err(format!(
                "auto-merge not enabled: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            ))
        }
    }

    /// Destructive recovery after a failed run: checkout the base branch,
    /// hard-reset the tree to HEAD, and remove untracked files.
    ///
    /// Best-effort: rollback failures are logged, never escalated.
    pub(super) fn rollback(&self, report: &mut ExecutionReport) {
        println!(
            "rolling back '{}' to base branch '{}'",
            self.task.name, self.task.context.branch
        );

        let operations: [&[&str]; 3] = [
            &["checkout", self.task.context.branch.as_str()],
            &["reset", "--hard", "HEAD"],
            &["clean", "-fd"],
        ];

        for args in operations {
            if let Err(e) = git::run_git(&self.workdir, args) {
                let warning = format!("rollback: git {} failed: {}", args[0], e);
                eprintln!("{}", warning);
                report.warnings.push(warning);
            }
        }
    }
}
