//! Cron scheduler daemon.
//!
//! Owns one timer per configured task. Each timer lives on its own thread,
//! sleeping in short slices so shutdown is noticed promptly, and fires the
//! executor directly (the queue is not involved). A tick whose previous run
//! is still in flight is skipped, never stacked. Job-body failures are
//! logged and recorded in history but never terminate the daemon.
//!
//! Lifecycle:
//!
//! ```text
//! Created -> Running -> Stopping -> Stopped
//! ```
//!
//! The config is snapshotted at start; definition changes on disk are not
//! picked up until the daemon is restarted. Shutdown is cooperative: stop
//! waits up to [`STOP_TIMEOUT`] for in-flight job bodies, then proceeds
//! regardless.

use crate::config::{AgentSettings, AgentTask, AgentsConfig};
use crate::context::GroveContext;
use crate::error::{GroveError, Result};
use crate::executor::{ExecutionReport, Executor};
use crate::history::{ExecutionHistory, ExecutionRecord};
use crate::queue::TaskStatus;
use chrono::{DateTime, Utc};
use cron::Schedule;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

mod guard;
mod log;
#[cfg(test)]
mod tests;

pub use guard::RunningGuard;
pub use log::SchedulerLog;

/// How long a timer thread sleeps between shutdown-flag checks.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// How long stop waits for in-flight job bodies before proceeding.
pub const STOP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Created,
    Running,
    Stopping,
    Stopped,
}

pub struct Scheduler {
    ctx: GroveContext,
    config: AgentsConfig,
    state: SchedulerState,
    log: Arc<SchedulerLog>,
    guard: Arc<RunningGuard>,
    in_flight: Arc<AtomicUsize>,
    handles: Vec<JoinHandle<()>>,
}

impl Scheduler {
    pub fn new(ctx: GroveContext, config: AgentsConfig) -> Self {
        let log = Arc::new(SchedulerLog::new(ctx.agent_log_path()));
        Self {
            ctx,
            config,
            state: SchedulerState::Created,
            log,
            guard: Arc::new(RunningGuard::new()),
            in_flight: Arc::new(AtomicUsize::new(0)),
            handles: Vec::new(),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Register every task and block until the shutdown flag is set, then
    /// stop. An invalid cron expression fails only that task's
    /// registration; siblings still run.
    pub fn start(&mut self, shutdown: Arc<AtomicBool>) -> Result<()> {
        if self.state != SchedulerState::Created {
            return Err(GroveError::UserError(
                "scheduler has already been started".to_string(),
            ));
        }

        let registered = self.register_tasks(&shutdown);
        log_line(
            &self.log,
            &format!(
                "daemon started, {} of {} task(s) registered",
                registered,
                self.config.agents.len()
            ),
        );
        self.state = SchedulerState::Running;

        while !shutdown.load(Ordering::SeqCst) {
            thread::sleep(POLL_INTERVAL);
        }

        self.stop();
        Ok(())
    }

    /// Spawn one timer thread per task with a parseable schedule. Returns
    /// the number of tasks registered.
    fn register_tasks(&mut self, shutdown: &Arc<AtomicBool>) -> usize {
        let mut registered = 0;

        for task in self.config.agents.clone() {
            let schedule = match parse_schedule(&task.schedule) {
                Ok(schedule) => schedule,
                Err(e) => {
                    log_line(
                        &self.log,
                        &format!("task '{}' not registered: {}", task.name, e),
                    );
                    continue;
                }
            };

            log_line(
                &self.log,
                &format!("task '{}' registered with schedule '{}'", task.name, task.schedule),
            );

            let timer = TaskTimer {
                task,
                settings: self.config.settings.clone(),
                schedule,
                ctx: self.ctx.clone(),
                guard: Arc::clone(&self.guard),
                log: Arc::clone(&self.log),
                in_flight: Arc::clone(&self.in_flight),
                shutdown: Arc::clone(shutdown),
            };
            self.handles.push(thread::spawn(move || timer.run()));
            registered += 1;
        }

        registered
    }

    /// Stop firing new ticks and wait, bounded, for in-flight job bodies.
    fn stop(&mut self) {
        self.state = SchedulerState::Stopping;
        log_line(&self.log, "daemon stopping, draining in-flight tasks");

        let deadline = Instant::now() + STOP_TIMEOUT;
        while self.in_flight.load(Ordering::SeqCst) > 0 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(100));
        }

        let still_running = self.in_flight.load(Ordering::SeqCst);
        if still_running > 0 {
            log_line(
                &self.log,
                &format!(
                    "stop timeout elapsed with {} task(s) still running",
                    still_running
                ),
            );
        }

        // Timer threads notice the shutdown flag within one poll interval;
        // only threads stuck inside a job body past the timeout are left
        // behind, and process exit reaps them.
        for handle in self.handles.drain(..) {
            if handle.is_finished() {
                let _ = handle.join();
            }
        }

        self.state = SchedulerState::Stopped;
        log_line(&self.log, "daemon stopped");
    }
}

/// One task's timer: sleeps until the next trigger time, guards against
/// self-overlap, and runs the executor.
struct TaskTimer {
    task: AgentTask,
    settings: AgentSettings,
    schedule: Schedule,
    ctx: GroveContext,
    guard: Arc<RunningGuard>,
    log: Arc<SchedulerLog>,
    in_flight: Arc<AtomicUsize>,
    shutdown: Arc<AtomicBool>,
}

impl TaskTimer {
    fn run(self) {
        loop {
            let Some(next) = self.schedule.upcoming(Utc).next() else {
                log_line(
                    &self.log,
                    &format!("task '{}' has no future trigger times, timer exiting", self.task.name),
                );
                return;
            };

            while Utc::now() < next {
                if self.shutdown.load(Ordering::SeqCst) {
                    return;
                }
                let remaining = (next - Utc::now()).to_std().unwrap_or_default();
                thread::sleep(remaining.min(POLL_INTERVAL));
            }

            if self.shutdown.load(Ordering::SeqCst) {
                return;
            }

            if !self.guard.try_begin(&self.task.name) {
                log_line(
                    &self.log,
                    &format!("task '{}' still running, skipping this tick", self.task.name),
                );
                continue;
            }

            self.in_flight.fetch_add(1, Ordering::SeqCst);
            self.tick();
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.guard.end(&self.task.name);

            // Trigger times that passed while the job body ran are never
            // stacked or run late; each one gets its own skip notice.
            for missed in missed_ticks(&self.schedule, next, Utc::now()) {
                log_line(
                    &self.log,
                    &format!(
                        "task '{}' still running at {}, tick skipped",
                        self.task.name,
                        missed.format("%Y-%m-%d %H:%M:%S UTC")
                    ),
                );
            }
        }
    }

    /// One job body. Failures are logged and recorded, never propagated.
    fn tick(&self) {
        log_line(&self.log, &format!("task '{}' started", self.task.name));
        let start = Utc::now();

        let workdir = self.ctx.repo_root.clone();
        let result = Executor::new(&self.task, &self.settings, workdir).execute();

        let end = Utc::now();
        let duration_ms = (end - start).num_milliseconds();

        match &result {
            Ok(report) => log_line(
                &self.log,
                &format!(
                    "task '{}' finished in {}ms ({} step(s), {} warning(s))",
                    self.task.name,
                    duration_ms,
                    report.steps_executed,
                    report.warnings.len()
                ),
            ),
            Err(e) => log_line(
                &self.log,
                &format!("task '{}' failed after {}ms: {}", self.task.name, duration_ms, e),
            ),
        }

        let (status, error, report) = match result {
            Ok(report) => (TaskStatus::Completed, None, Some(report)),
            Err(e) => (TaskStatus::Failed, Some(e.to_string()), None),
        };
        self.record_history(status, start, end, duration_ms, error, report);
    }

    fn record_history(
        &self,
        status: TaskStatus,
        start: chrono::DateTime<Utc>,
        end: chrono::DateTime<Utc>,
        duration_ms: i64,
        error: Option<String>,
        report: Option<ExecutionReport>,
    ) {
        let record = ExecutionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            agent_name: self.task.name.clone(),
            worktree: String::new(),
            status,
            start_time: start,
            end_time: end,
            duration_ms,
            error,
            steps_executed: report.as_ref().map(|r| r.steps_executed),
            commits: report
                .as_ref()
                .map(|r| r.commits.clone())
                .filter(|c| !c.is_empty()),
            pr_url: report.and_then(|r| r.pr_url),
        };

        let history = ExecutionHistory::new(self.ctx.history_path());
        if let Err(e) = history.append(record) {
            log_line(
                &self.log,
                &format!("failed to record history for '{}': {}", self.task.name, e),
            );
        }
    }
}

/// Parse a 5-field cron expression (minute, hour, day-of-month, month,
/// day-of-week). A seconds field of `0` is prepended, so schedules fire at
/// the top of the minute; 6-field expressions are accepted as-is.
pub fn parse_schedule(expr: &str) -> Result<Schedule> {
    let expr = expr.trim();
    let fields = expr.split_whitespace().count();
    let normalized = if fields == 5 {
        format!("0 {}", expr)
    } else {
        expr.to_string()
    };

    Schedule::from_str(&normalized)
        .map_err(|e| GroveError::ConfigError(format!("invalid cron expression '{}': {}", expr, e)))
}

/// Trigger times in `(fired, now]`: ticks that would have fired while the
/// job body for `fired` was still executing.
fn missed_ticks(
    schedule: &Schedule,
    fired: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Vec<DateTime<Utc>> {
    schedule.after(&fired).take_while(|t| *t <= now).collect()
}

fn log_line(log: &SchedulerLog, message: &str) {
    if let Err(e) = log.log(message) {
        eprintln!("warning: {}", e);
    }
}
