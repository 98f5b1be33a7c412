//! Notification dispatch: the final, best-effort pipeline phase.
//!
//! Channels are chosen from the task's `on_success` or `on_failure` list
//! based on the run outcome. Delivery failures are logged and never fail
//! the run. Only the webhook channel delivers today; other kinds report
//! "not implemented".

use super::{ExecutionReport, Executor};
use crate::config::NotifyChannel;
use std::time::Duration;

/// Timeout for one webhook delivery attempt.
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(15);

impl Executor<'_> {
    pub(super) fn dispatch_notifications(&self, success: bool, report: &mut ExecutionReport) {
        let channels = if success {
            &self.task.notifications.on_success
        } else {
            &self.task.notifications.on_failure
        };

        for channel in channels {
            match channel {
                NotifyChannel::Webhook { url, template } => {
                    let message = self.render(template);
                    if let Err(e) = deliver_webhook(url, &message) {
                        let warning = format!("webhook notification failed: {}", e);
                        eprintln!("{}", warning);
                        report.warnings.push(warning);
                    }
                }
                other => {
                    println!(
                        "notification channel '{}' is not implemented, skipping",
                        other.kind()
                    );
                }
            }
        }
    }
}

fn deliver_webhook(url: &str, message: &str) -> std::result::Result<(), String> {
    let client = reqwest::blocking::Client::builder()
        .timeout(WEBHOOK_TIMEOUT)
        .build()
        .map_err(|e| e.to_string())?;

    let response = client
        .post(url)
        .json(&serde_json::json!({ "text": message }))
        .send()
        .map_err(|e| e.to_string())?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(format!("webhook returned status {}", response.status()))
    }
}
