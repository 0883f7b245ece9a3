//! HTTP client for the companion server.
//!
//! Endpoints: `POST /register`, `POST /login`, `POST /task/completed`,
//! `POST /task/deadline`. All bodies are JSON.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::error::BackendError;
use crate::storage::BackendConfig;
use crate::task::Task;

/// Result of an email trigger as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct EmailOutcome {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: String,
}

/// Subject and body of the completion email.
pub fn completion_email(task_name: &str) -> (&'static str, String) {
    (
        "Task Completed!",
        format!("Congratulations! You have completed the task: {task_name}."),
    )
}

/// Subject and body of the deadline reminder.
pub fn deadline_email(task_name: &str, deadline: DateTime<Utc>) -> (&'static str, String) {
    (
        "Task Deadline Reminder",
        format!(
            "Reminder: Your task \"{task_name}\" is due on {}.",
            deadline.to_rfc3339()
        ),
    )
}

pub struct BackendClient {
    http: Client,
    base: Url,
}

impl BackendClient {
    /// Endpoints resolve under `base_url`'s path, with or without a
    /// trailing slash.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, BackendError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base })
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs.max(1)))
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Register an account. Rejected with 400 when the email is taken.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<String, BackendError> {
        self.post_for_message("register", json!({ "name": name, "email": email, "password": password }))
            .await
    }

    /// Check credentials. Rejected with 401 on mismatch.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, BackendError> {
        self.post_for_message("login", json!({ "email": email, "password": password }))
            .await
    }

    /// Ask the server to send the completion email.
    pub async fn send_task_completed(&self, email: &str, task: &Task) -> EmailOutcome {
        self.trigger_email("task/completed", json!({ "email": email, "taskName": task.name }))
            .await
    }

    /// Ask the server to send a deadline reminder.
    pub async fn send_deadline_reminder(&self, email: &str, task: &Task) -> EmailOutcome {
        self.trigger_email(
            "task/deadline",
            json!({ "email": email, "taskName": task.name, "deadline": task.deadline.to_rfc3339() }),
        )
        .await
    }

    // ── Internal ─────────────────────────────────────────────────────

    async fn post_for_message(&self, path: &str, body: serde_json::Value) -> Result<String, BackendError> {
        let url = self.base.join(path)?;
        let resp = self.http.post(url).json(&body).send().await?;
        let status = resp.status();
        let message = resp
            .json::<MessageBody>()
            .await
            .map(|b| b.message)
            .unwrap_or_default();
        if status.is_success() {
            Ok(message)
        } else {
            Err(BackendError::Rejected {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn trigger_email(&self, path: &str, body: serde_json::Value) -> EmailOutcome {
        let outcome = match self.send_email_request(path, body).await {
            Ok(outcome) => outcome,
            Err(e) => EmailOutcome {
                success: false,
                message: "Failed to reach the email service".to_string(),
                error: Some(e.to_string()),
            },
        };
        if outcome.success {
            tracing::info!(path, "email sent");
        } else {
            tracing::warn!(path, error = ?outcome.error, "email not sent");
        }
        outcome
    }

    async fn send_email_request(&self, path: &str, body: serde_json::Value) -> Result<EmailOutcome, BackendError> {
        let url = self.base.join(path)?;
        let resp = self.http.post(url).json(&body).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BackendError::Rejected {
                status: status.as_u16(),
                message,
            });
        }
        Ok(resp.json::<EmailOutcome>().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn email_wording() {
        let (subject, body) = completion_email("Write report");
        assert_eq!(subject, "Task Completed!");
        assert_eq!(body, "Congratulations! You have completed the task: Write report.");

        let due = Utc.with_ymd_and_hms(2024, 4, 1, 17, 0, 0).unwrap();
        let (_, body) = deadline_email("Write report", due);
        assert_eq!(body, "Reminder: Your task \"Write report\" is due on 2024-04-01T17:00:00+00:00.");
    }

    #[test]
    fn rejects_bad_base_url() {
        assert!(matches!(
            BackendClient::new("not a url", Duration::from_secs(1)),
            Err(BackendError::InvalidUrl(_))
        ));
    }

    #[test]
    fn endpoints_keep_the_base_path() {
        for base in ["http://localhost:3000/api", "http://localhost:3000/api/"] {
            let client = BackendClient::new(base, Duration::from_secs(1)).unwrap();
            assert_eq!(client.base_url().as_str(), "http://localhost:3000/api/");
            assert_eq!(
                client.base_url().join("register").unwrap().as_str(),
                "http://localhost:3000/api/register"
            );
        }
        let root = BackendClient::new("http://localhost:3000", Duration::from_secs(1)).unwrap();
        assert_eq!(root.base_url().as_str(), "http://localhost:3000/");
    }
}
