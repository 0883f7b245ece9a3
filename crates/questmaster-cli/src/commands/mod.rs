pub mod account;
pub mod config;
pub mod data;
pub mod profile;
pub mod quiz;
pub mod remind;
pub mod settings;
pub mod stats;
pub mod task;

use std::sync::Arc;

use questmaster_core::backend::BackendClient;
use questmaster_core::{AppController, Config, Event, NotificationSink, Severity};

/// Prints notifications to stderr so stdout stays machine-readable.
pub struct ConsoleSink;

impl NotificationSink for ConsoleSink {
    fn notify(&self, event: &Event) {
        let marker = match event.severity() {
            Severity::Success => "+",
            Severity::Info => "-",
            Severity::Warning => "!",
            Severity::Error => "x",
        };
        eprintln!("[{marker}] {}", event.message());
    }
}

/// Open the player's saved session.
pub fn open_session(config: &Config) -> Result<AppController, Box<dyn std::error::Error>> {
    Ok(AppController::open(config, Arc::new(ConsoleSink))?)
}

/// Backend client and recipient for task emails, when the backend is
/// enabled and the player wants email and has an address on file.
pub fn email_target(
    config: &Config,
    app: &AppController,
) -> Result<Option<(BackendClient, String)>, Box<dyn std::error::Error>> {
    let email = app.profile().email.trim();
    if !config.backend.enabled || email.is_empty() || !app.settings().email_notifications {
        return Ok(None);
    }
    let client = BackendClient::from_config(&config.backend)?;
    tracing::debug!(backend = %client.base_url(), "email notifications enabled");
    Ok(Some((client, email.to_string())))
}
