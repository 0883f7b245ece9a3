use questmaster_core::backend::deadline_email;
use questmaster_core::{Config, TaskFilter};

use super::{email_target, open_session};

/// Send a deadline reminder for every urgent quest.
pub async fn run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let app = open_session(config)?;
    let Some((client, email)) = email_target(config, &app)? else {
        return Err("reminders need backend.enabled, an email on the profile and email notifications on".into());
    };

    let urgent = app.tasks(TaskFilter::Urgent);
    if urgent.is_empty() {
        println!("No urgent quests.");
        return Ok(());
    }

    let mut failed = 0;
    for task in &urgent {
        let outcome = client.send_deadline_reminder(&email, task).await;
        if outcome.success {
            let (_, body) = deadline_email(&task.name, task.deadline);
            println!("sent: {body}");
        } else {
            failed += 1;
            tracing::warn!(task = %task.name, error = ?outcome.error, "{}", outcome.message);
        }
    }
    if failed > 0 {
        return Err(format!("{failed} of {} reminders failed", urgent.len()).into());
    }
    Ok(())
}
