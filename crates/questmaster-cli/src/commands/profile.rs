use chrono::Local;
use clap::Subcommand;
use questmaster_core::Config;

use super::open_session;

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show the player profile
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change name and/or email
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

pub fn run(action: ProfileAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open_session(config)?;

    match action {
        ProfileAction::Show { json } => {
            let profile = app.profile();
            if json {
                println!("{}", serde_json::to_string_pretty(profile)?);
                return Ok(());
            }
            println!("Name:        {}", profile.name);
            if !profile.email.is_empty() {
                println!("Email:       {}", profile.email);
            }
            println!("Level:       {}", profile.level);
            println!("Coins:       {}", profile.coins);
            println!("Streak:      {} day(s)", profile.streak);
            println!("Completed:   {}", profile.completed_tasks);
            println!(
                "Joined:      {}",
                profile.join_date.with_timezone(&Local).format("%Y-%m-%d")
            );
        }
        ProfileAction::Update { name, email } => {
            if name.is_none() && email.is_none() {
                return Err("nothing to update".into());
            }
            let name = name.unwrap_or_else(|| app.profile().name.clone());
            let email = email.unwrap_or_else(|| app.profile().email.clone());
            app.update_profile(&name, &email)?;
        }
    }
    Ok(())
}
