use clap::Subcommand;
use questmaster_core::Config;

use super::open_session;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Show current settings
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change one setting
    Set {
        /// Setting key (emailNotifications, pushNotifications, soundEffects, theme, accentColor)
        key: String,
        /// New value
        value: String,
    },
}

pub fn run(action: SettingsAction, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = open_session(config)?;

    match action {
        SettingsAction::Show { json } => {
            let settings = app.settings();
            if json {
                println!("{}", serde_json::to_string_pretty(settings)?);
                return Ok(());
            }
            println!("Email notifications: {}", settings.email_notifications);
            println!("Push notifications:  {}", settings.push_notifications);
            println!("Sound effects:       {}", settings.sound_effects);
            println!("Theme:               {}", settings.theme);
            println!("Accent color:        {}", settings.accent_color);
        }
        SettingsAction::Set { key, value } => {
            let mut settings = app.settings().clone();
            settings.set(&key, &value)?;
            app.update_settings(settings);
        }
    }
    Ok(())
}
