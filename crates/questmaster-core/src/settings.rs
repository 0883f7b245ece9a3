//! User-facing preferences stored with the rest of the player data.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        })
    }
}

impl FromStr for Theme {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(ValidationError::invalid("theme", format!("unknown theme '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default = "default_true")]
    pub email_notifications: bool,
    #[serde(default = "default_true")]
    pub push_notifications: bool,
    #[serde(default = "default_true")]
    pub sound_effects: bool,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_accent_color")]
    pub accent_color: String,
}

fn default_true() -> bool {
    true
}
fn default_accent_color() -> String {
    "#6366f1".into()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            push_notifications: true,
            sound_effects: true,
            theme: Theme::Dark,
            accent_color: default_accent_color(),
        }
    }
}

impl Settings {
    /// Set one preference by its camelCase or snake_case name.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ValidationError> {
        let flag = || {
            value
                .trim()
                .parse::<bool>()
                .map_err(|_| ValidationError::invalid(key, format!("'{value}' is not true/false")))
        };
        match key {
            "emailNotifications" | "email_notifications" => self.email_notifications = flag()?,
            "pushNotifications" | "push_notifications" => self.push_notifications = flag()?,
            "soundEffects" | "sound_effects" => self.sound_effects = flag()?,
            "theme" => self.theme = value.parse()?,
            "accentColor" | "accent_color" => {
                let color = value.trim();
                let is_hex = color.len() == 7
                    && color.starts_with('#')
                    && color[1..].chars().all(|c| c.is_ascii_hexdigit());
                if !is_hex {
                    return Err(ValidationError::invalid(key, "expected a #rrggbb color"));
                }
                self.accent_color = color.to_string();
            }
            _ => return Err(ValidationError::invalid(key, "unknown setting")),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_record_fills_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"soundEffects": false}"#).unwrap();
        assert!(!settings.sound_effects);
        assert!(settings.email_notifications);
        assert_eq!(settings.accent_color, "#6366f1");
        assert_eq!(settings.theme, Theme::Dark);
    }

    #[test]
    fn set_validates_values() {
        let mut settings = Settings::default();
        settings.set("theme", "Light").unwrap();
        settings.set("sound_effects", "false").unwrap();
        settings.set("accentColor", "#FF5733").unwrap();
        assert_eq!(settings.theme, Theme::Light);
        assert!(!settings.sound_effects);
        assert_eq!(settings.accent_color, "#FF5733");

        assert!(settings.set("accentColor", "red").is_err());
        assert!(settings.set("pushNotifications", "maybe").is_err());
        assert!(settings.set("volume", "3").is_err());
    }
}
