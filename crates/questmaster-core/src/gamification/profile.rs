use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tasks needed per level.
pub const TASKS_PER_LEVEL: u32 = 5;

/// Coin balance of a brand-new profile.
pub const STARTING_COINS: u32 = 50;

/// Level for a given number of completed tasks.
pub fn level_for(completed_tasks: u32) -> u32 {
    completed_tasks / TASKS_PER_LEVEL + 1
}

/// The player.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    pub level: u32,
    pub coins: u32,
    pub streak: u32,
    pub completed_tasks: u32,
    #[serde(default)]
    pub email: String,
    pub join_date: DateTime<Utc>,
    /// Cumulative correct quiz answers across all sessions.
    #[serde(default)]
    pub quiz_correct_answers: u32,
    /// Completions that happened before local noon.
    #[serde(default)]
    pub early_completions: u32,
}

impl UserProfile {
    pub fn new(join_date: DateTime<Utc>) -> Self {
        Self {
            name: "Quest Master".to_string(),
            level: 1,
            coins: STARTING_COINS,
            streak: 0,
            completed_tasks: 0,
            email: String::new(),
            join_date,
            quiz_correct_answers: 0,
            early_completions: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_steps_every_five_tasks() {
        assert_eq!(level_for(0), 1);
        assert_eq!(level_for(4), 1);
        assert_eq!(level_for(5), 2);
        assert_eq!(level_for(24), 5);
        assert_eq!(level_for(25), 6);
    }

    #[test]
    fn stored_profile_without_counters_still_loads() {
        let json = r#"{"name":"Ana","level":2,"coins":80,"streak":1,
            "completedTasks":6,"joinDate":"2024-01-01T00:00:00Z"}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.quiz_correct_answers, 0);
        assert_eq!(profile.email, "");
    }
}
