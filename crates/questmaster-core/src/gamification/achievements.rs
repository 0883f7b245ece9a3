//! Fixed achievement catalog and its unlock predicates.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use super::UserProfile;
use crate::task::Task;

pub const STREAK_MASTER_DAYS: u32 = 7;
pub const QUIZ_CHAMPION_ANSWERS: u32 = 10;
pub const TASK_MASTER_TASKS: usize = 25;
pub const EARLY_BIRD_COMPLETIONS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
    FirstQuest,
    StreakMaster,
    QuizChampion,
    TaskMaster,
    EarlyBird,
}

impl AchievementId {
    pub const ALL: [AchievementId; 5] = [
        AchievementId::FirstQuest,
        AchievementId::StreakMaster,
        AchievementId::QuizChampion,
        AchievementId::TaskMaster,
        AchievementId::EarlyBird,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AchievementId::FirstQuest => "first_quest",
            AchievementId::StreakMaster => "streak_master",
            AchievementId::QuizChampion => "quiz_champion",
            AchievementId::TaskMaster => "task_master",
            AchievementId::EarlyBird => "early_bird",
        }
    }

    /// Whether the milestone has been reached.
    pub fn is_met(&self, tasks: &[Task], profile: &UserProfile) -> bool {
        match self {
            AchievementId::FirstQuest => tasks.iter().any(|t| t.completed),
            AchievementId::StreakMaster => profile.streak >= STREAK_MASTER_DAYS,
            AchievementId::QuizChampion => profile.quiz_correct_answers >= QUIZ_CHAMPION_ANSWERS,
            AchievementId::TaskMaster => {
                tasks.iter().filter(|t| t.completed).count() >= TASK_MASTER_TASKS
            }
            AchievementId::EarlyBird => profile.early_completions >= EARLY_BIRD_COMPLETIONS,
        }
    }

    /// Catalog entry, locked.
    pub fn definition(&self) -> Achievement {
        let (name, description, coins) = match self {
            AchievementId::FirstQuest => ("First Quest", "Complete your first task", 25),
            AchievementId::StreakMaster => ("Streak Master", "Maintain a 7-day streak", 100),
            AchievementId::QuizChampion => ("Quiz Champion", "Get 10 quiz questions right", 50),
            AchievementId::TaskMaster => ("Task Master", "Complete 25 tasks", 75),
            AchievementId::EarlyBird => ("Early Bird", "Complete 5 tasks before noon", 40),
        };
        Achievement {
            id: *self,
            name: name.to_string(),
            description: description.to_string(),
            unlocked: false,
            coin_reward: coins,
            extra: Map::new(),
        }
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Achievement {
    pub id: AchievementId,
    pub name: String,
    pub description: String,
    /// Monotonic: never goes back to `false` outside a full data reset.
    #[serde(default)]
    pub unlocked: bool,
    #[serde(rename = "coins")]
    pub coin_reward: u32,
    /// Fields written by other front ends; carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The full locked catalog.
pub fn catalog() -> Vec<Achievement> {
    AchievementId::ALL.iter().map(|id| id.definition()).collect()
}

/// Merge stored achievement records over the catalog, by id.
///
/// Catalog entries without a stored counterpart (or whose stored record is
/// malformed) keep their defaults. Stored records with unknown ids are dropped.
pub fn merge_with_catalog(stored: &[Value]) -> Vec<Achievement> {
    AchievementId::ALL
        .iter()
        .map(|id| {
            let default = id.definition();
            let Some(saved) = stored
                .iter()
                .filter_map(Value::as_object)
                .find(|obj| obj.get("id").and_then(Value::as_str) == Some(id.as_str()))
            else {
                return default;
            };
            let mut merged = match serde_json::to_value(&default) {
                Ok(Value::Object(map)) => map,
                _ => return default,
            };
            for (key, value) in saved {
                merged.insert(key.clone(), value.clone());
            }
            serde_json::from_value(Value::Object(merged)).unwrap_or_else(|err| {
                tracing::warn!(achievement = %id, %err, "ignoring malformed stored achievement");
                default
            })
        })
        .collect()
}
