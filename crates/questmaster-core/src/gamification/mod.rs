mod achievements;
mod engine;
mod profile;

pub use achievements::{catalog, merge_with_catalog, Achievement, AchievementId};
pub use engine::{GamificationEngine, COINS_PER_CORRECT_ANSWER};
pub use profile::{level_for, UserProfile, STARTING_COINS, TASKS_PER_LEVEL};
