use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::gamification::AchievementId;

/// Every state change in the system produces an Event.
/// Engines return them; the session forwards them to the notification sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TaskCreated {
        task_id: String,
        name: String,
        at: DateTime<Utc>,
    },
    TaskCompleted {
        task_id: String,
        name: String,
        coins: u32,
        at: DateTime<Utc>,
    },
    TaskReopened {
        task_id: String,
        name: String,
        at: DateTime<Utc>,
    },
    TaskUpdated {
        task_id: String,
        at: DateTime<Utc>,
    },
    TaskDeleted {
        task_id: String,
        name: String,
        at: DateTime<Utc>,
    },
    CoinsAwarded {
        amount: u32,
        balance: u32,
        at: DateTime<Utc>,
    },
    StreakUpdated {
        streak: u32,
        at: DateTime<Utc>,
    },
    LevelUp {
        from: u32,
        to: u32,
        at: DateTime<Utc>,
    },
    AchievementUnlocked {
        achievement: AchievementId,
        name: String,
        coins: u32,
        at: DateTime<Utc>,
    },
    QuizStarted {
        questions: usize,
        at: DateTime<Utc>,
    },
    /// The per-question countdown ran out and the quiz moved on.
    QuizTimedOut {
        from_question: usize,
        to_question: usize,
        at: DateTime<Utc>,
    },
    QuizSubmitted {
        correct: usize,
        total: usize,
        coins: u32,
        at: DateTime<Utc>,
    },
    QuizReset {
        at: DateTime<Utc>,
    },
    ProfileUpdated {
        at: DateTime<Utc>,
    },
    SettingsUpdated {
        at: DateTime<Utc>,
    },
    DataImported {
        tasks: usize,
        at: DateTime<Utc>,
    },
    DataCleared {
        at: DateTime<Utc>,
    },
    /// A stored record could not be read in full and was replaced by its
    /// default, or had entries skipped.
    RecordRecovered {
        message: String,
        at: DateTime<Utc>,
    },
    /// Snapshot write failed; in-memory state is still authoritative.
    PersistenceFailed {
        message: String,
        at: DateTime<Utc>,
    },
}

/// How loudly a front end should present an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Event {
    pub fn severity(&self) -> Severity {
        match self {
            Event::TaskCreated { .. }
            | Event::TaskCompleted { .. }
            | Event::CoinsAwarded { .. }
            | Event::LevelUp { .. }
            | Event::AchievementUnlocked { .. }
            | Event::QuizSubmitted { .. }
            | Event::ProfileUpdated { .. }
            | Event::SettingsUpdated { .. }
            | Event::DataImported { .. } => Severity::Success,
            Event::QuizTimedOut { .. } | Event::RecordRecovered { .. } => Severity::Warning,
            Event::TaskDeleted { .. } | Event::PersistenceFailed { .. } => Severity::Error,
            _ => Severity::Info,
        }
    }

    /// One-line, user-facing text.
    pub fn message(&self) -> String {
        match self {
            Event::TaskCreated { name, .. } => format!("Quest created: {name}"),
            Event::TaskCompleted { name, coins, .. } => {
                format!("Quest completed: {name} (+{coins} coins)")
            }
            Event::TaskReopened { name, .. } => format!("Uncompleted quest: {name}"),
            Event::TaskUpdated { .. } => "Quest updated".to_string(),
            Event::TaskDeleted { name, .. } => format!("Quest deleted: {name}"),
            Event::CoinsAwarded { amount, balance, .. } => {
                format!("+{amount} coins (balance {balance})")
            }
            Event::StreakUpdated { streak, .. } => format!("Streak: {streak} day(s)"),
            Event::LevelUp { to, .. } => format!("Level up! Now level {to}"),
            Event::AchievementUnlocked { name, coins, .. } => {
                format!("Achievement unlocked: {name} (+{coins} coins)")
            }
            Event::QuizStarted { questions, .. } => format!("Quiz started: {questions} questions"),
            Event::QuizTimedOut { from_question, .. } => {
                format!("Time is up for question {}", from_question + 1)
            }
            Event::QuizSubmitted { correct, total, coins, .. } => {
                format!("Completed quiz: {correct}/{total} correct (+{coins} coins)")
            }
            Event::QuizReset { .. } => "Quiz closed".to_string(),
            Event::ProfileUpdated { .. } => "Profile updated successfully!".to_string(),
            Event::SettingsUpdated { .. } => "Settings updated!".to_string(),
            Event::DataImported { .. } => "Data imported successfully!".to_string(),
            Event::DataCleared { .. } => "All data cleared".to_string(),
            Event::RecordRecovered { message, .. } => format!("Some saved data could not be read: {message}"),
            Event::PersistenceFailed { message, .. } => format!("Failed to save data: {message}"),
        }
    }
}
