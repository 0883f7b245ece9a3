//! # Questmaster Core Library
//!
//! This library provides the core logic for Questmaster, a gamified task
//! tracker: quests with deadlines and priorities, coins, levels, streaks,
//! achievements and a timed quiz. Front ends (the bundled CLI, or anything
//! else) are thin layers over the same [`AppController`].
//!
//! ## Architecture
//!
//! - **Engines**: [`TaskStore`], [`GamificationEngine`] and [`QuizEngine`] are
//!   plain state machines. They own no threads and never notify anyone; they
//!   return [`Event`]s and the caller forwards them.
//! - **Session**: [`AppController`] owns every engine, serializes all
//!   mutations and persists the snapshot after each one.
//! - **Storage**: SQLite-backed key/value records and TOML configuration
//! - **Backend**: local account registry and the companion email service
//!
//! ## Key Components
//!
//! - [`AppController`]: one player's session
//! - [`Clock`]: injectable time source
//! - [`NotificationSink`]: outward edge for user-facing messages
//! - [`Config`]: application configuration management

pub mod backend;
pub mod bundle;
pub mod clock;
pub mod error;
pub mod events;
pub mod gamification;
pub mod notify;
pub mod quiz;
pub mod session;
pub mod settings;
pub mod stats;
pub mod storage;
pub mod task;
pub mod ticker;

pub use bundle::{ExportBundle, ImportPlan};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, ImportFormatError, NotFoundError, PersistenceError, ValidationError};
pub use events::{Event, Severity};
pub use gamification::{Achievement, AchievementId, GamificationEngine, UserProfile};
pub use notify::{NotificationSink, RecordingSink, TracingSink};
pub use quiz::{QuestionBank, QuizEngine, QuizError, QuizResult, QuizState, TickOutcome};
pub use session::AppController;
pub use settings::{Settings, Theme};
pub use stats::DashboardStats;
pub use storage::{Config, KeyValueStore, MemoryStore, SnapshotStore, SqliteStore};
pub use task::{Priority, Task, TaskCategory, TaskFilter, TaskInput, TaskStore, TaskUpdate, Toggle};
pub use ticker::Ticker;
