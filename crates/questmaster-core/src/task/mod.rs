//! Quest (task) model.
//!
//! A task moves through a single boolean lifecycle:
//!
//! ```text
//! created ──toggle──> completed ──toggle──> incomplete ── ... ──> deleted
//! ```
//!
//! `completed_at` is set exactly when `completed` flips false → true and
//! cleared when it flips back.

mod store;

pub use store::{TaskStore, Toggle};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::clock::{Clock, SystemClock};
use crate::error::ValidationError;

/// Wall-clock layouts accepted besides RFC 3339. The first is what an HTML
/// `datetime-local` input produces.
const LOCAL_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Task priority. Ordering follows urgency: `Low < Medium < High`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        })
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "" => Err(ValidationError::MissingField("priority")),
            other => Err(ValidationError::invalid(
                "priority",
                format!("'{other}' is not one of low, medium, high"),
            )),
        }
    }
}

/// Task category.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskCategory {
    Work,
    Personal,
    Health,
    Learning,
    Creative,
    Social,
    Finance,
    Home,
}

impl TaskCategory {
    pub const ALL: [TaskCategory; 8] = [
        TaskCategory::Work,
        TaskCategory::Personal,
        TaskCategory::Health,
        TaskCategory::Learning,
        TaskCategory::Creative,
        TaskCategory::Social,
        TaskCategory::Finance,
        TaskCategory::Home,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskCategory::Work => "work",
            TaskCategory::Personal => "personal",
            TaskCategory::Health => "health",
            TaskCategory::Learning => "learning",
            TaskCategory::Creative => "creative",
            TaskCategory::Social => "social",
            TaskCategory::Finance => "finance",
            TaskCategory::Home => "home",
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        if wanted.is_empty() {
            return Err(ValidationError::MissingField("category"));
        }
        TaskCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| ValidationError::invalid("category", format!("unknown category '{wanted}'")))
    }
}

/// A quest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique, immutable identifier
    pub id: String,
    pub name: String,
    pub category: TaskCategory,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub deadline: DateTime<Utc>,
    pub priority: Priority,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "timestamp::deserialize_option")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Hours from `now` until the deadline; negative when past due.
    pub fn hours_until_deadline(&self, now: DateTime<Utc>) -> f64 {
        (self.deadline - now).num_milliseconds() as f64 / 3_600_000.0
    }

    /// Incomplete and due within the next 24 hours (exclusive on both ends).
    pub fn is_urgent(&self, now: DateTime<Utc>) -> bool {
        if self.completed {
            return false;
        }
        let hours = self.hours_until_deadline(now);
        hours > 0.0 && hours < 24.0
    }

    /// Incomplete and past its deadline.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.completed && self.deadline < now
    }

    pub fn is_due_today(&self, clock: &dyn Clock) -> bool {
        clock.local_date(self.deadline) == clock.today()
    }

    pub fn completed_today(&self, clock: &dyn Clock) -> bool {
        match (self.completed, self.completed_at) {
            (true, Some(at)) => clock.local_date(at) == clock.today(),
            _ => false,
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.category.as_str().contains(needle)
    }
}

/// Form-style input for a new task. Every field but `description` is required.
#[derive(Debug, Clone, Default)]
pub struct TaskInput {
    pub name: String,
    pub category: Option<TaskCategory>,
    pub deadline: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub description: String,
}

/// Editable fields of an existing task. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub name: Option<String>,
    pub category: Option<TaskCategory>,
    pub deadline: Option<DateTime<Utc>>,
    pub priority: Option<Priority>,
    pub description: Option<String>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.category.is_none()
            && self.deadline.is_none()
            && self.priority.is_none()
            && self.description.is_none()
    }
}

/// Task list views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFilter {
    #[default]
    All,
    Urgent,
    Today,
    Completed,
    Overdue,
}

impl TaskFilter {
    pub fn accepts(&self, task: &Task, clock: &dyn Clock) -> bool {
        let now = clock.now();
        match self {
            TaskFilter::All => true,
            TaskFilter::Urgent => task.is_urgent(now),
            TaskFilter::Today => task.is_due_today(clock),
            TaskFilter::Completed => task.completed,
            TaskFilter::Overdue => task.is_overdue(now),
        }
    }
}

impl FromStr for TaskFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(TaskFilter::All),
            "urgent" => Ok(TaskFilter::Urgent),
            "today" => Ok(TaskFilter::Today),
            "completed" => Ok(TaskFilter::Completed),
            "overdue" => Ok(TaskFilter::Overdue),
            other => Err(ValidationError::invalid("filter", format!("unknown filter '{other}'"))),
        }
    }
}

/// Parse a deadline as RFC 3339, or as a local `YYYY-MM-DDTHH:MM` /
/// `YYYY-MM-DD HH:MM` wall-clock value.
pub fn parse_deadline(raw: &str, clock: &dyn Clock) -> Result<DateTime<Utc>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ValidationError::MissingField("deadline"));
    }
    parse_timestamp(raw, clock).map_err(|e| ValidationError::invalid("deadline", e))
}

/// RFC 3339, falling back to [`LOCAL_FORMATS`] read in `clock`'s local time.
fn parse_timestamp(raw: &str, clock: &dyn Clock) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    for fmt in LOCAL_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return clock
                .from_local(naive)
                .ok_or_else(|| format!("'{raw}' does not exist in local time"));
        }
    }
    Err(format!("cannot parse '{raw}' as a date and time"))
}

/// Stored timestamps are written as RFC 3339 but older saves and backups
/// carry raw `datetime-local` values; those are read in host local time.
mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer};

    use super::{parse_timestamp, SystemClock};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(raw.trim(), &SystemClock).map_err(de::Error::custom)
    }

    pub fn deserialize_option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(raw) if !raw.trim().is_empty() => parse_timestamp(raw.trim(), &SystemClock)
                .map(Some)
                .map_err(de::Error::custom),
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{Duration, TimeZone};

    fn task_due(deadline: DateTime<Utc>) -> Task {
        Task {
            id: "t".into(),
            name: "Write report".into(),
            category: TaskCategory::Work,
            deadline,
            priority: Priority::High,
            description: String::new(),
            completed: false,
            created_at: deadline,
            completed_at: None,
        }
    }

    #[test]
    fn urgency_window_is_exclusive() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert!(task_due(now + Duration::hours(2)).is_urgent(now));
        assert!(!task_due(now).is_urgent(now));
        assert!(!task_due(now + Duration::hours(24)).is_urgent(now));
        assert!(!task_due(now - Duration::minutes(1)).is_urgent(now));
    }

    #[test]
    fn completed_task_is_never_urgent_or_overdue() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut task = task_due(now - Duration::hours(1));
        assert!(task.is_overdue(now));
        task.completed = true;
        assert!(!task.is_overdue(now));
        task.deadline = now + Duration::hours(1);
        assert!(!task.is_urgent(now));
    }

    #[test]
    fn parses_enums_case_insensitively() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" Learning ".parse::<TaskCategory>().unwrap(), TaskCategory::Learning);
        assert_eq!("overdue".parse::<TaskFilter>().unwrap(), TaskFilter::Overdue);
        assert!(matches!("".parse::<Priority>(), Err(ValidationError::MissingField("priority"))));
        assert!("urgentish".parse::<TaskFilter>().is_err());
    }

    #[test]
    fn parse_deadline_accepts_form_values() {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
        let expected = Utc.with_ymd_and_hms(2024, 5, 2, 17, 30, 0).unwrap();
        assert_eq!(parse_deadline("2024-05-02T17:30", &clock).unwrap(), expected);
        assert_eq!(parse_deadline("2024-05-02 17:30", &clock).unwrap(), expected);
        assert_eq!(parse_deadline("2024-05-02T17:30:00Z", &clock).unwrap(), expected);
        assert!(parse_deadline("tomorrow", &clock).is_err());
        assert_eq!(
            parse_deadline("  ", &clock).unwrap_err(),
            ValidationError::MissingField("deadline")
        );
    }

    #[test]
    fn task_reads_datetime_local_timestamps() {
        let json = r#"{
            "id": "lx3k9a2b",
            "name": "Quarterly report",
            "category": "work",
            "deadline": "2024-05-02T17:30",
            "priority": "high",
            "description": "",
            "completed": true,
            "createdAt": "2024-05-01T08:15:42.123Z",
            "completedAt": "2024-05-02T09:00:00.000Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        let local = NaiveDateTime::parse_from_str("2024-05-02T17:30", "%Y-%m-%dT%H:%M").unwrap();
        assert_eq!(Some(task.deadline), SystemClock.from_local(local));
        assert_eq!(task.created_at, Utc.with_ymd_and_hms(2024, 5, 1, 8, 15, 42).unwrap() + Duration::milliseconds(123));
        assert_eq!(task.completed_at, Some(Utc.with_ymd_and_hms(2024, 5, 2, 9, 0, 0).unwrap()));
    }

    #[test]
    fn null_or_missing_completion_time_is_none() {
        let base = r#""id":"a","name":"n","category":"home","deadline":"2024-05-02T17:30:00Z","priority":"low","createdAt":"2024-05-01T08:00:00Z""#;
        let with_null: Task = serde_json::from_str(&format!("{{{base},\"completedAt\":null}}")).unwrap();
        let missing: Task = serde_json::from_str(&format!("{{{base}}}")).unwrap();
        assert_eq!(with_null.completed_at, None);
        assert_eq!(missing.completed_at, None);
    }

    #[test]
    fn unparseable_deadline_fails_to_decode() {
        let json = r#"{"id":"a","name":"n","category":"home","deadline":"next week","priority":"low","createdAt":"2024-05-01T08:00:00Z"}"#;
        let err = serde_json::from_str::<Task>(json).unwrap_err();
        assert!(err.to_string().contains("next week"));
    }

    #[test]
    fn task_serializes_with_camel_case_keys() {
        let task = task_due(Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap());
        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("completedAt").is_some());
        assert_eq!(json["priority"], "high");
        assert_eq!(json["category"], "work");
    }
}
