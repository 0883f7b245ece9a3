//! Full-state export/import document.
//!
//! An export carries every player record plus the time it was taken.
//! Import is all-or-nothing: the document is fully decoded before anything
//! is applied, and a top-level key that is absent leaves the current value
//! in place.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use crate::error::ImportFormatError;
use crate::gamification::{merge_with_catalog, Achievement, UserProfile};
use crate::settings::Settings;
use crate::task::Task;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub user: UserProfile,
    pub tasks: Vec<Task>,
    pub achievements: Vec<Achievement>,
    pub settings: Settings,
    pub export_date: DateTime<Utc>,
}

impl ExportBundle {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// File name the web client offers for downloads.
    pub fn suggested_file_name(&self) -> String {
        format!("questmaster-backup-{}.json", self.export_date.format("%Y-%m-%d"))
    }
}

/// Decoded import. `None` means the key was absent.
#[derive(Debug, Clone, Default)]
pub struct ImportPlan {
    pub user: Option<UserProfile>,
    pub tasks: Option<Vec<Task>>,
    pub achievements: Option<Vec<Achievement>>,
    pub settings: Option<Settings>,
}

impl ImportPlan {
    /// Decode an export document.
    ///
    /// Present records are checked strictly; `user` and `settings` may be
    /// partial and are completed from defaults, achievements are merged
    /// over the catalog.
    pub fn parse(raw: &str, now: DateTime<Utc>) -> Result<Self, ImportFormatError> {
        let root: Value = serde_json::from_str(raw).map_err(ImportFormatError::Syntax)?;
        let Value::Object(mut root) = root else {
            return Err(ImportFormatError::NotAnObject);
        };

        let user = root
            .remove("user")
            .map(|v| decode_over_default("user", UserProfile::new(now), v))
            .transpose()?;
        let settings = root
            .remove("settings")
            .map(|v| decode_over_default("settings", Settings::default(), v))
            .transpose()?;
        let tasks = root
            .remove("tasks")
            .map(|v| decode::<Vec<Task>>("tasks", v))
            .transpose()?;
        if let Some(tasks) = &tasks {
            reject_duplicate_ids(tasks)?;
        }
        let achievements = root
            .remove("achievements")
            .map(|v| decode::<Vec<Value>>("achievements", v).map(|records| merge_with_catalog(&records)))
            .transpose()?;

        Ok(Self {
            user,
            tasks,
            achievements,
            settings,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.tasks.is_none() && self.achievements.is_none() && self.settings.is_none()
    }
}

fn reject_duplicate_ids(tasks: &[Task]) -> Result<(), ImportFormatError> {
    let mut seen = HashSet::with_capacity(tasks.len());
    match tasks.iter().find(|t| !seen.insert(t.id.as_str())) {
        Some(dup) => Err(ImportFormatError::DuplicateTaskId(dup.id.clone())),
        None => Ok(()),
    }
}

fn decode<T: DeserializeOwned>(field: &'static str, value: Value) -> Result<T, ImportFormatError> {
    serde_json::from_value(value).map_err(|source| ImportFormatError::Field { field, source })
}

fn decode_over_default<T>(field: &'static str, default: T, value: Value) -> Result<T, ImportFormatError>
where
    T: Serialize + DeserializeOwned,
{
    let value = match (serde_json::to_value(default), value) {
        (Ok(Value::Object(mut base)), Value::Object(stored)) => {
            base.extend(stored);
            Value::Object(base)
        }
        (_, other) => other,
    };
    decode(field, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gamification::catalog;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn export_uses_camel_case_keys() {
        let bundle = ExportBundle {
            user: UserProfile::new(now()),
            tasks: Vec::new(),
            achievements: catalog(),
            settings: Settings::default(),
            export_date: now(),
        };
        let json: Value = serde_json::from_str(&bundle.to_json_pretty().unwrap()).unwrap();
        assert!(json.get("exportDate").is_some());
        assert_eq!(json["user"]["completedTasks"], 0);
        assert_eq!(bundle.suggested_file_name(), "questmaster-backup-2024-05-01.json");
    }

    #[test]
    fn missing_keys_stay_absent() {
        let raw = json!({"user": {"name": "Ana", "coins": 10}, "tasks": []}).to_string();
        let plan = ImportPlan::parse(&raw, now()).unwrap();
        assert_eq!(plan.user.as_ref().unwrap().name, "Ana");
        assert_eq!(plan.user.as_ref().unwrap().level, 1);
        assert_eq!(plan.tasks.as_deref(), Some(&[][..]));
        assert!(plan.settings.is_none());
        assert!(plan.achievements.is_none());
    }

    #[test]
    fn rejects_malformed_documents() {
        assert!(matches!(ImportPlan::parse("{oops", now()), Err(ImportFormatError::Syntax(_))));
        assert!(matches!(ImportPlan::parse("[1,2]", now()), Err(ImportFormatError::NotAnObject)));
        let raw = json!({"tasks": [{"name": "no id"}]}).to_string();
        assert!(matches!(
            ImportPlan::parse(&raw, now()),
            Err(ImportFormatError::Field { field: "tasks", .. })
        ));
        let raw = json!({"achievements": "all of them"}).to_string();
        assert!(matches!(
            ImportPlan::parse(&raw, now()),
            Err(ImportFormatError::Field { field: "achievements", .. })
        ));
    }

    #[test]
    fn duplicate_task_ids_are_rejected() {
        let task = json!({
            "id": "dup", "name": "Twice", "category": "work",
            "deadline": "2024-05-02T17:30:00Z", "priority": "low",
            "createdAt": "2024-05-01T08:00:00Z"
        });
        let raw = json!({"tasks": [task.clone(), task]}).to_string();
        match ImportPlan::parse(&raw, now()) {
            Err(ImportFormatError::DuplicateTaskId(id)) => assert_eq!(id, "dup"),
            other => panic!("expected duplicate id error, got {other:?}"),
        }
    }

    #[test]
    fn web_client_backup_is_accepted() {
        let raw = json!({
            "user": {"name": "Ana", "email": "", "coins": 85, "level": 1, "streak": 2,
                     "completedTasks": 6, "joinDate": "2024-04-20T10:00:00.000Z", "avatar": "👤"},
            "tasks": [{
                "id": "lvw3k2f9x8q1z", "name": "Gym", "category": "health",
                "deadline": "2024-05-02T17:30", "priority": "medium", "description": "",
                "completed": false, "createdAt": "2024-05-01T07:59:12.345Z", "completedAt": null
            }],
            "exportDate": "2024-05-01T12:00:00.000Z"
        })
        .to_string();
        let plan = ImportPlan::parse(&raw, now()).unwrap();
        let tasks = plan.tasks.unwrap();
        assert_eq!(tasks[0].id, "lvw3k2f9x8q1z");
        assert_eq!(tasks[0].completed_at, None);
        assert_eq!(plan.user.unwrap().completed_tasks, 6);
    }
}
