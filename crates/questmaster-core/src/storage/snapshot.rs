//! The player's persisted records.
//!
//! Four independent JSON records plus the streak's last-activity date.
//! Every record is optional on load: profile and settings are merged over
//! their defaults, achievements over the catalog, and anything that fails
//! to parse is logged and replaced by its default without affecting the
//! other records.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use super::kv::KeyValueStore;
use crate::error::PersistenceError;
use crate::gamification::{catalog, merge_with_catalog, Achievement, UserProfile};
use crate::settings::Settings;
use crate::task::Task;

/// Storage keys, shared with the web client's localStorage layout.
pub mod keys {
    pub const USER: &str = "questmaster_user";
    pub const TASKS: &str = "questmaster_tasks";
    pub const ACHIEVEMENTS: &str = "questmaster_achievements";
    pub const SETTINGS: &str = "questmaster_settings";
    pub const LAST_ACTIVITY: &str = "last_activity_date";
    pub const USERS: &str = "users";

    /// Everything a data reset removes. Registered accounts survive.
    pub const PLAYER_RECORDS: [&str; 5] = [USER, TASKS, ACHIEVEMENTS, SETTINGS, LAST_ACTIVITY];
}

#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub profile: UserProfile,
    pub tasks: Vec<Task>,
    pub achievements: Vec<Achievement>,
    pub settings: Settings,
    pub last_activity: Option<NaiveDate>,
}

impl Snapshot {
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            profile: UserProfile::new(now),
            tasks: Vec::new(),
            achievements: catalog(),
            settings: Settings::default(),
            last_activity: None,
        }
    }
}

pub struct SnapshotStore {
    store: Box<dyn KeyValueStore>,
}

impl SnapshotStore {
    pub fn new(store: impl KeyValueStore + 'static) -> Self {
        Self {
            store: Box::new(store),
        }
    }

    pub fn backend(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    // ── Load ─────────────────────────────────────────────────────────

    /// Read every record. Never fails: a missing or broken record falls
    /// back to its default.
    pub fn load(&self, now: DateTime<Utc>) -> Snapshot {
        self.load_checked(now).0
    }

    /// Like [`load`](Self::load), also describing every record that had to
    /// fall back to a default or was partly skipped.
    pub fn load_checked(&self, now: DateTime<Utc>) -> (Snapshot, Vec<String>) {
        let fresh = Snapshot::fresh(now);
        let mut issues = Vec::new();

        let profile = match self.read_json(keys::USER, &mut issues) {
            Some(raw) => merge_over(fresh.profile, raw, keys::USER, &mut issues),
            None => fresh.profile,
        };
        let settings = match self.read_json(keys::SETTINGS, &mut issues) {
            Some(raw) => merge_over(fresh.settings, raw, keys::SETTINGS, &mut issues),
            None => fresh.settings,
        };
        let tasks = self
            .read_json(keys::TASKS, &mut issues)
            .map(|raw| decode_tasks(raw, &mut issues))
            .unwrap_or_default();
        let achievements = match self.read_json(keys::ACHIEVEMENTS, &mut issues) {
            Some(Value::Array(records)) => merge_with_catalog(&records),
            Some(_) => {
                tracing::warn!(key = keys::ACHIEVEMENTS, "stored achievements are not a list; using catalog");
                issues.push(format!("{}: not a list; using catalog", keys::ACHIEVEMENTS));
                fresh.achievements
            }
            None => fresh.achievements,
        };
        let last_activity = self
            .read_raw(keys::LAST_ACTIVITY, &mut issues)
            .and_then(|raw| parse_activity_date(&raw));

        tracing::debug!(tasks = tasks.len(), issues = issues.len(), "snapshot loaded");
        let snapshot = Snapshot {
            profile,
            tasks,
            achievements,
            settings,
            last_activity,
        };
        (snapshot, issues)
    }

    // ── Save ─────────────────────────────────────────────────────────

    /// Write every record. Stops at the first failure; records already
    /// written stay written.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        self.write_json(keys::USER, &snapshot.profile)?;
        self.write_json(keys::TASKS, &snapshot.tasks)?;
        self.write_json(keys::ACHIEVEMENTS, &snapshot.achievements)?;
        self.write_json(keys::SETTINGS, &snapshot.settings)?;
        match snapshot.last_activity {
            Some(date) => self
                .store
                .set(keys::LAST_ACTIVITY, &date.format("%Y-%m-%d").to_string())?,
            None => self.store.remove(keys::LAST_ACTIVITY)?,
        }
        Ok(())
    }

    /// Remove every player record. Registered accounts are kept.
    pub fn clear(&self) -> Result<(), PersistenceError> {
        for key in keys::PLAYER_RECORDS {
            self.store.remove(key)?;
        }
        tracing::info!("player records cleared");
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn read_raw(&self, key: &str, issues: &mut Vec<String>) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "failed to read record; using default");
                issues.push(format!("{key}: unreadable ({e}); using default"));
                None
            }
        }
    }

    fn read_json(&self, key: &str, issues: &mut Vec<String>) -> Option<Value> {
        let raw = self.read_raw(key, issues)?;
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(key, error = %e, "stored record is not valid JSON; using default");
                issues.push(format!("{key}: not valid JSON ({e}); using default"));
                None
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), PersistenceError> {
        let encoded = serde_json::to_string(value).map_err(|e| PersistenceError::Encode {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        self.store.set(key, &encoded)
    }
}

/// Shallow merge: top-level keys of `stored` override those of `default`.
fn merge_over<T>(default: T, stored: Value, key: &str, issues: &mut Vec<String>) -> T
where
    T: Serialize + DeserializeOwned,
{
    let Value::Object(stored) = stored else {
        tracing::warn!(key, "stored record is not an object; using default");
        issues.push(format!("{key}: not an object; using default"));
        return default;
    };
    let mut base = match serde_json::to_value(&default) {
        Ok(Value::Object(map)) => map,
        _ => return default,
    };
    base.extend(stored);
    serde_json::from_value(Value::Object(base)).unwrap_or_else(|e| {
        tracing::warn!(key, error = %e, "stored record is malformed; using default");
        issues.push(format!("{key}: malformed ({e}); using default"));
        default
    })
}

/// Decode the task list one record at a time so a single bad entry only
/// costs that entry.
fn decode_tasks(raw: Value, issues: &mut Vec<String>) -> Vec<Task> {
    let key = keys::TASKS;
    let Value::Array(records) = raw else {
        tracing::warn!(key, "stored tasks are not a list; using default");
        issues.push(format!("{key}: not a list; using default"));
        return Vec::new();
    };
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| match serde_json::from_value::<Task>(record) {
            Ok(task) => Some(task),
            Err(e) => {
                tracing::warn!(key, index, error = %e, "skipping malformed task");
                issues.push(format!("{key}: skipped task #{index} ({e})"));
                None
            }
        })
        .collect()
}

/// ISO dates, plus the `Mon Jan 01 2024` form older builds wrote.
fn parse_activity_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%a %b %d %Y"))
        .map_err(|_| tracing::warn!(value = raw, "ignoring unreadable last activity date"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, 9, 0, 0).unwrap()
    }

    #[test]
    fn empty_store_loads_defaults() {
        let snapshots = SnapshotStore::new(MemoryStore::new());
        let snapshot = snapshots.load(now());
        assert_eq!(snapshot, Snapshot::fresh(now()));
        assert_eq!(snapshot.profile.coins, 50);
        assert_eq!(snapshot.achievements.len(), 5);
    }

    #[test]
    fn partial_profile_is_merged_over_defaults() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(keys::USER, r#"{"name":"Ana","coins":120}"#).unwrap();
        kv.set(keys::SETTINGS, r#"{"theme":"light"}"#).unwrap();
        let snapshot = SnapshotStore::new(kv).load(now());
        assert_eq!(snapshot.profile.name, "Ana");
        assert_eq!(snapshot.profile.coins, 120);
        assert_eq!(snapshot.profile.level, 1);
        assert_eq!(snapshot.settings.theme, crate::settings::Theme::Light);
        assert!(snapshot.settings.sound_effects);
    }

    #[test]
    fn broken_record_does_not_spoil_the_rest() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(keys::TASKS, "{{not json").unwrap();
        kv.set(keys::USER, r#"{"name":"Ana"}"#).unwrap();
        kv.set(keys::LAST_ACTIVITY, "Sat Mar 09 2024").unwrap();
        let (snapshot, issues) = SnapshotStore::new(kv).load_checked(now());
        assert!(snapshot.tasks.is_empty());
        assert_eq!(issues.len(), 1);
        assert_eq!(snapshot.profile.name, "Ana");
        assert_eq!(snapshot.last_activity, NaiveDate::from_ymd_opt(2024, 3, 9));
    }

    #[test]
    fn one_bad_task_is_skipped_and_reported() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(
            keys::TASKS,
            r#"[
                {"id":"a","name":"Keep","category":"work","deadline":"2024-03-11T10:00:00Z","priority":"high","createdAt":"2024-03-10T08:00:00Z"},
                {"id":"b","name":"Broken","category":"chores","deadline":"2024-03-11T10:00:00Z","priority":"high","createdAt":"2024-03-10T08:00:00Z"},
                {"id":"c","name":"Form value","category":"home","deadline":"2024-03-12T18:45","priority":"low","description":"","completed":false,"createdAt":"2024-03-10T08:00:00.000Z","completedAt":null}
            ]"#,
        )
        .unwrap();
        let (snapshot, issues) = SnapshotStore::new(kv).load_checked(now());
        let ids: Vec<_> = snapshot.tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("#1"), "{issues:?}");
    }

    #[test]
    fn clean_load_reports_nothing() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(keys::USER, r#"{"name":"Ana"}"#).unwrap();
        let (_, issues) = SnapshotStore::new(kv).load_checked(now());
        assert!(issues.is_empty(), "{issues:?}");
    }

    #[test]
    fn save_then_clear_keeps_accounts() {
        let kv = Arc::new(MemoryStore::new());
        kv.set(keys::USERS, "[]").unwrap();
        let snapshots = SnapshotStore::new(kv.clone());
        let mut snapshot = Snapshot::fresh(now());
        snapshot.last_activity = NaiveDate::from_ymd_opt(2024, 3, 10);
        snapshots.save(&snapshot).unwrap();
        assert_eq!(snapshots.load(now()), snapshot);

        snapshots.clear().unwrap();
        assert_eq!(kv.keys(), vec![keys::USERS.to_string()]);
    }
}
