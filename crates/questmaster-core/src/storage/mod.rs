mod config;
pub mod kv;
pub mod snapshot;
pub mod sqlite;

pub use config::{BackendConfig, Config, LoggingConfig, QuizSettings, SessionConfig};
pub use kv::{KeyValueStore, MemoryStore};
pub use snapshot::{keys, Snapshot, SnapshotStore};
pub use sqlite::SqliteStore;

use std::path::PathBuf;

use crate::error::PersistenceError;

/// Returns `~/.config/questmaster[-dev]/` based on QUESTMASTER_ENV.
///
/// Set QUESTMASTER_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, PersistenceError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("QUESTMASTER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("questmaster-dev")
    } else {
        base_dir.join("questmaster")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| PersistenceError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
