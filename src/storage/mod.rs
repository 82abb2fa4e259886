//! Storage layer for roster data.
//!
//! This module handles persistence of the student and group collections.
//!
//! ## Storage Backends
//!
//! - **File backend** (default): `<data-dir>/hogwartsStudents.json` and
//!   `<data-dir>/hogwartsGroups.json`, where the data directory defaults to
//!   `~/.local/share/roster/`
//! - **Memory backend**: nothing is written to disk
//!
//! Every collection is stored whole under its key. Loading never fails: a
//! missing or unreadable document yields the caller's default collection.

pub mod backend;
pub mod file;
pub mod memory;

pub use backend::{BackendType, StorageBackend};
pub use file::FileBackend;
pub use memory::MemoryBackend;

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Key holding the student collection.
pub const STUDENTS_KEY: &str = "hogwartsStudents";

/// Key holding the group collection.
pub const GROUPS_KEY: &str = "hogwartsGroups";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "ROSTER_DATA_DIR";

/// Load the collection stored under `key`.
///
/// Falls back to `default()` when the key is absent, empty, unreadable, or does
/// not parse as a JSON array of `T`. Failures are logged and swallowed.
pub fn load_collection<T, F>(backend: &dyn StorageBackend, key: &str, default: F) -> Vec<T>
where
    T: DeserializeOwned,
    F: FnOnce() -> Vec<T>,
{
    match backend.read(key) {
        Ok(Some(raw)) if !raw.trim().is_empty() => match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(items) => {
                debug!(key = %key, count = items.len(), "loaded collection");
                return items;
            }
            Err(e) => warn!(key = %key, error = %e, "error parsing stored collection, using defaults"),
        },
        Ok(_) => debug!(key = %key, "no stored collection, using defaults"),
        Err(e) => warn!(key = %key, error = %e, "error reading stored collection, using defaults"),
    }
    default()
}

/// Replace the value under `key` with the serialized collection.
pub fn save_collection<T: Serialize>(backend: &mut dyn StorageBackend, key: &str, items: &[T]) -> Result<()> {
    let json = serde_json::to_string(items)?;
    backend.write(key, &json)?;
    debug!(key = %key, count = items.len(), bytes = json.len(), "saved collection");
    Ok(())
}

/// Generate an id from a creation instant.
///
/// Format: epoch milliseconds as a decimal string, incremented until `taken`
/// reports it free, so ids minted within the same millisecond stay unique.
pub fn generate_id<F>(now: DateTime<Utc>, taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    let mut candidate = now.timestamp_millis();
    loop {
        let id = candidate.to_string();
        if !taken(&id) {
            return id;
        }
        candidate += 1;
    }
}

/// Default data directory: `<XDG data dir>/roster`.
pub fn default_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir()
        .ok_or_else(|| Error::Other("Could not determine data directory".to_string()))?;
    Ok(data_dir.join("roster"))
}
