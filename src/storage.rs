//! Key-value persistence: tournament snapshots and the poster cache.
//!
//! The whole tournament is stored as one JSON document under [`STATE_KEY`]. It is read
//! once at startup and rewritten after every mutation.

use crate::models::Tournament;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use thiserror::Error;

/// Key of the tournament snapshot.
pub const STATE_KEY: &str = "tournament_state";

/// Snapshot format version; a mismatch is treated like a malformed snapshot.
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// String key-value store.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// One `<key>.json` file per key inside a directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

/// In-process store (tests, or running without a data directory).
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let g = self.values.read().unwrap_or_else(|e| e.into_inner());
        Ok(g.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut g = self.values.write().unwrap_or_else(|e| e.into_inner());
        g.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut g = self.values.write().unwrap_or_else(|e| e.into_inner());
        g.remove(key);
        Ok(())
    }
}

/// Stored form of the tournament.
#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub state: Tournament,
}

/// Write the tournament snapshot.
pub fn save_tournament(store: &dyn KeyValueStore, tournament: &Tournament) -> Result<(), StorageError> {
    let snapshot = Snapshot {
        version: SNAPSHOT_VERSION,
        saved_at: Utc::now(),
        state: tournament.clone(),
    };
    store.set(STATE_KEY, &serde_json::to_string(&snapshot)?)
}

/// Read the tournament snapshot.
///
/// Missing, unreadable, malformed, or inconsistent snapshots all yield the empty initial
/// state; anything other than "missing" is logged.
pub fn load_tournament(store: &dyn KeyValueStore) -> Tournament {
    let raw = match store.get(STATE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Tournament::new(),
        Err(e) => {
            log::warn!("Could not read saved tournament, starting empty: {}", e);
            return Tournament::new();
        }
    };
    let snapshot: Snapshot = match serde_json::from_str(&raw) {
        Ok(s) => s,
        Err(e) => {
            log::warn!("Saved tournament is malformed, starting empty: {}", e);
            return Tournament::new();
        }
    };
    if snapshot.version != SNAPSHOT_VERSION {
        log::warn!(
            "Saved tournament has version {}, expected {}; starting empty",
            snapshot.version,
            SNAPSHOT_VERSION
        );
        return Tournament::new();
    }
    if let Err(reason) = snapshot.state.validate() {
        log::warn!("Saved tournament is inconsistent ({}), starting empty", reason);
        return Tournament::new();
    }
    log::info!(
        "Restored tournament for '{}' saved at {}",
        snapshot.state.username,
        snapshot.saved_at
    );
    snapshot.state
}

fn poster_key(kind: &str, external_id: &str) -> String {
    format!("poster_{kind}_{external_id}")
}

/// Cached poster URL for an entry, if any. Read errors count as a miss.
pub fn cached_poster(store: &dyn KeyValueStore, kind: &str, external_id: &str) -> Option<String> {
    store
        .get(&poster_key(kind, external_id))
        .ok()
        .flatten()
        .filter(|url| !url.is_empty())
}

pub fn cache_poster(
    store: &dyn KeyValueStore,
    kind: &str,
    external_id: &str,
    url: &str,
) -> Result<(), StorageError> {
    store.set(&poster_key(kind, external_id), url)
}
