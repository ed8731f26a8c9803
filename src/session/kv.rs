use crate::error::SessionError;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Durable key-value cache backing the session store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Apply every write and removal in one durable step: either all of
    /// them become visible or none do.
    fn commit(&self, writes: &[(&str, &str)], removals: &[&str]) -> Result<(), SessionError>;
}

// ── File-backed store ───────────────────────────────────────────

/// JSON object on disk, replaced atomically via a temp file + rename.
pub struct FileKeyValueStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, SessionError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = fs::read_to_string(&self.path).map_err(|e| {
            SessionError::Store(format!("failed to read {}: {e}", self.path.display()))
        })?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents).map_err(|e| {
            SessionError::Store(format!("failed to parse {}: {e}", self.path.display()))
        })
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), SessionError> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(|e| {
            SessionError::Store(format!("failed to create {}: {e}", parent.display()))
        })?;

        let json = serde_json::to_string_pretty(map)
            .map_err(|e| SessionError::Store(format!("failed to encode store: {e}")))?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .map_err(|e| SessionError::Store(format!("failed to write {}: {e}", tmp.display())))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            SessionError::Store(format!("failed to replace {}: {e}", self.path.display()))
        })
    }
}

impl KeyValueStore for FileKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.read_map()?.get(key).cloned())
    }

    fn commit(&self, writes: &[(&str, &str)], removals: &[&str]) -> Result<(), SessionError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        // A corrupt file is replaced rather than blocking login/logout.
        let mut map = self.read_map().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "session.store.corrupt");
            BTreeMap::new()
        });
        for key in removals {
            map.remove(*key);
        }
        for (key, value) in writes {
            map.insert((*key).to_string(), (*value).to_string());
        }
        self.write_map(&map)
    }
}

// ── In-memory store ─────────────────────────────────────────────

#[derive(Default)]
pub struct MemoryKeyValueStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: &[(&str, &str)]) -> Self {
        let store = Self::new();
        {
            let mut map = store
                .entries
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            for (key, value) in entries {
                map.insert((*key).to_string(), (*value).to_string());
            }
        }
        store
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .contains_key(key)
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned())
    }

    fn commit(&self, writes: &[(&str, &str)], removals: &[&str]) -> Result<(), SessionError> {
        let mut map = self
            .entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        for key in removals {
            map.remove(*key);
        }
        for (key, value) in writes {
            map.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }
}
