use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{RegionFillError, RegionFillResult};

/// String key-value persistence, the shape of browser local storage.
pub trait KeyValueStorage {
    /// Value under `key`, `None` when unset.
    fn get(&self, key: &str) -> RegionFillResult<Option<String>>;
    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> RegionFillResult<()>;
    /// Delete `key`. Deleting a missing key is not an error.
    fn remove(&mut self, key: &str) -> RegionFillResult<()>;
}

/// Volatile storage for tests and one-shot runs.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: BTreeMap<String, String>,
}

impl MemoryStorage {
    /// Empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// `true` when nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> RegionFillResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> RegionFillResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> RegionFillResult<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// One JSON object file (`{"key": "value", ...}`), rewritten wholesale on every change.
///
/// A missing file reads as empty.
#[derive(Clone, Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Storage backed by `path`. The file is created on the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> RegionFillResult<BTreeMap<String, String>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(RegionFillError::storage(format!(
                    "read {}: {e}",
                    self.path.display()
                )));
            }
        };
        if text.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&text).map_err(|e| {
            RegionFillError::storage(format!("{} is not a JSON object of strings: {e}", self.path.display()))
        })
    }

    fn write_all(&self, entries: &BTreeMap<String, String>) -> RegionFillResult<()> {
        let write = || -> anyhow::Result<()> {
            if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("create storage dir {}", dir.display()))?;
            }
            let json = serde_json::to_string_pretty(entries).context("serialize storage")?;
            std::fs::write(&self.path, json)
                .with_context(|| format!("write {}", self.path.display()))?;
            Ok(())
        };
        write().map_err(|e| RegionFillError::storage(format!("{e:#}")))
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> RegionFillResult<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> RegionFillResult<()> {
        let mut entries = self.read_all()?;
        entries.insert(key.to_string(), value.to_string());
        self.write_all(&entries)
    }

    fn remove(&mut self, key: &str) -> RegionFillResult<()> {
        let mut entries = self.read_all()?;
        if entries.remove(key).is_some() {
            self.write_all(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/store/storage.rs"]
mod tests;
