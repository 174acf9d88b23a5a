use std::collections::BTreeMap;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

const FILENAME: &str = "prefs.yaml";
const APP_DIR: &str = "stagedeck";

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("could not determine data directory")]
    NoDataDir,
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed preferences in {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// A small persistent key/value store for user preferences.
pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PrefsError>;
}

/// Preferences kept as a flat YAML map on disk, written through on every set.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    pub fn default_path() -> Result<PathBuf, PrefsError> {
        dirs::data_local_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or(PrefsError::NoDataDir)
    }

    pub fn open_default() -> Result<Self, PrefsError> {
        Self::open(Self::default_path()?)
    }

    /// Open a store. A missing file is an empty store.
    pub fn open(path: PathBuf) -> Result<Self, PrefsError> {
        let values = match std::fs::read_to_string(&path) {
            Ok(contents) if contents.trim().is_empty() => BTreeMap::new(),
            Ok(contents) => serde_yaml::from_str(&contents).map_err(|source| PrefsError::Parse {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(PrefsError::Io { path, source }),
        };
        debug!(path = %path.display(), entries = values.len(), "preferences loaded");
        Ok(Self { path, values })
    }

    fn save(&self) -> Result<(), PrefsError> {
        let io_err = |source: std::io::Error| PrefsError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let yaml = serde_yaml::to_string(&self.values).map_err(|source| PrefsError::Parse {
            path: self.path.clone(),
            source,
        })?;
        std::fs::write(&self.path, yaml).map_err(io_err)
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PrefsError> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }
}

/// Non-persistent store, used when the data directory is unavailable.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: BTreeMap<String, String>,
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PrefsError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("prefs.yaml")).unwrap();
        assert_eq!(store.get("theme"), None);
    }

    #[test]
    fn test_set_writes_through() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.yaml");
        let mut store = FileStore::open(path.clone()).unwrap();
        store.set("theme", "dark").unwrap();

        let reopened = FileStore::open(path).unwrap();
        assert_eq!(reopened.get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.yaml");
        std::fs::write(&path, "- not\n- a map\n").unwrap();
        let err = FileStore::open(path).unwrap_err();
        assert!(matches!(err, PrefsError::Parse { .. }));
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::default();
        store.set("theme", "light").unwrap();
        assert_eq!(store.get("theme").as_deref(), Some("light"));
    }
}
