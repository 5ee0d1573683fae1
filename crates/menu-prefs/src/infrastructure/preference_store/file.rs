//! File-backed preference store for hosts without a registry.
//!
//! Keeps a registry-shaped hive in a single TOML file, one table per key path:
//!
//! ```toml
//! ["Control Panel\\Desktop"]
//! MenuShowDelay = "400"
//!
//! ["Software\\SpectacularThing"]
//! Menu = "255 255 255"
//! MenuShowDelay = "400"
//! ```
//!
//! Every write is a read-modify-write of the whole file, so each value is
//! durable as soon as `write_string` returns, just like a registry write.  No
//! file handle outlives a single call.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use tracing::trace;

use super::normalize_path;
use crate::application::sync_settings::{PreferenceKey, PreferenceStore, StoreError};

type Hive = BTreeMap<String, BTreeMap<String, String>>;

/// A [`PreferenceStore`] persisted to a TOML file.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    file: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self { file: file.into() }
    }

    fn read_hive(&self) -> Result<Hive, StoreError> {
        match std::fs::read_to_string(&self.file) {
            Ok(content) => toml::from_str(&content).map_err(|e| {
                StoreError::Backend(format!("corrupt preference file {}: {e}", self.file.display()))
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Hive::new()),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn write_hive(&self, hive: &Hive) -> Result<(), StoreError> {
        if let Some(dir) = self.file.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;
            }
        }
        let content = toml::to_string_pretty(hive)
            .map_err(|e| StoreError::Backend(format!("failed to serialize preferences: {e}")))?;
        std::fs::write(&self.file, content).map_err(|e| self.io_error(e))
    }

    fn io_error(&self, e: io::Error) -> StoreError {
        if e.kind() == io::ErrorKind::PermissionDenied {
            StoreError::AccessDenied {
                path: self.file.display().to_string(),
            }
        } else {
            StoreError::Backend(format!("I/O error accessing {}: {e}", self.file.display()))
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    type Key<'a> = FileKey<'a>;

    fn open_key(&self, path: &str) -> Result<Option<FileKey<'_>>, StoreError> {
        let key_path = normalize_path(path);
        if !self.read_hive()?.contains_key(&key_path) {
            return Ok(None);
        }
        Ok(Some(FileKey {
            store: self,
            key_path,
        }))
    }

    fn create_key(&self, path: &str) -> Result<FileKey<'_>, StoreError> {
        let key_path = normalize_path(path);
        let mut hive = self.read_hive()?;
        if !hive.contains_key(&key_path) {
            hive.insert(key_path.clone(), BTreeMap::new());
            self.write_hive(&hive)?;
        }
        Ok(FileKey {
            store: self,
            key_path,
        })
    }
}

/// Open key in a [`FilePreferenceStore`].
#[derive(Debug)]
pub struct FileKey<'a> {
    store: &'a FilePreferenceStore,
    key_path: String,
}

impl PreferenceKey for FileKey<'_> {
    fn read_string(&self, name: &str) -> Result<Option<String>, StoreError> {
        let hive = self.store.read_hive()?;
        Ok(hive
            .get(&self.key_path)
            .and_then(|values| values.get(name).cloned()))
    }

    fn write_string(&mut self, name: &str, value: &str) -> Result<(), StoreError> {
        let mut hive = self.store.read_hive()?;
        hive.entry(self.key_path.clone())
            .or_default()
            .insert(name.to_string(), value.to_string());
        self.store.write_hive(&hive)?;
        trace!(file = %self.store.file.display(), key = %self.key_path, name, "value written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(tag: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("menu_prefs_test_{tag}_{}", std::process::id()))
            .join("prefs.toml")
    }

    #[test]
    fn test_missing_file_has_no_keys() {
        let store = FilePreferenceStore::new(temp_file("missing"));
        assert!(store.open_key(r"Software\SpectacularThing").unwrap().is_none());
    }

    #[test]
    fn test_write_then_reopen_round_trip() {
        // Arrange
        let path = temp_file("round_trip");
        let store = FilePreferenceStore::new(&path);

        // Act
        {
            let mut key = store.create_key(r"Control Panel\Colors").unwrap();
            key.write_string("Menu", "10 20 30").unwrap();
        }
        let reopened = FilePreferenceStore::new(&path);
        let key = reopened.open_key(r"Control Panel\Colors").unwrap().expect("key");

        // Assert
        assert_eq!(key.read_string("Menu").unwrap().as_deref(), Some("10 20 30"));
        assert_eq!(key.read_string("Other").unwrap(), None);

        // Cleanup
        drop(key);
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_create_key_persists_empty_key() {
        let path = temp_file("empty_key");
        let store = FilePreferenceStore::new(&path);

        drop(store.create_key(r"Software\SpectacularThing").unwrap());

        assert!(store.open_key(r"Software\SpectacularThing").unwrap().is_some());
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_corrupt_file_is_backend_error() {
        let path = temp_file("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "[[[ not toml").unwrap();
        let store = FilePreferenceStore::new(&path);

        let err = store.open_key("Anything").unwrap_err();

        assert!(matches!(err, StoreError::Backend(msg) if msg.contains("corrupt")));
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }
}
