//! In-memory preference store for unit and integration testing.
//!
//! # Why a memory store?
//!
//! The real store writes to `HKEY_CURRENT_USER`, which:
//!
//! - Only exists on Windows.
//! - Changes the desktop of whoever runs the tests.
//! - Cannot be made to fail on demand.
//!
//! `MemoryPreferenceStore` keeps every key in a map, logs each successful
//! write in order, counts open handles, and can be told to fail specific
//! operations.
//!
//! # Sharing
//!
//! Clones share the same state, so a test can hand one clone to a
//! `SettingsStore` and keep another to inspect what happened:
//!
//! ```ignore
//! let prefs = MemoryPreferenceStore::new();
//! let store = SettingsStore::new(prefs.clone(), RecordingNotificationSink::new());
//! store.reset()?;
//! assert_eq!(prefs.writes().len(), 4);
//! assert_eq!(prefs.open_handles(), 0);
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use super::normalize_path;
use crate::application::sync_settings::{PreferenceKey, PreferenceStore, StoreError};

/// One successful write, as recorded by [`MemoryPreferenceStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteRecord {
    pub path: String,
    pub name: String,
    pub value: String,
}

#[derive(Debug, Default)]
struct State {
    keys: BTreeMap<String, BTreeMap<String, String>>,
    writes: Vec<WriteRecord>,
    open_handles: usize,
    write_attempts: usize,
    deny_writes: bool,
    failing_write: Option<(usize, StoreError)>,
    failing_reads: HashMap<String, StoreError>,
    failing_open: Option<StoreError>,
}

/// A [`PreferenceStore`] backed by an in-memory map.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    state: Arc<Mutex<State>>,
}

impl MemoryPreferenceStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("lock poisoned")
    }

    /// Sets a value directly, without logging a write.
    pub fn seed(&self, path: &str, name: &str, value: &str) {
        self.lock()
            .keys
            .entry(normalize_path(path))
            .or_default()
            .insert(name.to_string(), value.to_string());
    }

    /// Current value of `path\name`, if any.
    pub fn value(&self, path: &str, name: &str) -> Option<String> {
        self.lock()
            .keys
            .get(&normalize_path(path))
            .and_then(|values| values.get(name).cloned())
    }

    /// Returns `true` if the key exists (even with no values).
    pub fn has_key(&self, path: &str) -> bool {
        self.lock().keys.contains_key(&normalize_path(path))
    }

    /// Successful writes, oldest first.
    pub fn writes(&self) -> Vec<WriteRecord> {
        self.lock().writes.clone()
    }

    /// Number of key handles currently alive.
    pub fn open_handles(&self) -> usize {
        self.lock().open_handles
    }

    /// Makes every subsequent write fail with [`StoreError::AccessDenied`].
    pub fn deny_writes(&self) {
        self.lock().deny_writes = true;
    }

    /// Makes the `n`th write attempt (1-based, counted from now) fail with `err`.
    pub fn fail_write_number(&self, n: usize, err: StoreError) {
        let mut state = self.lock();
        let target = state.write_attempts + n;
        state.failing_write = Some((target, err));
    }

    /// Makes every read of value `name` fail with `err`.
    pub fn fail_read_of(&self, name: &str, err: StoreError) {
        self.lock().failing_reads.insert(name.to_string(), err);
    }

    /// Makes every open and create fail with `err`.
    pub fn fail_open(&self, err: StoreError) {
        self.lock().failing_open = Some(err);
    }

    fn handle(&self, path: String) -> MemoryKey {
        self.lock().open_handles += 1;
        MemoryKey {
            state: Arc::clone(&self.state),
            path,
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    type Key<'a> = MemoryKey;

    fn open_key(&self, path: &str) -> Result<Option<MemoryKey>, StoreError> {
        let path = normalize_path(path);
        {
            let state = self.lock();
            if let Some(err) = &state.failing_open {
                return Err(err.clone());
            }
            if !state.keys.contains_key(&path) {
                return Ok(None);
            }
        }
        Ok(Some(self.handle(path)))
    }

    fn create_key(&self, path: &str) -> Result<MemoryKey, StoreError> {
        let path = normalize_path(path);
        {
            let mut state = self.lock();
            if let Some(err) = &state.failing_open {
                return Err(err.clone());
            }
            state.keys.entry(path.clone()).or_default();
        }
        Ok(self.handle(path))
    }
}

/// Open key handle for [`MemoryPreferenceStore`].  Decrements the open-handle
/// count on drop.
#[derive(Debug)]
pub struct MemoryKey {
    state: Arc<Mutex<State>>,
    path: String,
}

impl MemoryKey {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("lock poisoned")
    }
}

impl PreferenceKey for MemoryKey {
    fn read_string(&self, name: &str) -> Result<Option<String>, StoreError> {
        let state = self.lock();
        if let Some(err) = state.failing_reads.get(name) {
            return Err(err.clone());
        }
        Ok(state
            .keys
            .get(&self.path)
            .and_then(|values| values.get(name).cloned()))
    }

    fn write_string(&mut self, name: &str, value: &str) -> Result<(), StoreError> {
        let mut state = self.lock();
        state.write_attempts += 1;

        if state.deny_writes {
            return Err(StoreError::AccessDenied {
                path: format!("{}\\{name}", self.path),
            });
        }
        if let Some((target, err)) = &state.failing_write {
            if *target == state.write_attempts {
                return Err(err.clone());
            }
        }

        state
            .keys
            .entry(self.path.clone())
            .or_default()
            .insert(name.to_string(), value.to_string());
        state.writes.push(WriteRecord {
            path: self.path.clone(),
            name: name.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }
}

impl Drop for MemoryKey {
    fn drop(&mut self) {
        // Never panic in drop, even on a poisoned lock.
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        state.open_handles = state.open_handles.saturating_sub(1);
    }
}
