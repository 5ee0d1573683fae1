//! Current-user registry store.
//!
//! Keys are opened relative to `HKEY_CURRENT_USER`.  Values are always
//! written as `REG_SZ`; reads go through [`decode_registry_value`], so numeric
//! values come back as decimal text and other types read as absent.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Win32 registry FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use windows::core::PCWSTR;
use windows::Win32::Foundation::{ERROR_ACCESS_DENIED, ERROR_FILE_NOT_FOUND, ERROR_SUCCESS, WIN32_ERROR};
use windows::Win32::System::Registry::{
    RegCloseKey, RegCreateKeyExW, RegOpenKeyExW, RegQueryValueExW, RegSetValueExW, HKEY,
    HKEY_CURRENT_USER, KEY_READ, KEY_WRITE, REG_OPTION_NON_VOLATILE, REG_SZ, REG_VALUE_TYPE,
};
use tracing::debug;

use super::{decode_registry_value, normalize_path};
use crate::application::sync_settings::{PreferenceKey, PreferenceStore, StoreError};

/// [`PreferenceStore`] over `HKEY_CURRENT_USER`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RegistryPreferenceStore;

impl RegistryPreferenceStore {
    pub fn new() -> Self {
        Self
    }
}

impl PreferenceStore for RegistryPreferenceStore {
    type Key<'a> = RegistryKey;

    fn open_key(&self, path: &str) -> Result<Option<RegistryKey>, StoreError> {
        let path = normalize_path(path);
        let wide = to_wide(&path);
        let mut hkey = HKEY::default();

        // SAFETY: `wide` is NUL-terminated and outlives the call; `hkey` is a
        // valid out-pointer.
        let status = unsafe {
            RegOpenKeyExW(
                HKEY_CURRENT_USER,
                PCWSTR(wide.as_ptr()),
                None,
                KEY_READ,
                &mut hkey,
            )
        };

        match status {
            ERROR_SUCCESS => Ok(Some(RegistryKey { hkey, path })),
            ERROR_FILE_NOT_FOUND => Ok(None),
            other => Err(status_error(other, &path)),
        }
    }

    fn create_key(&self, path: &str) -> Result<RegistryKey, StoreError> {
        let path = normalize_path(path);
        let wide = to_wide(&path);
        let mut hkey = HKEY::default();

        // SAFETY: `wide` is NUL-terminated and outlives the call; `hkey` is a
        // valid out-pointer; no class, security attributes or disposition.
        let status = unsafe {
            RegCreateKeyExW(
                HKEY_CURRENT_USER,
                PCWSTR(wide.as_ptr()),
                None,
                PCWSTR::null(),
                REG_OPTION_NON_VOLATILE,
                KEY_READ | KEY_WRITE,
                None,
                &mut hkey,
                None,
            )
        };

        if status != ERROR_SUCCESS {
            return Err(status_error(status, &path));
        }
        Ok(RegistryKey { hkey, path })
    }
}

/// Open registry key.  Closed with `RegCloseKey` on drop.
#[derive(Debug)]
pub struct RegistryKey {
    hkey: HKEY,
    path: String,
}

impl PreferenceKey for RegistryKey {
    fn read_string(&self, name: &str) -> Result<Option<String>, StoreError> {
        let wide_name = to_wide(name);
        let mut size: u32 = 0;

        // SAFETY: size query only; no data buffer is passed.
        let status = unsafe {
            RegQueryValueExW(
                self.hkey,
                PCWSTR(wide_name.as_ptr()),
                None,
                None,
                None,
                Some(&mut size as *mut u32),
            )
        };
        match status {
            ERROR_SUCCESS => {}
            ERROR_FILE_NOT_FOUND => return Ok(None),
            other => return Err(status_error(other, &self.path)),
        }

        let mut buffer = vec![0u8; size as usize];
        let mut value_type = REG_VALUE_TYPE::default();

        // SAFETY: `buffer` holds `size` writable bytes and outlives the call;
        // `value_type` and `size` are valid out-pointers.
        let status = unsafe {
            RegQueryValueExW(
                self.hkey,
                PCWSTR(wide_name.as_ptr()),
                None,
                Some(&mut value_type as *mut REG_VALUE_TYPE),
                Some(buffer.as_mut_ptr()),
                Some(&mut size as *mut u32),
            )
        };
        if status != ERROR_SUCCESS {
            return Err(status_error(status, &self.path));
        }
        buffer.truncate(size as usize);

        let text = decode_registry_value(value_type.0, &buffer);
        if text.is_none() {
            debug!(path = %self.path, name, kind = value_type.0, "unsupported value type; treated as absent");
        }
        Ok(text)
    }

    fn write_string(&mut self, name: &str, value: &str) -> Result<(), StoreError> {
        let wide_name = to_wide(name);
        let data: Vec<u8> = to_wide(value).iter().flat_map(|c| c.to_le_bytes()).collect();

        // SAFETY: `wide_name` is NUL-terminated; `data` is a NUL-terminated
        // UTF-16LE string as REG_SZ requires.
        let status = unsafe {
            RegSetValueExW(self.hkey, PCWSTR(wide_name.as_ptr()), None, REG_SZ, Some(&data))
        };
        if status != ERROR_SUCCESS {
            return Err(status_error(status, &format!("{}\\{name}", self.path)));
        }
        Ok(())
    }
}

impl Drop for RegistryKey {
    fn drop(&mut self) {
        // SAFETY: `hkey` was opened by this module and is closed exactly once.
        let _ = unsafe { RegCloseKey(self.hkey) };
    }
}

fn to_wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}

fn status_error(status: WIN32_ERROR, path: &str) -> StoreError {
    if status == ERROR_ACCESS_DENIED {
        StoreError::AccessDenied {
            path: format!(r"HKEY_CURRENT_USER\{path}"),
        }
    } else {
        StoreError::Backend(format!(
            r"registry error {} at HKEY_CURRENT_USER\{path}: {}",
            status.0,
            windows::core::Error::from(status.to_hresult()).message()
        ))
    }
}
