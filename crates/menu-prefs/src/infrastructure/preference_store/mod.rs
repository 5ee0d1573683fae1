//! Preference store implementations.
//!
//! | Module    | Platform | Backing storage                                  |
//! |-----------|----------|--------------------------------------------------|
//! | `windows` | Windows  | `HKEY_CURRENT_USER` via `RegCreateKeyExW` & co.   |
//! | `file`    | any      | A TOML file mapping key paths to string values   |
//! | `mock`    | any      | In-memory map with write log and fault injection |
//!
//! `mock` and `file` are always compiled so tests and non-Windows hosts can use
//! them.  On Windows, `NativePreferenceStore` is the registry store.

pub mod file;
pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "windows")]
pub use self::windows::RegistryPreferenceStore as NativePreferenceStore;

/// Splits a backslash-separated key path into its non-empty segments.
pub(crate) fn path_segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('\\').filter(|s| !s.is_empty())
}

/// Canonical form of a key path: segments joined by `\`, no leading,
/// trailing or doubled separators.
pub(crate) fn normalize_path(path: &str) -> String {
    path_segments(path).collect::<Vec<_>>().join("\\")
}

/// Registry value type codes, as returned by `RegQueryValueExW`.
pub(crate) mod value_type {
    pub const REG_SZ: u32 = 1;
    pub const REG_EXPAND_SZ: u32 = 2;
    pub const REG_DWORD: u32 = 4;
    pub const REG_QWORD: u32 = 11;
}

/// Turns raw registry value data into the text a [`PreferenceKey`] reports.
///
/// String types decode as UTF-16LE without the trailing NULs.  `REG_DWORD`
/// and `REG_QWORD` become their decimal text, so a delay written as a number
/// by another tool still loads.  Any other type, or numeric data of the wrong
/// width, reads as absent.
///
/// [`PreferenceKey`]: crate::application::sync_settings::PreferenceKey
#[cfg_attr(not(target_os = "windows"), allow(dead_code))]
pub(crate) fn decode_registry_value(kind: u32, data: &[u8]) -> Option<String> {
    match kind {
        value_type::REG_SZ | value_type::REG_EXPAND_SZ => {
            let mut units: Vec<u16> = data
                .chunks_exact(2)
                .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
                .collect();
            while units.last() == Some(&0) {
                units.pop();
            }
            Some(String::from_utf16_lossy(&units))
        }
        value_type::REG_DWORD => {
            let bytes: [u8; 4] = data.try_into().ok()?;
            Some(u32::from_le_bytes(bytes).to_string())
        }
        value_type::REG_QWORD => {
            let bytes: [u8; 8] = data.try_into().ok()?;
            Some(u64::from_le_bytes(bytes).to_string())
        }
        _ => None,
    }
}
