//! TOML-based configuration for the settings panel.
//!
//! Reads [`AppConfig`] from the platform-appropriate config file:
//! - Windows:  `%APPDATA%\MenuPrefs\config.toml`
//! - Linux:    `~/.config/menu-prefs/config.toml`
//! - macOS:    `~/Library/Application Support/MenuPrefs/config.toml`
//!
//! ```toml
//! [app]
//! log_level = "info"
//!
//! [store]
//! backend = "auto"
//! backup_key = "Software\\SpectacularThing"
//! ```
//!
//! Every field has a serde default, so a missing file, a missing section and
//! a missing key all fall back to the values above.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use menu_prefs_core::domain::location::DEFAULT_BACKUP_KEY_PATH;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name of the file-backend hive when `store.file_path` is unset.
pub const DEFAULT_PREFERENCES_FILE: &str = "preferences.toml";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub store: StoreSection,
}

/// General panel behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppSection {
    /// `tracing` level used when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Where the menu settings are persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StoreSection {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Hive file for the `file` backend.  Defaults to
    /// `<config dir>/preferences.toml`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    /// Key path of the application backup.
    #[serde(default = "default_backup_key")]
    pub backup_key: String,
}

/// Preference store backend selection.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// The registry on Windows, the file store elsewhere.
    #[default]
    Auto,
    Registry,
    File,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "registry" => Ok(Self::Registry),
            "file" => Ok(Self::File),
            other => Err(format!("unknown store backend '{other}' (expected auto, registry or file)")),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Auto => "auto",
            Self::Registry => "registry",
            Self::File => "file",
        })
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_backup_key() -> String {
    DEFAULT_BACKUP_KEY_PATH.to_string()
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            file_path: None,
            backup_key: default_backup_key(),
        }
    }
}

impl StoreSection {
    /// Hive file for the file backend, resolved against `config_dir` when unset.
    pub fn resolved_file_path(&self, config_dir: &Path) -> PathBuf {
        self.file_path
            .clone()
            .unwrap_or_else(|| config_dir.join(DEFAULT_PREFERENCES_FILE))
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the config file.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads [`AppConfig`] from the platform config file, or defaults if it does
/// not exist yet.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads [`AppConfig`] from `path`, or defaults if it does not exist.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(source) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("MenuPrefs"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("menu-prefs"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("MenuPrefs")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
