//! Persisted locations for the two settings.
//!
//! Both settings live in three independent places under the current-user hive:
//!
//! | Location    | Key path                    | Values                    |
//! |-------------|-----------------------------|---------------------------|
//! | `Desktop`   | `Control Panel\Desktop`     | `MenuShowDelay`           |
//! | `Colors`    | `Control Panel\Colors`      | `Menu`                    |
//! | `AppBackup` | `Software\SpectacularThing` | `MenuShowDelay`, `Menu`   |
//!
//! The shell reads the first two; the panel reads only the backup at startup.
//! Every value is stored as a string, never as a native integer.

use std::fmt;

use crate::domain::delay::MenuShowDelay;

/// Value name holding the delay (decimal milliseconds).
pub const DELAY_VALUE_NAME: &str = "MenuShowDelay";
/// Value name holding the `"R G B"` color text.
pub const COLOR_VALUE_NAME: &str = "Menu";

pub const DESKTOP_KEY_PATH: &str = r"Control Panel\Desktop";
pub const COLORS_KEY_PATH: &str = r"Control Panel\Colors";
pub const DEFAULT_BACKUP_KEY_PATH: &str = r"Software\SpectacularThing";

/// One of the three places the settings are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceLocation {
    /// OS desktop preferences (the delay).
    Desktop,
    /// OS color preferences (the menu color).
    Colors,
    /// Application-private copy of both values.
    AppBackup,
}

impl PreferenceLocation {
    /// Order in which apply and reset write the locations.
    pub const WRITE_ORDER: [Self; 3] = [Self::Desktop, Self::Colors, Self::AppBackup];

    /// Value names this location holds, in write order.
    pub const fn value_names(self) -> &'static [&'static str] {
        match self {
            Self::Desktop => &[DELAY_VALUE_NAME],
            Self::Colors => &[COLOR_VALUE_NAME],
            Self::AppBackup => &[DELAY_VALUE_NAME, COLOR_VALUE_NAME],
        }
    }
}

impl fmt::Display for PreferenceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Desktop => "desktop",
            Self::Colors => "colors",
            Self::AppBackup => "backup",
        };
        f.write_str(name)
    }
}

/// The string values to write to one location, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationWrite<'a> {
    pub location: PreferenceLocation,
    pub key_path: &'a str,
    pub values: Vec<(&'static str, String)>,
}

/// Key paths for every [`PreferenceLocation`].
///
/// The OS paths are fixed; only the backup path may be relocated through
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceLayout {
    backup_key_path: String,
}

impl PreferenceLayout {
    pub fn new(backup_key_path: impl Into<String>) -> Self {
        Self {
            backup_key_path: backup_key_path.into(),
        }
    }

    /// Key path of `location`, relative to the current-user hive.
    pub fn key_path(&self, location: PreferenceLocation) -> &str {
        match location {
            PreferenceLocation::Desktop => DESKTOP_KEY_PATH,
            PreferenceLocation::Colors => COLORS_KEY_PATH,
            PreferenceLocation::AppBackup => &self.backup_key_path,
        }
    }

    /// Every write needed to persist `delay` and `color_text`, grouped by
    /// location and in write order.
    pub fn planned_writes(&self, delay: MenuShowDelay, color_text: &str) -> Vec<LocationWrite<'_>> {
        PreferenceLocation::WRITE_ORDER
            .iter()
            .map(|&location| LocationWrite {
                location,
                key_path: self.key_path(location),
                values: location
                    .value_names()
                    .iter()
                    .map(|&name| {
                        let value = if name == DELAY_VALUE_NAME {
                            delay.to_stored()
                        } else {
                            color_text.to_string()
                        };
                        (name, value)
                    })
                    .collect(),
            })
            .collect()
    }
}

impl Default for PreferenceLayout {
    fn default() -> Self {
        Self::new(DEFAULT_BACKUP_KEY_PATH)
    }
}
