//! Shell notification constants.
//!
//! After the registry values change, running programs only pick them up if
//! they are told to.  Two calls follow every successful write:
//!
//! 1. A `WM_SETTINGCHANGE` broadcast whose topic is `"Environment"`, sent with
//!    an abort-if-hung timeout of five seconds.
//! 2. A "refresh system parameters" call with flags asking the OS to both
//!    persist the user profile and broadcast the change.

use std::time::Duration;

/// Description of the "settings changed" broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettingChange {
    /// Topic string carried in the broadcast's `lParam`.
    pub topic: &'static str,
    /// How long to wait on each window before giving up on it.
    pub timeout: Duration,
}

impl SettingChange {
    /// Broadcast sent after apply and reset.
    pub const ENVIRONMENT: Self = Self {
        topic: "Environment",
        timeout: Duration::from_millis(5000),
    };

    /// Timeout in whole milliseconds, as the Win32 API expects.
    pub fn timeout_ms(&self) -> u32 {
        u32::try_from(self.timeout.as_millis()).unwrap_or(u32::MAX)
    }
}

/// Flags for the system-parameters refresh (`SPIF_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdateFlags(pub u32);

impl UpdateFlags {
    /// Write the new value to the user profile.
    pub const UPDATE_INI_FILE: u32 = 0x01;
    /// Broadcast `WM_SETTINGCHANGE` after updating the profile.
    pub const SEND_CHANGE: u32 = 0x02;

    /// Flags used after apply and reset.
    pub const PERSIST_AND_BROADCAST: Self = Self(Self::UPDATE_INI_FILE | Self::SEND_CHANGE);

    pub const fn contains(self, flag: u32) -> bool {
        self.0 & flag == flag
    }
}
