//! Menu show delay domain value.
//!
//! The shell reads `MenuShowDelay` as a decimal string of milliseconds.  The
//! panel's slider only ever produces values in `0..=1000`, and anything read
//! back from storage is clamped into the same range.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Time (in milliseconds) the shell waits before expanding a hovered submenu.
///
/// The inner value is always within [`MenuShowDelay::MIN_MS`]..=[`MenuShowDelay::MAX_MS`];
/// every constructor clamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u32")]
pub struct MenuShowDelay(u32);

impl MenuShowDelay {
    /// Smallest accepted delay.
    pub const MIN_MS: u32 = 0;
    /// Largest accepted delay.
    pub const MAX_MS: u32 = 1000;
    /// Windows default for a fresh profile.
    pub const DEFAULT_MS: u32 = 400;

    pub const DEFAULT: Self = Self(Self::DEFAULT_MS);

    /// Builds a delay from any integer, clamping it into `0..=1000`.
    pub fn clamped(ms: i64) -> Self {
        let ms = ms.clamp(i64::from(Self::MIN_MS), i64::from(Self::MAX_MS));
        // In range after the clamp above.
        Self(ms as u32)
    }

    /// Parses a stored delay string.
    ///
    /// Surrounding whitespace and a leading sign are accepted, the value must
    /// fit in an `i32`, and the result is clamped.  Returns `None` when the
    /// text is not an integer so callers can keep whatever value they already
    /// had instead of falling back to the default.
    pub fn from_stored(text: &str) -> Option<Self> {
        text.trim()
            .parse::<i32>()
            .ok()
            .map(|ms| Self::clamped(i64::from(ms)))
    }

    /// Returns the delay in milliseconds.
    pub const fn as_millis(self) -> u32 {
        self.0
    }

    /// Returns the decimal string written to storage (e.g. `"400"`).
    pub fn to_stored(self) -> String {
        self.0.to_string()
    }
}

impl Default for MenuShowDelay {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for MenuShowDelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for MenuShowDelay {
    fn from(ms: i64) -> Self {
        Self::clamped(ms)
    }
}

impl From<MenuShowDelay> for u32 {
    fn from(delay: MenuShowDelay) -> Self {
        delay.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_400_ms() {
        assert_eq!(MenuShowDelay::default().as_millis(), 400);
    }

    #[test]
    fn test_clamped_keeps_every_in_range_value() {
        for ms in 0..=1000 {
            assert_eq!(MenuShowDelay::clamped(ms).as_millis(), ms as u32);
        }
    }

    #[test]
    fn test_clamped_limits_out_of_range_values() {
        assert_eq!(MenuShowDelay::clamped(-1).as_millis(), 0);
        assert_eq!(MenuShowDelay::clamped(i64::MIN).as_millis(), 0);
        assert_eq!(MenuShowDelay::clamped(1001).as_millis(), 1000);
        assert_eq!(MenuShowDelay::clamped(i64::MAX).as_millis(), 1000);
    }

    #[test]
    fn test_from_stored_parses_and_clamps() {
        assert_eq!(MenuShowDelay::from_stored("250"), Some(MenuShowDelay::clamped(250)));
        assert_eq!(MenuShowDelay::from_stored(" 250 "), Some(MenuShowDelay::clamped(250)));
        assert_eq!(MenuShowDelay::from_stored("+7"), Some(MenuShowDelay::clamped(7)));
        assert_eq!(MenuShowDelay::from_stored("-20"), Some(MenuShowDelay::clamped(0)));
        assert_eq!(MenuShowDelay::from_stored("5000"), Some(MenuShowDelay::clamped(1000)));
    }

    #[test]
    fn test_from_stored_rejects_non_integers() {
        assert_eq!(MenuShowDelay::from_stored(""), None);
        assert_eq!(MenuShowDelay::from_stored("fast"), None);
        assert_eq!(MenuShowDelay::from_stored("12.5"), None);
        // Does not fit in an i32.
        assert_eq!(MenuShowDelay::from_stored("9999999999"), None);
    }

    #[test]
    fn test_to_stored_is_plain_decimal() {
        assert_eq!(MenuShowDelay::clamped(0).to_stored(), "0");
        assert_eq!(MenuShowDelay::DEFAULT.to_stored(), "400");
    }
}
