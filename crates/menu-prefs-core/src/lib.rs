//! # menu-prefs-core
//!
//! Shared domain library for the menu preferences panel: the two settings it
//! edits, the rules that validate them, and where they live once persisted.
//!
//! This crate has zero dependencies on OS APIs, UI frameworks, or the
//! registry.  Everything here can be compiled and tested on any platform.
//!
//! # Architecture overview (for beginners)
//!
//! The panel edits two Windows shell preferences:
//!
//! - **Menu show delay** – how long (in milliseconds) the shell waits before
//!   expanding a hovered submenu.
//! - **Menu color** – the menu highlight color, stored as an `"R G B"` string.
//!
//! This crate defines:
//!
//! - **`domain::delay`** – [`MenuShowDelay`], always clamped to `0..=1000`.
//! - **`domain::color`** – [`MenuColor`] and the `"R G B"` text rules that
//!   run on every keystroke for the live preview.
//! - **`domain::location`** – the three persisted locations (desktop prefs,
//!   colors prefs, application backup) and the value names they hold.
//! - **`domain::notification`** – the constants describing the "settings
//!   changed" broadcast the shell expects after a write.

pub mod domain;

// Re-export the most-used types at the crate root so callers can write
// `menu_prefs_core::MenuColor` instead of `menu_prefs_core::domain::color::MenuColor`.
pub use domain::color::{compute_preview_color, is_valid_rgb, MenuColor, MenuColorError};
pub use domain::delay::MenuShowDelay;
pub use domain::location::{LocationWrite, PreferenceLayout, PreferenceLocation};
pub use domain::notification::{SettingChange, UpdateFlags};
