//! Application layer use cases for the settings panel.
//!
//! Use cases in this layer:
//!
//! - **Orchestrate** domain objects to fulfil a user goal (e.g., "write the
//!   new delay and color everywhere the shell looks, then tell it").
//! - **Depend on abstractions** (traits) rather than concrete implementations,
//!   so the registry and the broadcast calls can be swapped for fakes.
//! - **Contain no OS calls and no file system access**.
//!
//! # Sub-modules
//!
//! - **`sync_settings`** – `SettingsStore`: load from the backup location,
//!   validate, apply to all three locations, reset to defaults, notify.
//!
//! - **`settings_form`** – The in-memory field pair the shell edits, with its
//!   Clean/Dirty state, live preview and color presets.

pub mod settings_form;
pub mod sync_settings;
