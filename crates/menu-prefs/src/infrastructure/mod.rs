//! Infrastructure layer for the settings panel.
//!
//! Contains OS-facing adapters: the registry-backed preference store, the
//! shell notification calls, the configuration file, and the command bridge
//! the UI shell calls into.
//!
//! **Dependency rule**: this layer may depend on `application` and
//! `menu_prefs_core`, but MUST NOT be imported by the `application` or domain
//! layers (test modules excepted).
//!
//! # Sub-modules
//!
//! - **`preference_store`** – Implementations of `PreferenceStore`: the
//!   current-user registry on Windows, a TOML file elsewhere, and an in-memory
//!   recording store for tests.
//!
//! - **`notification`** – Implementations of `NotificationSink`:
//!   `WM_SETTINGCHANGE` + `SystemParametersInfoW` on Windows, a log-only sink
//!   elsewhere, and a recording sink for tests.
//!
//! - **`storage`** – `config.toml` persistence for the panel's own settings.
//!
//! - **`ui_bridge`** – Command handlers that turn every use-case outcome into a
//!   message the shell can display.

pub mod notification;
pub mod preference_store;
pub mod storage;
pub mod ui_bridge;
