//! Storage infrastructure: the panel's own configuration file.
//!
//! The `config` sub-module reads and writes `config.toml` in the platform
//! config directory and supplies defaults on first run.  The menu settings
//! themselves live in the preference store, not here.

pub mod config;
