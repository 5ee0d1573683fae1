//! Menu Prefs entry point.
//!
//! A command-line shell over [`SettingsPanel`]: each subcommand is one user
//! gesture (startup load, preview, apply, preset, reset).
//!
//! ```text
//! main()
//!  └─ load_config()            -- config.toml, defaults on first run
//!  └─ tracing_subscriber       -- RUST_LOG, else [app] log_level
//!  └─ pick backend
//!       ├─ registry            -- HKCU + WM_SETTINGCHANGE (Windows)
//!       └─ file                -- preferences.toml + log-only notifier
//!  └─ run(panel, command)
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use menu_prefs::application::settings_form::ColorPreset;
use menu_prefs::application::sync_settings::{NotificationSink, PreferenceStore, SettingsStore};
use menu_prefs::infrastructure::notification::log::LogNotificationSink;
use menu_prefs::infrastructure::preference_store::file::FilePreferenceStore;
use menu_prefs::infrastructure::storage::config::{config_dir, load_config, AppConfig, StoreBackend};
use menu_prefs::infrastructure::ui_bridge::{CommandResult, FormDto, SettingsPanel, SyncDto};
use menu_prefs_core::PreferenceLayout;

#[derive(Parser)]
#[command(name = "menu-prefs")]
#[command(about = "View and change the menu show delay and menu color")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print the full command result as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Preference store backend: auto, registry or file
    #[arg(long, global = true, value_name = "BACKEND")]
    store: Option<StoreBackend>,

    /// Hive file used by the file backend
    #[arg(long, global = true, value_name = "PATH")]
    store_file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Load the backed-up settings and print them
    Show,
    /// Check a color string and print its preview
    Preview {
        /// Color as three integers, e.g. "255 128 0"
        color: String,
    },
    /// Set the delay and/or color, then persist and notify
    Apply {
        /// Menu show delay in milliseconds (clamped to 0..=1000)
        #[arg(long, allow_hyphen_values = true)]
        delay: Option<i64>,
        /// Menu color as three integers, e.g. "255 128 0"
        #[arg(long)]
        color: Option<String>,
    },
    /// Pick a preset color, then persist and notify
    Preset {
        /// red, green or blue
        preset: ColorPreset,
        /// Menu show delay in milliseconds (clamped to 0..=1000)
        #[arg(long, allow_hyphen_values = true)]
        delay: Option<i64>,
    },
    /// Restore 400 ms and white, then persist and notify
    Reset,
}

fn main() -> ExitCode {
    match try_main() {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn try_main() -> anyhow::Result<bool> {
    let cli = Cli::parse();
    let config = load_config().context("failed to load config.toml")?;

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.app.log_level)),
        )
        .init();

    let layout = PreferenceLayout::new(config.store.backup_key.clone());
    let backend = cli.store.unwrap_or(config.store.backend);
    debug!(%backend, backup_key = %config.store.backup_key, "selecting preference store");

    match resolve_backend(backend) {
        StoreBackend::Registry => run_registry(layout, cli.command, cli.json),
        _ => {
            let path = match cli.store_file.clone() {
                Some(path) => path,
                None => file_store_path(&config)?,
            };
            info!(path = %path.display(), "using file preference store");
            let store = SettingsStore::with_layout(
                FilePreferenceStore::new(path),
                LogNotificationSink::new(),
                layout,
            );
            run(SettingsPanel::new(store), cli.command, cli.json)
        }
    }
}

/// `auto` means the registry on Windows and the file store elsewhere.
fn resolve_backend(backend: StoreBackend) -> StoreBackend {
    match backend {
        StoreBackend::Auto if cfg!(target_os = "windows") => StoreBackend::Registry,
        StoreBackend::Auto => StoreBackend::File,
        other => other,
    }
}

fn file_store_path(config: &AppConfig) -> anyhow::Result<PathBuf> {
    if let Some(path) = &config.store.file_path {
        return Ok(path.clone());
    }
    let dir = config_dir().context("no config directory for the preference file; pass --store-file")?;
    Ok(config.store.resolved_file_path(&dir))
}

#[cfg(target_os = "windows")]
fn run_registry(layout: PreferenceLayout, command: Command, json: bool) -> anyhow::Result<bool> {
    use menu_prefs::infrastructure::notification::NativeNotificationSink;
    use menu_prefs::infrastructure::preference_store::NativePreferenceStore;

    let store = SettingsStore::with_layout(
        NativePreferenceStore::new(),
        NativeNotificationSink::new(),
        layout,
    );
    run(SettingsPanel::new(store), command, json)
}

#[cfg(not(target_os = "windows"))]
fn run_registry(_layout: PreferenceLayout, _command: Command, _json: bool) -> anyhow::Result<bool> {
    anyhow::bail!("the registry backend is only available on Windows; use --store file")
}

/// Runs one command.  Returns whether it succeeded.
fn run<S: PreferenceStore, N: NotificationSink>(
    mut panel: SettingsPanel<S, N>,
    command: Command,
    json: bool,
) -> anyhow::Result<bool> {
    match command {
        Command::Show => emit(panel.load(), json, render_form),
        Command::Preview { color } => emit(panel.preview(&color), json, |preview| {
            match preview.color {
                Some([r, g, b]) => format!("valid: {r} {g} {b}"),
                None => "invalid: Use: 255 255 255".to_string(),
            }
        }),
        Command::Apply { delay, color } => {
            load_before_edit(&mut panel);
            emit(panel.apply_values(delay, color.as_deref()), json, render_sync)
        }
        Command::Preset { preset, delay } => {
            load_before_edit(&mut panel);
            if let Some(ms) = delay {
                panel.on_delay_changed(ms);
            }
            panel.on_preset(preset);
            emit(panel.apply(), json, render_sync)
        }
        Command::Reset => emit(panel.reset(), json, render_sync),
    }
}

/// Startup load ahead of an edit.  A failed load is reported but never blocks
/// the write, so an unreadable backup can still be overwritten.
fn load_before_edit<S: PreferenceStore, N: NotificationSink>(panel: &mut SettingsPanel<S, N>) {
    if let Some(error) = panel.load().error {
        eprintln!("{error}");
        warn!("continuing from the values loaded so far");
    }
}

fn emit<T: Serialize>(
    result: CommandResult<T>,
    json: bool,
    render: impl FnOnce(&T) -> String,
) -> anyhow::Result<bool> {
    if json {
        println!("{}", serde_json::to_string_pretty(&result).context("failed to encode result")?);
    } else if let Some(data) = &result.data {
        println!("{}", render(data));
    } else if let Some(error) = &result.error {
        eprintln!("{error}");
    }
    Ok(result.success)
}

fn render_form(form: &FormDto) -> String {
    let preview = form
        .preview
        .map(|[r, g, b]| format!("{r} {g} {b}"))
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{}\nMenu color: {}\nPreview: {}\nState: {}",
        form.delay_label, form.color_text, preview, form.state
    )
}

fn render_sync(sync: &SyncDto) -> String {
    format!("{}\n{}", sync.message, render_form(&sync.form))
}
