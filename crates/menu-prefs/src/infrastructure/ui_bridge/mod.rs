//! Command bridge: exposes the settings use case to a UI shell.
//!
//! [`SettingsPanel`] owns the [`SettingsForm`] and a [`SettingsStore`], and
//! offers one handler per user gesture: startup load, slider move, color
//! edit, preset button, apply, reset.  The CLI in `main.rs` is one such shell.
//!
//! # `CommandResult<T>` wrapper
//!
//! Every handler returns `CommandResult<T>` rather than `Result<T, E>`, so
//! every response has the same shape:
//! `{ success: bool, data: T | null, error: string | null }`.
//! Failures arrive as the message to show the user; no handler panics or
//! returns a typed error.

use menu_prefs_core::MenuColor;
use serde::Serialize;
use tracing::warn;

use crate::application::settings_form::{ColorPreset, FormState, SettingsForm};
use crate::application::sync_settings::{
    NotificationSink, PreferenceStore, SettingsError, SettingsStore,
};

// ── Data Transfer Objects ─────────────────────────────────────────────────────

/// Snapshot of the form as the shell renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormDto {
    pub delay_ms: u32,
    pub delay_label: String,
    pub color_text: String,
    /// Swatch color as `[r, g, b]`.
    pub preview: Option<[u8; 3]>,
    pub state: FormState,
}

impl From<&SettingsForm> for FormDto {
    fn from(form: &SettingsForm) -> Self {
        Self {
            delay_ms: form.delay().as_millis(),
            delay_label: form.delay_label(),
            color_text: form.color_text().to_string(),
            preview: form.preview().map(rgb_array),
            state: form.state(),
        }
    }
}

/// Live validation result for the color text box.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewDto {
    pub valid: bool,
    /// `None` means "keep the current swatch".
    pub color: Option<[u8; 3]>,
}

/// Result of a successful apply or reset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncDto {
    pub message: String,
    pub form: FormDto,
}

/// Unified response wrapper returned by every panel handler.
#[derive(Debug, Serialize)]
pub struct CommandResult<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> CommandResult<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

fn rgb_array(color: MenuColor) -> [u8; 3] {
    let (r, g, b) = color.to_tuple();
    [r, g, b]
}

// ── Panel ─────────────────────────────────────────────────────────────────────

/// The settings window minus the widgets.
pub struct SettingsPanel<S, N> {
    store: SettingsStore<S, N>,
    form: SettingsForm,
}

impl<S: PreferenceStore, N: NotificationSink> SettingsPanel<S, N> {
    /// Creates a panel showing the factory defaults.  Call [`load`](Self::load)
    /// before showing it.
    pub fn new(store: SettingsStore<S, N>) -> Self {
        Self {
            store,
            form: SettingsForm::default(),
        }
    }

    pub fn form(&self) -> &SettingsForm {
        &self.form
    }

    /// Startup load.  A storage fault becomes `"Load error: ..."`; whatever
    /// was adopted before the fault stays in the form.
    pub fn load(&mut self) -> CommandResult<FormDto> {
        match self.store.load(&mut self.form) {
            Ok(_) => CommandResult::ok(FormDto::from(&self.form)),
            Err(err) => {
                warn!(error = %err, "could not load backed-up settings");
                CommandResult::err(format!("Load error: {err}"))
            }
        }
    }

    /// Slider moved.
    pub fn on_delay_changed(&mut self, ms: i64) -> CommandResult<FormDto> {
        self.form.set_delay(ms);
        CommandResult::ok(FormDto::from(&self.form))
    }

    /// Color text edited.
    pub fn on_color_text_changed(&mut self, text: &str) -> CommandResult<FormDto> {
        self.form.set_color_text(text);
        CommandResult::ok(FormDto::from(&self.form))
    }

    /// Preset button clicked.
    pub fn on_preset(&mut self, preset: ColorPreset) -> CommandResult<FormDto> {
        self.form.apply_preset(preset);
        CommandResult::ok(FormDto::from(&self.form))
    }

    /// Validates `text` without touching the form.
    pub fn preview(&self, text: &str) -> CommandResult<PreviewDto> {
        CommandResult::ok(PreviewDto {
            valid: SettingsStore::<S, N>::validate(text),
            color: SettingsStore::<S, N>::compute_preview_color(text).map(rgb_array),
        })
    }

    /// Persists the form's current values.  On success the form is clean; on
    /// failure it keeps its values and state.
    pub fn apply(&mut self) -> CommandResult<SyncDto> {
        match self.store.apply(self.form.delay(), self.form.color_text()) {
            Ok(report) => {
                self.form.mark_clean();
                CommandResult::ok(SyncDto {
                    message: report.message.to_string(),
                    form: FormDto::from(&self.form),
                })
            }
            Err(err) => CommandResult::err(err.to_string()),
        }
    }

    /// Puts the defaults in the form, then persists them.  The form shows the
    /// defaults even when persisting fails.
    pub fn reset(&mut self) -> CommandResult<SyncDto> {
        self.form.reset_to_defaults();
        match self.store.reset() {
            Ok(report) => {
                self.form.mark_clean();
                CommandResult::ok(SyncDto {
                    message: report.message.to_string(),
                    form: FormDto::from(&self.form),
                })
            }
            Err(SettingsError::Storage(message)) => {
                CommandResult::err(format!("Reset error: {message}"))
            }
            Err(err) => CommandResult::err(err.to_string()),
        }
    }

    /// Convenience for shells that edit and commit in one step.
    pub fn apply_values(&mut self, delay: Option<i64>, color: Option<&str>) -> CommandResult<SyncDto> {
        if let Some(ms) = delay {
            self.form.set_delay(ms);
        }
        if let Some(text) = color {
            self.form.set_color_text(text);
        }
        self.apply()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
