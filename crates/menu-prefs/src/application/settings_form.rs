//! The in-memory field pair the shell edits.
//!
//! [`SettingsForm`] stands in for the slider, the color text box and the
//! preview swatch.  The shell owns it; [`SettingsStore`] only receives its
//! values as parameters (and, for `load`, writes into it).
//!
//! # Clean / Dirty
//!
//! ```text
//!            user edit
//!   Clean  ────────────►  Dirty
//!     ▲                     │
//!     └─────────────────────┘
//!      load / successful apply / successful reset
//! ```
//!
//! A field can hold perfectly valid text and still be `Dirty`; validity and
//! persistence are tracked separately.
//!
//! [`SettingsStore`]: crate::application::sync_settings::SettingsStore

use std::fmt;
use std::str::FromStr;

use menu_prefs_core::{compute_preview_color, MenuColor, MenuShowDelay};
use serde::Serialize;

/// Whether the form matches the last persisted values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormState {
    Clean,
    Dirty,
}

/// Same spelling as the serialized form.
impl fmt::Display for FormState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Clean => "clean",
            Self::Dirty => "dirty",
        })
    }
}

/// Quick-pick color buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorPreset {
    Red,
    Green,
    Blue,
}

impl ColorPreset {
    pub const fn color(self) -> MenuColor {
        match self {
            Self::Red => MenuColor::RED,
            Self::Green => MenuColor::GREEN,
            Self::Blue => MenuColor::BLUE,
        }
    }
}

impl FromStr for ColorPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "red" => Ok(Self::Red),
            "green" => Ok(Self::Green),
            "blue" => Ok(Self::Blue),
            other => Err(format!("unknown preset {other:?} (expected red, green or blue)")),
        }
    }
}

impl fmt::Display for ColorPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
        })
    }
}

/// Delay slider, color text box and preview swatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsForm {
    delay: MenuShowDelay,
    color_text: String,
    preview: Option<MenuColor>,
    state: FormState,
}

impl Default for SettingsForm {
    fn default() -> Self {
        let color_text = MenuColor::WHITE.to_string();
        Self {
            delay: MenuShowDelay::DEFAULT,
            preview: compute_preview_color(&color_text),
            color_text,
            state: FormState::Clean,
        }
    }
}

impl SettingsForm {
    pub fn delay(&self) -> MenuShowDelay {
        self.delay
    }

    /// Raw color text exactly as typed (or loaded).
    pub fn color_text(&self) -> &str {
        &self.color_text
    }

    /// Last valid color shown in the swatch.
    pub fn preview(&self) -> Option<MenuColor> {
        self.preview
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn is_dirty(&self) -> bool {
        self.state == FormState::Dirty
    }

    /// Label shown next to the slider.
    pub fn delay_label(&self) -> String {
        format!("Menu Show Delay: {} ms", self.delay)
    }

    /// Moves the slider.  The value is clamped like the slider's own range.
    pub fn set_delay(&mut self, ms: i64) {
        let delay = MenuShowDelay::clamped(ms);
        if delay != self.delay {
            self.delay = delay;
            self.state = FormState::Dirty;
        }
    }

    /// Replaces the color text and refreshes the preview when the text is valid.
    pub fn set_color_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.color_text {
            self.color_text = text;
            self.state = FormState::Dirty;
        }
        self.refresh_preview();
    }

    pub fn apply_preset(&mut self, preset: ColorPreset) {
        self.set_color_text(preset.color().to_string());
    }

    /// Puts the factory defaults in the fields.  Persisting them is the
    /// store's job; until that succeeds the form is `Dirty`.
    pub fn reset_to_defaults(&mut self) {
        self.set_delay(i64::from(MenuShowDelay::DEFAULT_MS));
        self.set_color_text(MenuColor::WHITE.to_string());
    }

    /// Marks the fields as matching what is persisted.
    pub fn mark_clean(&mut self) {
        self.state = FormState::Clean;
    }

    pub(crate) fn adopt_delay(&mut self, delay: MenuShowDelay) {
        self.delay = delay;
    }

    pub(crate) fn adopt_color_text(&mut self, text: String) {
        self.color_text = text;
        self.refresh_preview();
    }

    /// Invalid or empty text keeps the previous swatch.
    fn refresh_preview(&mut self) {
        if let Some(color) = compute_preview_color(&self.color_text) {
            self.preview = Some(color);
        }
    }
}
