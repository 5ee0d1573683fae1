//! SyncSettingsUseCase: keeps the form, the shell's registry values and the
//! application backup consistent.
//!
//! [`SettingsStore`] is the single entry point the shell calls into:
//!
//! - [`SettingsStore::load`] reads the application backup once at startup and
//!   copies whatever it finds into the form.
//! - [`SettingsStore::validate`] / [`SettingsStore::compute_preview_color`]
//!   run on every keystroke in the color field.
//! - [`SettingsStore::apply`] validates, writes to all three locations and
//!   notifies the shell.
//! - [`SettingsStore::reset`] does the same with the factory defaults.
//!
//! # Storage handles
//!
//! The store talks to a [`PreferenceStore`], which hands out scoped
//! [`PreferenceKey`] handles.  A handle is released when it is dropped, so
//! every early return (including `?`) releases it.
//!
//! # Partial writes
//!
//! The writes to the desktop, colors and backup locations are independent.  If
//! the second write fails the first one has already landed and is not rolled
//! back; the caller gets the error and the locations disagree until the next
//! successful apply or reset.

use menu_prefs_core::domain::location::{COLOR_VALUE_NAME, DELAY_VALUE_NAME};
use menu_prefs_core::{
    compute_preview_color, is_valid_rgb, MenuColor, MenuColorError, MenuShowDelay,
    PreferenceLayout, PreferenceLocation, SettingChange, UpdateFlags,
};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::application::settings_form::SettingsForm;

/// Shown after a successful apply.
pub const APPLIED_MESSAGE: &str =
    "Settings applied! Press F5 on desktop for color. Re-log for delay.";

/// Shown after a successful reset.
pub const RESET_MESSAGE: &str = "Reset to defaults! Press F5 on desktop or re-login.";

// ── Storage port ──────────────────────────────────────────────────────────────

/// Error type for preference store operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The OS refused access to the key or value.
    #[error("access to {path} is denied")]
    AccessDenied { path: String },

    /// Any other backend fault (I/O, corrupt data, wrong value type, ...).
    #[error("{0}")]
    Backend(String),
}

/// An open key in a [`PreferenceStore`].
///
/// Implementations release the underlying handle in `Drop`.
pub trait PreferenceKey {
    /// Reads a string value; `Ok(None)` when the value does not exist.
    fn read_string(&self, name: &str) -> Result<Option<String>, StoreError>;

    /// Writes (creating or replacing) a string value.
    fn write_string(&mut self, name: &str, value: &str) -> Result<(), StoreError>;
}

/// Hierarchical string key/value store modelled on the current-user registry hive.
///
/// Key paths are backslash-separated and relative to the hive root, e.g.
/// `Control Panel\Desktop`.
pub trait PreferenceStore {
    /// Handle type returned by [`open_key`](Self::open_key) and [`create_key`](Self::create_key).
    type Key<'a>: PreferenceKey
    where
        Self: 'a;

    /// Opens an existing key for reading; `Ok(None)` when it does not exist.
    fn open_key(&self, path: &str) -> Result<Option<Self::Key<'_>>, StoreError>;

    /// Opens a key for writing, creating it (and its parents) if needed.
    fn create_key(&self, path: &str) -> Result<Self::Key<'_>, StoreError>;
}

// ── Notification port ─────────────────────────────────────────────────────────

/// Error type for shell notification calls.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotifyError {
    #[error("settings-changed broadcast failed: {0}")]
    Broadcast(String),
    #[error("system parameters refresh failed: {0}")]
    Refresh(String),
}

/// Tells running programs that shell settings changed.
///
/// The production implementation broadcasts `WM_SETTINGCHANGE`; tests use
/// [`crate::infrastructure::notification::mock::RecordingNotificationSink`].
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink {
    /// Broadcasts a "settings changed" message carrying `topic`.
    fn send(&self, topic: &str, timeout_ms: u32) -> Result<(), NotifyError>;

    /// Asks the OS to re-read its system parameters.
    fn refresh_metrics(&self, flags: UpdateFlags) -> Result<(), NotifyError>;
}

// ── Errors and results ────────────────────────────────────────────────────────

/// Error type for apply and reset.
///
/// The `Display` text of each variant is the message shown to the user.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    /// The color text is not three integers in `0..=255`.  Nothing was written.
    #[error("Invalid RGB format! Use: 255 255 255")]
    Validation(#[source] MenuColorError),

    /// A write was denied.  Writes before it in the same call have landed.
    #[error("Access denied. Try running as administrator.")]
    Permission { path: String },

    /// Any other storage fault; carries the fault description.
    #[error("Error: {0}")]
    Storage(String),
}

impl From<StoreError> for SettingsError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AccessDenied { path } => Self::Permission { path },
            StoreError::Backend(message) => Self::Storage(message),
        }
    }
}

/// What [`SettingsStore::load`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The backup key does not exist; the form keeps its defaults.
    NoBackup,
    /// The backup key exists.  Each flag says whether that value was adopted.
    Loaded { delay: bool, color: bool },
}

/// Values written by a successful apply or reset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    pub delay: MenuShowDelay,
    /// Trimmed color text as stored.
    pub color_text: String,
    /// Message for the user.
    pub message: &'static str,
}

// ── Use case ──────────────────────────────────────────────────────────────────

/// Loads, validates, applies and resets the menu settings.
///
/// The store never caches form state between calls: every operation takes the
/// values it needs as parameters.
pub struct SettingsStore<S, N> {
    preferences: S,
    notifier: N,
    layout: PreferenceLayout,
}

impl<S: PreferenceStore, N: NotificationSink> SettingsStore<S, N> {
    /// Creates a store that uses the default key layout.
    pub fn new(preferences: S, notifier: N) -> Self {
        Self::with_layout(preferences, notifier, PreferenceLayout::default())
    }

    /// Creates a store with a relocated backup key.
    pub fn with_layout(preferences: S, notifier: N, layout: PreferenceLayout) -> Self {
        Self {
            preferences,
            notifier,
            layout,
        }
    }

    /// Copies the backed-up settings into `form`.
    ///
    /// The delay and color are read independently.  A delay that is not an
    /// integer leaves the form's delay untouched; an empty color leaves the
    /// form's color untouched; a non-empty color is adopted without validation.
    /// On success (including a missing backup) the form is marked clean.
    ///
    /// # Errors
    ///
    /// Returns the first [`StoreError`].  Values adopted before the fault stay
    /// in the form.
    pub fn load(&self, form: &mut SettingsForm) -> Result<LoadOutcome, StoreError> {
        let path = self.layout.key_path(PreferenceLocation::AppBackup);
        let Some(key) = self.preferences.open_key(path)? else {
            debug!(path, "no backup key; keeping form defaults");
            form.mark_clean();
            return Ok(LoadOutcome::NoBackup);
        };

        let delay_text = key.read_string(DELAY_VALUE_NAME)?.unwrap_or_default();
        let delay = MenuShowDelay::from_stored(&delay_text);
        match delay {
            Some(delay) => form.adopt_delay(delay),
            None => debug!(value = %delay_text, "stored delay is not an integer; ignored"),
        }

        let color_text = key.read_string(COLOR_VALUE_NAME)?.unwrap_or_default();
        let color_adopted = !color_text.is_empty();
        if color_adopted {
            form.adopt_color_text(color_text);
        }

        form.mark_clean();
        info!(delay = %form.delay(), color = form.color_text(), "settings loaded from backup");
        Ok(LoadOutcome::Loaded {
            delay: delay.is_some(),
            color: color_adopted,
        })
    }

    /// Returns `true` if `raw_color` is three integers in `0..=255`.
    pub fn validate(raw_color: &str) -> bool {
        is_valid_rgb(raw_color)
    }

    /// Preview swatch for `raw_color`, or `None` to keep the current preview.
    pub fn compute_preview_color(raw_color: &str) -> Option<MenuColor> {
        compute_preview_color(raw_color)
    }

    /// Validates `raw_color` and writes both settings to every location.
    ///
    /// # Errors
    ///
    /// - [`SettingsError::Validation`] before any write.
    /// - [`SettingsError::Permission`] when a write is denied.
    /// - [`SettingsError::Storage`] for any other storage fault.
    ///
    /// Notification failures are logged and otherwise ignored.
    pub fn apply(&self, delay: MenuShowDelay, raw_color: &str) -> Result<SyncReport, SettingsError> {
        let color_text = raw_color.trim();
        if let Err(err) = MenuColor::parse(color_text) {
            debug!(color = raw_color, error = %err, "rejected color text");
            return Err(SettingsError::Validation(err));
        }

        self.persist(delay, color_text)?;
        self.notify_shell();

        info!(%delay, color = color_text, "settings applied");
        Ok(SyncReport {
            delay,
            color_text: color_text.to_string(),
            message: APPLIED_MESSAGE,
        })
    }

    /// Writes the factory defaults (400 ms, `"255 255 255"`) to every location.
    ///
    /// # Errors
    ///
    /// Same as [`apply`](Self::apply), minus validation.
    pub fn reset(&self) -> Result<SyncReport, SettingsError> {
        let delay = MenuShowDelay::DEFAULT;
        let color_text = MenuColor::WHITE.to_string();

        self.persist(delay, &color_text)?;
        self.notify_shell();

        info!(%delay, color = %color_text, "settings reset to defaults");
        Ok(SyncReport {
            delay,
            color_text,
            message: RESET_MESSAGE,
        })
    }

    /// Writes desktop, colors, then backup.  Stops at the first failure.
    fn persist(&self, delay: MenuShowDelay, color_text: &str) -> Result<(), SettingsError> {
        for write in self.layout.planned_writes(delay, color_text) {
            let mut key = self.preferences.create_key(write.key_path).map_err(|err| {
                warn!(location = %write.location, error = %err, "could not open key for writing");
                SettingsError::from(err)
            })?;
            for (name, value) in &write.values {
                key.write_string(name, value).map_err(|err| {
                    warn!(location = %write.location, %name, error = %err, "write failed");
                    SettingsError::from(err)
                })?;
                debug!(location = %write.location, path = write.key_path, %name, %value, "wrote value");
            }
        }
        Ok(())
    }

    /// Best-effort: failures are logged, never returned.
    fn notify_shell(&self) {
        let change = SettingChange::ENVIRONMENT;
        if let Err(err) = self.notifier.send(change.topic, change.timeout_ms()) {
            warn!(error = %err, "shell did not acknowledge the settings change");
        }
        if let Err(err) = self.notifier.refresh_metrics(UpdateFlags::PERSIST_AND_BROADCAST) {
            warn!(error = %err, "system parameters refresh failed");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::settings_form::FormState;
    use crate::infrastructure::preference_store::mock::MemoryPreferenceStore;

    const BACKUP: &str = r"Software\SpectacularThing";

    /// Notifier that expects exactly one broadcast and one refresh.
    fn expect_one_notification() -> MockNotificationSink {
        let mut notifier = MockNotificationSink::new();
        notifier
            .expect_send()
            .withf(|topic: &str, timeout_ms: &u32| topic == "Environment" && *timeout_ms == 5000)
            .times(1)
            .returning(|_, _| Ok(()));
        notifier
            .expect_refresh_metrics()
            .withf(|flags: &UpdateFlags| *flags == UpdateFlags::PERSIST_AND_BROADCAST)
            .times(1)
            .returning(|_| Ok(()));
        notifier
    }

    // ── apply ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_apply_writes_all_three_locations_and_notifies() {
        // Arrange
        let prefs = MemoryPreferenceStore::new();
        let store = SettingsStore::new(prefs.clone(), expect_one_notification());

        // Act
        let report = store.apply(MenuShowDelay::clamped(500), " 10 20 30 ").expect("apply");

        // Assert
        assert_eq!(report.message, APPLIED_MESSAGE);
        assert_eq!(report.color_text, "10 20 30");
        assert_eq!(prefs.value(r"Control Panel\Desktop", "MenuShowDelay").as_deref(), Some("500"));
        assert_eq!(prefs.value(r"Control Panel\Colors", "Menu").as_deref(), Some("10 20 30"));
        assert_eq!(prefs.value(BACKUP, "MenuShowDelay").as_deref(), Some("500"));
        assert_eq!(prefs.value(BACKUP, "Menu").as_deref(), Some("10 20 30"));
        assert_eq!(prefs.open_handles(), 0);
    }

    #[test]
    fn test_apply_rejects_invalid_color_without_writing_or_notifying() {
        // Arrange: a mock with no expectations panics if it is called at all.
        let prefs = MemoryPreferenceStore::new();
        let store = SettingsStore::new(prefs.clone(), MockNotificationSink::new());

        // Act
        let result = store.apply(MenuShowDelay::clamped(500), "999 0 0");

        // Assert
        assert_eq!(result, Err(SettingsError::Validation(MenuColorError::OutOfRange(999))));
        assert!(prefs.writes().is_empty());
    }

    #[test]
    fn test_apply_validation_error_message_is_user_facing() {
        let store = SettingsStore::new(MemoryPreferenceStore::new(), MockNotificationSink::new());
        let err = store.apply(MenuShowDelay::DEFAULT, "1 2").unwrap_err();
        assert_eq!(err.to_string(), "Invalid RGB format! Use: 255 255 255");
    }

    #[test]
    fn test_apply_on_denied_store_returns_permission_error() {
        // Arrange
        let prefs = MemoryPreferenceStore::new();
        prefs.deny_writes();
        let store = SettingsStore::new(prefs.clone(), MockNotificationSink::new());

        // Act
        let result = store.apply(MenuShowDelay::clamped(200), "10 20 30");

        // Assert
        assert!(matches!(result, Err(SettingsError::Permission { .. })));
        assert_eq!(
            result.unwrap_err().to_string(),
            "Access denied. Try running as administrator."
        );
        assert_eq!(prefs.open_handles(), 0, "handles must be released on the error path");
    }

    #[test]
    fn test_apply_stops_after_first_failed_write() {
        // Arrange: the second write (colors) fails with a generic fault.
        let prefs = MemoryPreferenceStore::new();
        prefs.fail_write_number(2, StoreError::Backend("disk on fire".to_string()));
        let store = SettingsStore::new(prefs.clone(), MockNotificationSink::new());

        // Act
        let result = store.apply(MenuShowDelay::clamped(700), "1 2 3");

        // Assert: desktop landed, nothing after the fault did.
        assert_eq!(result, Err(SettingsError::Storage("disk on fire".to_string())));
        assert_eq!(prefs.value(r"Control Panel\Desktop", "MenuShowDelay").as_deref(), Some("700"));
        assert_eq!(prefs.value(r"Control Panel\Colors", "Menu"), None);
        assert_eq!(prefs.value(BACKUP, "MenuShowDelay"), None);
    }

    #[test]
    fn test_apply_succeeds_when_notifications_fail() {
        // Arrange
        let mut notifier = MockNotificationSink::new();
        notifier
            .expect_send()
            .times(1)
            .returning(|_, _| Err(NotifyError::Broadcast("timed out".to_string())));
        notifier
            .expect_refresh_metrics()
            .times(1)
            .returning(|_| Err(NotifyError::Refresh("denied".to_string())));
        let prefs = MemoryPreferenceStore::new();
        let store = SettingsStore::new(prefs.clone(), notifier);

        // Act
        let result = store.apply(MenuShowDelay::clamped(100), "0 0 0");

        // Assert
        assert!(result.is_ok());
        assert_eq!(prefs.value(BACKUP, "Menu").as_deref(), Some("0 0 0"));
    }

    // ── reset ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_reset_overwrites_corrupted_state_with_defaults() {
        // Arrange
        let prefs = MemoryPreferenceStore::new();
        prefs.seed(BACKUP, "MenuShowDelay", "garbage");
        prefs.seed(BACKUP, "Menu", "not a color");
        prefs.seed(r"Control Panel\Colors", "Menu", "1 2");
        let store = SettingsStore::new(prefs.clone(), expect_one_notification());

        // Act
        let report = store.reset().expect("reset");

        // Assert
        assert_eq!(report.message, RESET_MESSAGE);
        for (path, name, expected) in [
            (r"Control Panel\Desktop", "MenuShowDelay", "400"),
            (r"Control Panel\Colors", "Menu", "255 255 255"),
            (BACKUP, "MenuShowDelay", "400"),
            (BACKUP, "Menu", "255 255 255"),
        ] {
            assert_eq!(prefs.value(path, name).as_deref(), Some(expected), "{path}\\{name}");
        }
    }

    #[test]
    fn test_reset_on_denied_store_returns_permission_error() {
        let prefs = MemoryPreferenceStore::new();
        prefs.deny_writes();
        let store = SettingsStore::new(prefs, MockNotificationSink::new());
        assert!(matches!(store.reset(), Err(SettingsError::Permission { .. })));
    }

    // ── load ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_load_without_backup_keeps_form_untouched() {
        // Arrange
        let store = SettingsStore::new(MemoryPreferenceStore::new(), MockNotificationSink::new());
        let mut form = SettingsForm::default();
        form.set_delay(123);

        // Act
        let outcome = store.load(&mut form).expect("load");

        // Assert
        assert_eq!(outcome, LoadOutcome::NoBackup);
        assert_eq!(form.delay().as_millis(), 123);
        assert_eq!(form.state(), FormState::Clean);
    }

    #[test]
    fn test_load_adopts_values_and_clamps_delay() {
        // Arrange
        let prefs = MemoryPreferenceStore::new();
        prefs.seed(BACKUP, "MenuShowDelay", "4000");
        prefs.seed(BACKUP, "Menu", "0 128 255");
        let store = SettingsStore::new(prefs.clone(), MockNotificationSink::new());
        let mut form = SettingsForm::default();

        // Act
        let outcome = store.load(&mut form).expect("load");

        // Assert
        assert_eq!(outcome, LoadOutcome::Loaded { delay: true, color: true });
        assert_eq!(form.delay().as_millis(), 1000);
        assert_eq!(form.color_text(), "0 128 255");
        assert_eq!(form.preview(), Some(MenuColor::new(0, 128, 255)));
        assert_eq!(form.state(), FormState::Clean);
        assert_eq!(prefs.open_handles(), 0);
    }

    #[test]
    fn test_load_keeps_existing_delay_when_stored_delay_is_malformed() {
        // Arrange
        let prefs = MemoryPreferenceStore::new();
        prefs.seed(BACKUP, "MenuShowDelay", "soon");
        prefs.seed(BACKUP, "Menu", "1 2 3");
        let store = SettingsStore::new(prefs, MockNotificationSink::new());
        let mut form = SettingsForm::default();
        form.set_delay(650);

        // Act
        let outcome = store.load(&mut form).expect("load");

        // Assert
        assert_eq!(outcome, LoadOutcome::Loaded { delay: false, color: true });
        assert_eq!(form.delay().as_millis(), 650);
        assert_eq!(form.color_text(), "1 2 3");
    }

    #[test]
    fn test_load_adopts_invalid_color_text_verbatim() {
        // Arrange
        let prefs = MemoryPreferenceStore::new();
        prefs.seed(BACKUP, "Menu", "999 999 999");
        let store = SettingsStore::new(prefs, MockNotificationSink::new());
        let mut form = SettingsForm::default();
        let preview_before = form.preview();

        // Act
        store.load(&mut form).expect("load");

        // Assert: text adopted, preview left as it was.
        assert_eq!(form.color_text(), "999 999 999");
        assert_eq!(form.preview(), preview_before);
    }

    #[test]
    fn test_load_fault_keeps_values_adopted_before_it() {
        // Arrange: reading the color value fails after the delay was read.
        let prefs = MemoryPreferenceStore::new();
        prefs.seed(BACKUP, "MenuShowDelay", "50");
        prefs.seed(BACKUP, "Menu", "1 2 3");
        prefs.fail_read_of("Menu", StoreError::Backend("corrupt hive".to_string()));
        let store = SettingsStore::new(prefs.clone(), MockNotificationSink::new());
        let mut form = SettingsForm::default();

        // Act
        let result = store.load(&mut form);

        // Assert
        assert_eq!(result, Err(StoreError::Backend("corrupt hive".to_string())));
        assert_eq!(form.delay().as_millis(), 50);
        assert_eq!(form.color_text(), "255 255 255");
        assert_eq!(prefs.open_handles(), 0);
    }

    // ── validate / preview ────────────────────────────────────────────────────

    #[test]
    fn test_validate_delegates_to_rgb_rules() {
        type Store = SettingsStore<MemoryPreferenceStore, MockNotificationSink>;
        assert!(Store::validate("255 0 0"));
        assert!(!Store::validate("256 0 0"));
        assert_eq!(
            Store::compute_preview_color("0 128 255").map(MenuColor::to_tuple),
            Some((0, 128, 255))
        );
        assert_eq!(Store::compute_preview_color("bad"), None);
    }

    #[test]
    fn test_store_error_maps_to_settings_error_taxonomy() {
        assert_eq!(
            SettingsError::from(StoreError::AccessDenied { path: "x".to_string() }),
            SettingsError::Permission { path: "x".to_string() }
        );
        assert_eq!(
            SettingsError::from(StoreError::Backend("boom".to_string())).to_string(),
            "Error: boom"
        );
    }
}
