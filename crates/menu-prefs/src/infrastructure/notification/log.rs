//! Notification sink for hosts with no shell to notify.

use menu_prefs_core::UpdateFlags;
use tracing::info;

use crate::application::sync_settings::{NotificationSink, NotifyError};

/// Logs each notification at `info` level and always succeeds.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotificationSink;

impl LogNotificationSink {
    pub fn new() -> Self {
        Self
    }
}

impl NotificationSink for LogNotificationSink {
    fn send(&self, topic: &str, timeout_ms: u32) -> Result<(), NotifyError> {
        info!(topic, timeout_ms, "settings change (no shell to notify)");
        Ok(())
    }

    fn refresh_metrics(&self, flags: UpdateFlags) -> Result<(), NotifyError> {
        info!(flags = flags.0, "system parameters refresh (no shell to notify)");
        Ok(())
    }
}
