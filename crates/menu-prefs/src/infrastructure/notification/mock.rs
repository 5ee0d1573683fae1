//! Recording notification sink for unit and integration testing.
//!
//! Unlike the `mockall` mock generated for [`NotificationSink`], this sink
//! needs no expectations up front: it records every call and can be inspected
//! afterwards, which suits tests that drive the whole panel.

use std::sync::{Arc, Mutex, MutexGuard};

use menu_prefs_core::UpdateFlags;

use crate::application::sync_settings::{NotificationSink, NotifyError};

/// One call received by [`RecordingNotificationSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Broadcast { topic: String, timeout_ms: u32 },
    Refresh(UpdateFlags),
}

#[derive(Debug, Default)]
struct Inner {
    calls: Vec<Notification>,
    fail_broadcast: Option<NotifyError>,
    fail_refresh: Option<NotifyError>,
}

/// A [`NotificationSink`] that records calls.  Clones share the record.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotificationSink {
    inner: Arc<Mutex<Inner>>,
}

impl RecordingNotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("lock poisoned")
    }

    /// Every call received, oldest first.  Failed calls are recorded too.
    pub fn calls(&self) -> Vec<Notification> {
        self.lock().calls.clone()
    }

    /// Makes every subsequent broadcast fail with `err`.
    pub fn fail_broadcast(&self, err: NotifyError) {
        self.lock().fail_broadcast = Some(err);
    }

    /// Makes every subsequent refresh fail with `err`.
    pub fn fail_refresh(&self, err: NotifyError) {
        self.lock().fail_refresh = Some(err);
    }
}

impl NotificationSink for RecordingNotificationSink {
    fn send(&self, topic: &str, timeout_ms: u32) -> Result<(), NotifyError> {
        let mut inner = self.lock();
        inner.calls.push(Notification::Broadcast {
            topic: topic.to_string(),
            timeout_ms,
        });
        inner.fail_broadcast.clone().map_or(Ok(()), Err)
    }

    fn refresh_metrics(&self, flags: UpdateFlags) -> Result<(), NotifyError> {
        let mut inner = self.lock();
        inner.calls.push(Notification::Refresh(flags));
        inner.fail_refresh.clone().map_or(Ok(()), Err)
    }
}
