//! Windows shell notifier.
//!
//! # Safety
//!
//! This module uses `unsafe` code exclusively for Win32 messaging FFI calls.
//! All `unsafe` blocks are annotated with `// SAFETY:` comments.

#![cfg(target_os = "windows")]

use menu_prefs_core::UpdateFlags;
use tracing::debug;
use windows::Win32::Foundation::{GetLastError, LPARAM, WPARAM};
use windows::Win32::UI::WindowsAndMessaging::{
    SendMessageTimeoutW, SystemParametersInfoW, HWND_BROADCAST, SMTO_ABORTIFHUNG,
    SYSTEM_PARAMETERS_INFO_ACTION, SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS, WM_SETTINGCHANGE,
};

use crate::application::sync_settings::{NotificationSink, NotifyError};

/// Broadcasts `WM_SETTINGCHANGE` to every top-level window and refreshes the
/// system parameters.
#[derive(Debug, Default, Clone, Copy)]
pub struct WindowsShellNotifier;

impl WindowsShellNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl NotificationSink for WindowsShellNotifier {
    fn send(&self, topic: &str, timeout_ms: u32) -> Result<(), NotifyError> {
        let wide: Vec<u16> = topic.encode_utf16().chain(std::iter::once(0)).collect();
        let mut result: usize = 0;

        // SAFETY: `wide` is NUL-terminated and outlives the call, which does
        // not return until every window has answered or timed out.
        let status = unsafe {
            SendMessageTimeoutW(
                HWND_BROADCAST,
                WM_SETTINGCHANGE,
                WPARAM(0),
                LPARAM(wide.as_ptr() as isize),
                SMTO_ABORTIFHUNG,
                timeout_ms,
                Some(&mut result as *mut usize),
            )
        };

        if status.0 == 0 {
            // SAFETY: reads the calling thread's last-error value.
            let code = unsafe { GetLastError() };
            return Err(NotifyError::Broadcast(
                windows::core::Error::from(code.to_hresult()).message(),
            ));
        }
        debug!(topic, result, "WM_SETTINGCHANGE broadcast");
        Ok(())
    }

    fn refresh_metrics(&self, flags: UpdateFlags) -> Result<(), NotifyError> {
        // SAFETY: action 0 takes no parameter buffer.
        unsafe {
            SystemParametersInfoW(
                SYSTEM_PARAMETERS_INFO_ACTION(0),
                0,
                None,
                SYSTEM_PARAMETERS_INFO_UPDATE_FLAGS(flags.0),
            )
        }
        .map_err(|e| NotifyError::Refresh(e.message()))?;
        debug!(flags = flags.0, "system parameters refreshed");
        Ok(())
    }
}
