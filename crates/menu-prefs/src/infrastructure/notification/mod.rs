//! Shell notification infrastructure.
//!
//! After the settings are persisted, running programs are told about it in
//! two steps: a `WM_SETTINGCHANGE` broadcast carrying the `"Environment"`
//! topic, then a system-parameters refresh that asks the OS to persist and
//! re-broadcast.  Neither step is required for the write to count.
//!
//! | Module    | Platform | Behavior                                          |
//! |-----------|----------|---------------------------------------------------|
//! | `windows` | Windows  | `SendMessageTimeoutW` + `SystemParametersInfoW`    |
//! | `log`     | any      | Logs the notification and returns `Ok`            |
//! | `mock`    | any      | Records every call; can be told to fail           |

pub mod log;
pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

#[cfg(target_os = "windows")]
pub use self::windows::WindowsShellNotifier as NativeNotificationSink;
