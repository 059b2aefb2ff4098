//! User-facing transient feedback for the Medicare client.
//!
//! Provides the toast [`NotificationChannel`] used by every failure path,
//! and the [`CopyTracker`] that writes to the clipboard and tracks the
//! short-lived "copied" acknowledgement per copy target.

pub mod clipboard;
pub mod notification;

pub use clipboard::{Clipboard, CopyState, CopyTracker, MemoryClipboard, SystemClipboard};
pub use notification::{NotificationChannel, Toast};
