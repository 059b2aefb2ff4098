//! Clipboard copy with a per-target acknowledgement.
//!
//! Copying is fire-and-forget: the write is attempted once and the target
//! shows "copied" for a fixed interval whether or not the clipboard write
//! succeeded. Each target id has its own independent timer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use medicare_core::error::{MedicareError, Result};
use medicare_core::events::{ClientEvent, EventBus};
use medicare_core::i18n::Strings;

/// Destination for copied text.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<()>;
}

/// In-memory clipboard for tests and headless runs.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last text written, if any.
    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = Some(text.to_string());
        Ok(())
    }
}

/// System clipboard backed by `arboard`.
///
/// The handle is opened on first write and kept, since X11 only serves
/// the selection while its owner is alive.
#[derive(Default)]
pub struct SystemClipboard {
    handle: Mutex<Option<arboard::Clipboard>>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        let mut handle = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        let mut clipboard = match handle.take() {
            Some(clipboard) => clipboard,
            None => arboard::Clipboard::new().map_err(clipboard_error)?,
        };
        // A handle that failed to write is dropped and reopened next time.
        clipboard.set_text(text).map_err(clipboard_error)?;
        *handle = Some(clipboard);
        tracing::debug!(text_len = text.len(), "Copied to system clipboard");
        Ok(())
    }
}

fn clipboard_error(e: arboard::Error) -> MedicareError {
    MedicareError::Clipboard(e.to_string())
}

/// Display state of one copy target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyState {
    Copy,
    Copied,
}

impl CopyState {
    pub fn label(&self, strings: &Strings) -> &'static str {
        match self {
            CopyState::Copy => strings.copy,
            CopyState::Copied => strings.copied,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Ack {
    generation: u64,
    at: Instant,
}

#[derive(Debug, Default)]
struct AckTable {
    acks: HashMap<String, Ack>,
    generation: u64,
}

/// Writes text to a [`Clipboard`] and tracks the per-target "copied" state.
#[derive(Clone)]
pub struct CopyTracker {
    clipboard: Arc<dyn Clipboard>,
    table: Arc<Mutex<AckTable>>,
    duration: Duration,
    events: EventBus,
}

impl CopyTracker {
    pub fn new(clipboard: Arc<dyn Clipboard>, duration: Duration, events: EventBus) -> Self {
        Self {
            clipboard,
            table: Arc::new(Mutex::new(AckTable::default())),
            duration,
            events,
        }
    }

    /// Copy `text` and mark `item_id` as copied.
    pub fn copy(&self, item_id: &str, text: &str) {
        if let Err(e) = self.clipboard.write_text(text) {
            tracing::warn!(item_id, error = %e, "Clipboard write failed");
        }

        let generation = {
            let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
            table.generation += 1;
            let generation = table.generation;
            table.acks.insert(
                item_id.to_string(),
                Ack {
                    generation,
                    at: Instant::now(),
                },
            );
            generation
        };

        tracing::info!(item_id, text_len = text.len(), "Copied to clipboard");
        self.events.emit(ClientEvent::CopyAcknowledged {
            item_id: item_id.to_string(),
        });
        self.schedule_revert(item_id.to_string(), generation);
    }

    /// Current display state of `item_id`.
    pub fn state(&self, item_id: &str) -> CopyState {
        let table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        match table.acks.get(item_id) {
            Some(ack) if ack.at.elapsed() < self.duration => CopyState::Copied,
            _ => CopyState::Copy,
        }
    }

    fn schedule_revert(&self, item_id: String, generation: u64) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let tracker = self.clone();
        handle.spawn(async move {
            tokio::time::sleep(tracker.duration).await;
            tracker.revert(&item_id, generation);
        });
    }

    fn revert(&self, item_id: &str, generation: u64) {
        let reverted = {
            let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
            match table.acks.get(item_id) {
                Some(ack) if ack.generation == generation => {
                    table.acks.remove(item_id);
                    true
                }
                _ => false,
            }
        };
        if reverted {
            self.events.emit(ClientEvent::CopyReverted {
                item_id: item_id.to_string(),
            });
        }
    }
}
