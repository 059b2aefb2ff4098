//! Toast notifications.
//!
//! At most one toast is visible. A new toast replaces the current one and
//! restarts the expiry timer; an older timer firing late is ignored.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use medicare_core::events::{ClientEvent, EventBus};

/// A visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub created_at: Instant,
}

#[derive(Debug, Default)]
struct ToastSlot {
    current: Option<Toast>,
    generation: u64,
}

/// Latest-wins, self-expiring notification channel.
///
/// `notify` is synchronous and never blocks. When called inside a tokio
/// runtime, a timer task clears the toast and emits
/// [`ClientEvent::ToastExpired`]; outside a runtime, expiry is only
/// observed lazily through [`NotificationChannel::current`].
#[derive(Clone, Debug)]
pub struct NotificationChannel {
    slot: Arc<Mutex<ToastSlot>>,
    duration: Duration,
    events: EventBus,
}

impl NotificationChannel {
    pub fn new(duration: Duration, events: EventBus) -> Self {
        Self {
            slot: Arc::new(Mutex::new(ToastSlot::default())),
            duration,
            events,
        }
    }

    /// Show `message`, replacing whatever toast is visible.
    pub fn notify(&self, message: impl Into<String>) {
        let message = message.into();
        let generation = {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            slot.generation += 1;
            slot.current = Some(Toast {
                message: message.clone(),
                created_at: Instant::now(),
            });
            slot.generation
        };

        tracing::info!(message = %message, "Toast shown");
        self.events.emit(ClientEvent::ToastShown { message });
        self.schedule_expiry(generation);
    }

    /// The visible toast, if any and not yet expired.
    pub fn current(&self) -> Option<Toast> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.current
            .as_ref()
            .filter(|toast| toast.created_at.elapsed() < self.duration)
            .cloned()
    }

    fn schedule_expiry(&self, generation: u64) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("No runtime; toast expiry is evaluated lazily");
            return;
        };
        let channel = self.clone();
        handle.spawn(async move {
            tokio::time::sleep(channel.duration).await;
            channel.expire(generation);
        });
    }

    fn expire(&self, generation: u64) {
        let expired = {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.generation == generation && slot.current.is_some() {
                slot.current = None;
                true
            } else {
                false
            }
        };
        if expired {
            tracing::debug!("Toast expired");
            self.events.emit(ClientEvent::ToastExpired);
        }
    }
}
