//! Per-operation "in flight" flags.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use medicare_core::events::{ClientEvent, EventBus};
use medicare_core::types::OperationKind;

/// At most one operation of a kind is in flight at a time.
#[derive(Debug, Clone)]
pub struct PendingFlag {
    kind: OperationKind,
    busy: Arc<AtomicBool>,
    events: EventBus,
}

impl PendingFlag {
    pub fn new(kind: OperationKind, events: EventBus) -> Self {
        Self {
            kind,
            busy: Arc::new(AtomicBool::new(false)),
            events,
        }
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn is_pending(&self) -> bool {
        self.busy.load(Ordering::SeqCst)
    }

    /// Set the flag. Returns `None` if it is already set.
    pub fn try_acquire(&self) -> Option<PendingGuard> {
        self.busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        tracing::debug!(kind = %self.kind, "Operation pending");
        self.events.emit(ClientEvent::PendingChanged {
            kind: self.kind,
            pending: true,
        });
        Some(PendingGuard {
            kind: self.kind,
            busy: self.busy.clone(),
            events: self.events.clone(),
        })
    }
}

/// Clears its [`PendingFlag`] when dropped, on every exit path.
#[derive(Debug)]
pub struct PendingGuard {
    kind: OperationKind,
    busy: Arc<AtomicBool>,
    events: EventBus,
}

impl PendingGuard {
    pub fn kind(&self) -> OperationKind {
        self.kind
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::SeqCst);
        tracing::debug!(kind = %self.kind, "Operation settled");
        self.events.emit(ClientEvent::PendingChanged {
            kind: self.kind,
            pending: false,
        });
    }
}
