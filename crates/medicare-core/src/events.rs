use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::types::{Language, OperationKind, Role, Tab};

/// Why a capture stream was released.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseReason {
    /// A still frame was taken.
    Snapshot,
    /// The user stopped the camera.
    Stopped,
    /// The owner went away (navigation, shutdown, late grant).
    Teardown,
}

/// User-visible state changes emitted by the client.
///
/// Consumed by the terminal renderer and by tests. Every variant is emitted
/// after the state change it describes has been applied.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ClientEvent {
    // =========================================================================
    // Notifications
    // =========================================================================
    ToastShown { message: String },
    ToastExpired,
    CopyAcknowledged { item_id: String },
    CopyReverted { item_id: String },

    // =========================================================================
    // Remote operations
    // =========================================================================
    PendingChanged { kind: OperationKind, pending: bool },
    MessageAppended { message_id: Uuid, role: Role },
    AnalysisCompleted,
    AnalysisCleared,
    ResearchUpdated { count: usize },

    // =========================================================================
    // Capture device
    // =========================================================================
    CaptureStarted { stream_id: Uuid, width: u32, height: u32 },
    CaptureReleased { stream_id: Uuid, reason: ReleaseReason },
    SnapshotTaken { bytes: usize },

    // =========================================================================
    // View
    // =========================================================================
    LanguageChanged { language: Language },
    TabChanged { tab: Tab },
}

impl ClientEvent {
    /// Short machine name of the event, matching its serialized `type` tag.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::ToastShown { .. } => "toast_shown",
            ClientEvent::ToastExpired => "toast_expired",
            ClientEvent::CopyAcknowledged { .. } => "copy_acknowledged",
            ClientEvent::CopyReverted { .. } => "copy_reverted",
            ClientEvent::PendingChanged { .. } => "pending_changed",
            ClientEvent::MessageAppended { .. } => "message_appended",
            ClientEvent::AnalysisCompleted => "analysis_completed",
            ClientEvent::AnalysisCleared => "analysis_cleared",
            ClientEvent::ResearchUpdated { .. } => "research_updated",
            ClientEvent::CaptureStarted { .. } => "capture_started",
            ClientEvent::CaptureReleased { .. } => "capture_released",
            ClientEvent::SnapshotTaken { .. } => "snapshot_taken",
            ClientEvent::LanguageChanged { .. } => "language_changed",
            ClientEvent::TabChanged { .. } => "tab_changed",
        }
    }
}

/// Broadcast fan-out for [`ClientEvent`]s.
///
/// Emitting never blocks and never fails: with no subscribers the event is
/// dropped.
#[derive(Clone, Debug)]
pub struct EventBus {
    tx: broadcast::Sender<ClientEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn emit(&self, event: ClientEvent) {
        tracing::trace!(event = event.name(), "Client event");
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ClientEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
