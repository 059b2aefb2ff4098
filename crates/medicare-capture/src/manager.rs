//! Camera lifecycle for the analysis view.
//!
//! ```text
//!   Inactive --acquire(granted)--> Active --snapshot / stop--> Inactive
//!      ^                                                         |
//!      +-------------------- acquire(denied) --------------------+
//! ```
//!
//! Acquisition is split in two so an owner can run the (possibly slow)
//! permission prompt off its own task: [`CaptureManager::request_stream`]
//! hands out an [`AcquireRequest`], and [`CaptureManager::install`] applies
//! its outcome later.

use std::sync::Arc;

use medicare_core::config::CaptureConfig;
use medicare_core::context::ViewContext;
use medicare_core::error::Result;
use medicare_core::events::{ClientEvent, EventBus, ReleaseReason};
use medicare_core::types::{SourceBlob, Tab};
use medicare_notify::NotificationChannel;

use crate::encode::encode_jpeg;
use crate::guard::StreamGuard;
use crate::{CaptureDevice, PreviewHandle, StreamRequest, SNAPSHOT_FILE_NAME, SNAPSHOT_MIME_TYPE};

/// Whether a stream is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureState {
    Inactive,
    Active,
}

/// A pending stream request, detached from the manager.
#[derive(Debug)]
pub struct AcquireRequest<D> {
    device: Arc<D>,
    request: StreamRequest,
    events: EventBus,
}

impl<D: CaptureDevice> AcquireRequest<D> {
    /// Ask the device for a stream. Pass the outcome to
    /// [`CaptureManager::install`].
    ///
    /// A granted stream is guarded before it leaves this call, so dropping
    /// the outcome undelivered still releases the device.
    pub async fn run(self) -> Result<StreamGuard> {
        let stream = self.device.open(&self.request).await?;
        Ok(StreamGuard::new(stream, self.events))
    }
}

/// Owns at most one camera stream.
///
/// `Active` holds exactly when a [`StreamGuard`] is held, so the two can
/// never disagree.
pub struct CaptureManager<D> {
    device: Arc<D>,
    request: StreamRequest,
    jpeg_quality: u8,
    stream: Option<StreamGuard>,
    requesting: bool,
    context: ViewContext,
    notifier: NotificationChannel,
    events: EventBus,
}

impl<D: CaptureDevice> CaptureManager<D> {
    pub fn new(
        device: D,
        config: &CaptureConfig,
        context: ViewContext,
        notifier: NotificationChannel,
        events: EventBus,
    ) -> Self {
        Self {
            device: Arc::new(device),
            request: StreamRequest::from(config),
            jpeg_quality: config.jpeg_quality,
            stream: None,
            requesting: false,
            context,
            notifier,
            events,
        }
    }

    pub fn state(&self) -> CaptureState {
        if self.stream.is_some() {
            CaptureState::Active
        } else {
            CaptureState::Inactive
        }
    }

    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }

    /// `true` between `request_stream` and `install`.
    pub fn is_requesting(&self) -> bool {
        self.requesting
    }

    pub fn preview(&self) -> Option<PreviewHandle> {
        self.stream.as_ref().and_then(StreamGuard::preview)
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    /// Start acquiring. Returns `None` when a stream is already held or a
    /// request is already out.
    pub fn request_stream(&mut self) -> Option<AcquireRequest<D>> {
        if self.stream.is_some() || self.requesting {
            tracing::debug!("Camera already active or requested");
            return None;
        }
        self.requesting = true;
        tracing::info!(
            facing = ?self.request.facing,
            width = self.request.width,
            height = self.request.height,
            "Requesting camera"
        );
        Some(AcquireRequest {
            device: self.device.clone(),
            request: self.request,
            events: self.events.clone(),
        })
    }

    /// Apply the outcome of an [`AcquireRequest`].
    ///
    /// A granted stream that arrives after the user left the analysis view
    /// is released at once.
    pub fn install(&mut self, result: Result<StreamGuard>) -> Option<PreviewHandle> {
        self.requesting = false;
        match result {
            Ok(guard) => {
                if self.context.active_tab() != Tab::Analysis || self.stream.is_some() {
                    tracing::info!("Camera granted after its view closed; releasing");
                    drop(guard);
                    return None;
                }
                let preview = guard.preview();
                if let Some(p) = preview {
                    tracing::info!(stream_id = %p.stream_id, width = p.width, height = p.height, "Camera started");
                    self.events.emit(ClientEvent::CaptureStarted {
                        stream_id: p.stream_id,
                        width: p.width,
                        height: p.height,
                    });
                }
                self.stream = Some(guard);
                preview
            }
            Err(e) => {
                tracing::warn!(error = %e, "Camera access failed");
                self.notifier.notify(self.context.strings().camera_denied);
                None
            }
        }
    }

    /// Request and install in one step.
    pub async fn acquire(&mut self) -> Option<PreviewHandle> {
        let request = self.request_stream()?;
        let result = request.run().await;
        self.install(result)
    }

    /// Grab the current frame as a JPEG and release the camera.
    ///
    /// Returns `None` when inactive, or when the frame could not be read or
    /// encoded. The camera is released either way.
    pub fn snapshot(&mut self) -> Option<SourceBlob> {
        let mut guard = self.stream.take()?;
        let encoded = guard
            .read_frame()
            .and_then(|frame| encode_jpeg(&frame, self.jpeg_quality));
        guard.release(ReleaseReason::Snapshot);

        match encoded {
            Ok(bytes) => {
                tracing::info!(bytes = bytes.len(), "Snapshot captured");
                self.events
                    .emit(ClientEvent::SnapshotTaken { bytes: bytes.len() });
                Some(SourceBlob::new(SNAPSHOT_FILE_NAME, SNAPSHOT_MIME_TYPE, bytes))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Snapshot failed");
                self.notifier.notify(self.context.strings().capture_failed);
                None
            }
        }
    }

    /// Release the camera. Does nothing when inactive.
    pub fn stop(&mut self) {
        if let Some(guard) = self.stream.take() {
            guard.release(ReleaseReason::Stopped);
        }
    }

    /// Release the camera because its owner is going away.
    pub fn teardown(&mut self) {
        if let Some(guard) = self.stream.take() {
            guard.release(ReleaseReason::Teardown);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::device::MockCaptureDevice;
    use medicare_core::types::Language;

    struct Fixture {
        manager: CaptureManager<MockCaptureDevice>,
        device: MockCaptureDevice,
        context: ViewContext,
        notifier: NotificationChannel,
        events: EventBus,
    }

    fn fixture(device: MockCaptureDevice) -> Fixture {
        let events = EventBus::new(32);
        let context = ViewContext::new(Language::En);
        context.set_tab(Tab::Analysis);
        let notifier = NotificationChannel::new(Duration::from_secs(3), events.clone());
        let config = CaptureConfig {
            width: 32,
            height: 24,
            ..CaptureConfig::default()
        };
        let manager = CaptureManager::new(
            device.clone(),
            &config,
            context.clone(),
            notifier.clone(),
            events.clone(),
        );
        Fixture {
            manager,
            device,
            context,
            notifier,
            events,
        }
    }

    #[tokio::test]
    async fn test_acquire_then_snapshot() {
        let mut f = fixture(MockCaptureDevice::new());
        let preview = f.manager.acquire().await.unwrap();
        assert_eq!((preview.width, preview.height), (32, 24));
        assert_eq!(f.manager.state(), CaptureState::Active);

        let blob = f.manager.snapshot().unwrap();
        assert_eq!(f.manager.state(), CaptureState::Inactive);
        assert!(!blob.is_empty());
        assert_eq!(blob.name, "captured-image.jpg");
        assert_eq!(blob.mime_type, "image/jpeg");
        assert_eq!(f.device.live_streams(), 0);
    }

    #[tokio::test]
    async fn test_stop_is_idempotent() {
        let mut f = fixture(MockCaptureDevice::new());
        f.manager.acquire().await.unwrap();
        f.manager.stop();
        f.manager.stop();
        assert_eq!(f.manager.state(), CaptureState::Inactive);
        assert_eq!(f.device.opened(), 1);
        assert_eq!(f.device.released(), 1);
    }

    #[tokio::test]
    async fn test_denied_stays_inactive_and_notifies() {
        let mut f = fixture(MockCaptureDevice::denied());
        assert!(f.manager.acquire().await.is_none());
        assert_eq!(f.manager.state(), CaptureState::Inactive);
        assert!(!f.manager.is_requesting());
        assert_eq!(
            f.notifier.current().unwrap().message,
            "Camera access denied. Please enable camera permissions."
        );
    }

    #[tokio::test]
    async fn test_denial_notice_uses_current_language() {
        let mut f = fixture(MockCaptureDevice::denied());
        f.context.set_language(Language::Fr);
        f.manager.acquire().await;
        assert_eq!(
            f.notifier.current().unwrap().message,
            "Accès à la caméra refusé. Veuillez autoriser la caméra."
        );
    }

    #[tokio::test]
    async fn test_encode_failure_still_releases() {
        let mut f = fixture(MockCaptureDevice::with_broken_frames());
        f.manager.acquire().await.unwrap();
        assert!(f.manager.snapshot().is_none());
        assert_eq!(f.manager.state(), CaptureState::Inactive);
        assert_eq!(f.device.live_streams(), 0);
        assert_eq!(
            f.notifier.current().unwrap().message,
            "Could not capture the image. Please try again."
        );
    }

    #[tokio::test]
    async fn test_snapshot_when_inactive_is_noop() {
        let mut f = fixture(MockCaptureDevice::new());
        assert!(f.manager.snapshot().is_none());
        assert!(f.notifier.current().is_none());
    }

    #[tokio::test]
    async fn test_second_acquire_is_noop() {
        let mut f = fixture(MockCaptureDevice::new());
        let first = f.manager.acquire().await.unwrap();
        assert!(f.manager.acquire().await.is_none());
        assert_eq!(f.manager.preview(), Some(first));
        assert_eq!(f.device.opened(), 1);
    }

    #[tokio::test]
    async fn test_request_while_requesting_is_noop() {
        let mut f = fixture(MockCaptureDevice::new());
        let request = f.manager.request_stream().unwrap();
        assert!(f.manager.request_stream().is_none());
        let result = request.run().await;
        assert!(f.manager.install(result).is_some());
    }

    #[tokio::test]
    async fn test_late_grant_after_navigation_is_released() {
        let mut f = fixture(MockCaptureDevice::new());
        let request = f.manager.request_stream().unwrap();
        let result = request.run().await;

        f.context.set_tab(Tab::Chat);
        assert!(f.manager.install(result).is_none());
        assert_eq!(f.manager.state(), CaptureState::Inactive);
        assert_eq!(f.device.live_streams(), 0);
    }

    #[tokio::test]
    async fn test_undelivered_grant_is_released() {
        let mut f = fixture(MockCaptureDevice::new());
        let request = f.manager.request_stream().unwrap();
        let result = request.run().await;
        assert_eq!(f.device.live_streams(), 1);

        drop(result);
        assert_eq!(f.device.opened(), 1);
        assert_eq!(f.device.released(), 1);
        assert_eq!(f.device.live_streams(), 0);
    }

    #[tokio::test]
    async fn test_drop_releases_stream() {
        let f = fixture(MockCaptureDevice::new());
        let device = f.device.clone();
        let mut manager = f.manager;
        manager.acquire().await.unwrap();
        drop(manager);
        assert_eq!(device.live_streams(), 0);
    }

    #[tokio::test]
    async fn test_event_sequence() {
        let mut f = fixture(MockCaptureDevice::new());
        let mut rx = f.events.subscribe();
        f.manager.acquire().await.unwrap();
        f.manager.snapshot().unwrap();

        let names: Vec<&str> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|e| e.name())
            .collect();
        assert_eq!(
            names,
            vec!["capture_started", "capture_released", "snapshot_taken"]
        );
    }
}
