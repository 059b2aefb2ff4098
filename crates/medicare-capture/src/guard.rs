use uuid::Uuid;

use medicare_core::error::Result;
use medicare_core::events::{ClientEvent, EventBus, ReleaseReason};

use crate::{Frame, PreviewHandle, VideoStream};

/// Sole owner of an open [`VideoStream`].
///
/// Dropping the guard releases the device and emits
/// [`ClientEvent::CaptureReleased`]. Unless [`StreamGuard::release`] names
/// another reason, the release is reported as a teardown.
pub struct StreamGuard {
    stream: Option<Box<dyn VideoStream>>,
    reason: ReleaseReason,
    events: EventBus,
}

impl StreamGuard {
    pub fn new(stream: Box<dyn VideoStream>, events: EventBus) -> Self {
        Self {
            stream: Some(stream),
            reason: ReleaseReason::Teardown,
            events,
        }
    }

    pub fn id(&self) -> Option<Uuid> {
        self.stream.as_ref().map(|s| s.id())
    }

    pub fn preview(&self) -> Option<PreviewHandle> {
        self.stream.as_ref().map(|s| {
            let (width, height) = s.dimensions();
            PreviewHandle {
                stream_id: s.id(),
                width,
                height,
            }
        })
    }

    pub fn read_frame(&mut self) -> Result<Frame> {
        match self.stream.as_mut() {
            Some(stream) => stream.read_frame(),
            None => Err(medicare_core::MedicareError::Capture(
                "stream already released".to_string(),
            )),
        }
    }

    /// Release now, recording `reason`.
    pub fn release(mut self, reason: ReleaseReason) {
        self.reason = reason;
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            let stream_id = stream.id();
            stream.release();
            tracing::info!(%stream_id, reason = ?self.reason, "Camera released");
            self.events.emit(ClientEvent::CaptureReleased {
                stream_id,
                reason: self.reason,
            });
        }
    }
}

impl std::fmt::Debug for StreamGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamGuard")
            .field("stream_id", &self.id())
            .field("reason", &self.reason)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::MockCaptureDevice;
    use crate::{CaptureDevice, StreamRequest};
    use medicare_core::config::Facing;

    fn request() -> StreamRequest {
        StreamRequest {
            facing: Facing::Environment,
            width: 8,
            height: 4,
        }
    }

    #[tokio::test]
    async fn test_drop_releases_as_teardown() {
        let device = MockCaptureDevice::new();
        let events = EventBus::new(8);
        let mut rx = events.subscribe();

        let stream = device.open(&request()).await.unwrap();
        let id = stream.id();
        let guard = StreamGuard::new(stream, events);
        drop(guard);

        assert_eq!(device.released(), 1);
        assert_eq!(
            rx.try_recv().unwrap(),
            ClientEvent::CaptureReleased {
                stream_id: id,
                reason: ReleaseReason::Teardown,
            }
        );
    }

    #[tokio::test]
    async fn test_release_records_reason_once() {
        let device = MockCaptureDevice::new();
        let events = EventBus::new(8);
        let mut rx = events.subscribe();

        let guard = StreamGuard::new(device.open(&request()).await.unwrap(), events);
        guard.release(ReleaseReason::Stopped);

        assert_eq!(device.released(), 1);
        assert!(matches!(
            rx.try_recv().unwrap(),
            ClientEvent::CaptureReleased {
                reason: ReleaseReason::Stopped,
                ..
            }
        ));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_preview_reports_dimensions() {
        let device = MockCaptureDevice::new();
        let guard = StreamGuard::new(device.open(&request()).await.unwrap(), EventBus::new(4));
        let preview = guard.preview().unwrap();
        assert_eq!((preview.width, preview.height), (8, 4));
        assert_eq!(Some(preview.stream_id), guard.id());
    }
}
