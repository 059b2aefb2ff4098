//! Capture device backends.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use uuid::Uuid;

use medicare_core::error::{MedicareError, Result};

use crate::{CaptureDevice, Frame, StreamRequest, VideoStream};

// =============================================================================
// Mock
// =============================================================================

#[derive(Debug, Default)]
struct MockCounters {
    opened: AtomicUsize,
    released: AtomicUsize,
}

/// In-memory camera for tests and the demo driver.
///
/// Produces a gradient frame at the requested size. Clones share their
/// open/release counters so a test can keep a handle after giving the
/// device away.
#[derive(Debug, Clone, Default)]
pub struct MockCaptureDevice {
    deny: bool,
    broken_frames: bool,
    counters: Arc<MockCounters>,
}

impl MockCaptureDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// A device whose permission prompt is always refused.
    pub fn denied() -> Self {
        Self {
            deny: true,
            ..Self::default()
        }
    }

    /// A device whose frames cannot be encoded.
    pub fn with_broken_frames() -> Self {
        Self {
            broken_frames: true,
            ..Self::default()
        }
    }

    /// Number of streams handed out.
    pub fn opened(&self) -> usize {
        self.counters.opened.load(Ordering::SeqCst)
    }

    /// Number of streams given back.
    pub fn released(&self) -> usize {
        self.counters.released.load(Ordering::SeqCst)
    }

    /// Streams currently held by someone.
    pub fn live_streams(&self) -> usize {
        self.opened().saturating_sub(self.released())
    }
}

impl CaptureDevice for MockCaptureDevice {
    async fn open(&self, request: &StreamRequest) -> Result<Box<dyn VideoStream>> {
        if self.deny {
            return Err(MedicareError::DeviceAccessDenied(
                "permission refused".to_string(),
            ));
        }
        self.counters.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockStream {
            id: Uuid::new_v4(),
            width: request.width,
            height: request.height,
            broken_frames: self.broken_frames,
            released: false,
            counters: self.counters.clone(),
        }))
    }
}

struct MockStream {
    id: Uuid,
    width: u32,
    height: u32,
    broken_frames: bool,
    released: bool,
    counters: Arc<MockCounters>,
}

impl VideoStream for MockStream {
    fn id(&self) -> Uuid {
        self.id
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn read_frame(&mut self) -> Result<Frame> {
        if self.released {
            return Err(MedicareError::Capture("stream released".to_string()));
        }
        if self.broken_frames {
            return Ok(Frame {
                width: self.width,
                height: self.height,
                rgb: Vec::new(),
            });
        }
        let mut rgb = Vec::with_capacity(self.width as usize * self.height as usize * 3);
        for y in 0..self.height {
            for x in 0..self.width {
                rgb.push((x * 255 / self.width.max(1)) as u8);
                rgb.push((y * 255 / self.height.max(1)) as u8);
                rgb.push(96);
            }
        }
        Ok(Frame {
            width: self.width,
            height: self.height,
            rgb,
        })
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            self.counters.released.fetch_add(1, Ordering::SeqCst);
        }
    }
}

// =============================================================================
// Still image
// =============================================================================

/// Serves frames decoded from an image file (JPEG or PNG).
///
/// The file is read on every `open`, so replacing it between captures
/// changes what the next stream shows.
#[derive(Debug, Clone)]
pub struct StillImageDevice {
    path: PathBuf,
}

impl StillImageDevice {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CaptureDevice for StillImageDevice {
    async fn open(&self, _request: &StreamRequest) -> Result<Box<dyn VideoStream>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            MedicareError::DeviceAccessDenied(format!("{}: {}", self.path.display(), e))
        })?;
        let decoded = image::load_from_memory(&bytes).map_err(|e| {
            MedicareError::DeviceAccessDenied(format!("{}: {}", self.path.display(), e))
        })?;
        let rgb = decoded.to_rgb8();
        let (width, height) = rgb.dimensions();
        tracing::debug!(path = %self.path.display(), width, height, "Still image opened");
        Ok(Box::new(StillStream {
            id: Uuid::new_v4(),
            frame: Frame {
                width,
                height,
                rgb: rgb.into_raw(),
            },
        }))
    }
}

struct StillStream {
    id: Uuid,
    frame: Frame,
}

impl VideoStream for StillStream {
    fn id(&self) -> Uuid {
        self.id
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.frame.width, self.frame.height)
    }

    fn read_frame(&mut self) -> Result<Frame> {
        Ok(self.frame.clone())
    }

    fn release(&mut self) {
        self.frame.rgb = Vec::new();
    }
}

// =============================================================================
// Null
// =============================================================================

/// Used when no camera backend is configured. Every request is refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCaptureDevice;

impl CaptureDevice for NullCaptureDevice {
    async fn open(&self, _request: &StreamRequest) -> Result<Box<dyn VideoStream>> {
        Err(MedicareError::DeviceAccessDenied(
            "no camera available".to_string(),
        ))
    }
}

// =============================================================================
// Runtime selection
// =============================================================================

/// Device chosen at startup.
#[derive(Debug, Clone)]
pub enum CameraBackend {
    Null(NullCaptureDevice),
    Mock(MockCaptureDevice),
    Still(StillImageDevice),
}

impl CaptureDevice for CameraBackend {
    async fn open(&self, request: &StreamRequest) -> Result<Box<dyn VideoStream>> {
        match self {
            CameraBackend::Null(device) => device.open(request).await,
            CameraBackend::Mock(device) => device.open(request).await,
            CameraBackend::Still(device) => device.open(request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use medicare_core::config::Facing;

    fn request(width: u32, height: u32) -> StreamRequest {
        StreamRequest {
            facing: Facing::Environment,
            width,
            height,
        }
    }

    #[tokio::test]
    async fn test_mock_frame_matches_request() {
        let device = MockCaptureDevice::new();
        let mut stream = device.open(&request(10, 6)).await.unwrap();
        let frame = stream.read_frame().unwrap();
        assert_eq!((frame.width, frame.height), (10, 6));
        assert_eq!(frame.rgb.len(), 10 * 6 * 3);
    }

    #[tokio::test]
    async fn test_mock_counters_shared_between_clones() {
        let device = MockCaptureDevice::new();
        let handle = device.clone();
        let mut stream = device.open(&request(4, 4)).await.unwrap();
        assert_eq!(handle.opened(), 1);
        assert_eq!(handle.live_streams(), 1);
        stream.release();
        stream.release();
        assert_eq!(handle.released(), 1);
        assert_eq!(handle.live_streams(), 0);
    }

    #[tokio::test]
    async fn test_mock_denied() {
        let device = MockCaptureDevice::denied();
        let result = device.open(&request(4, 4)).await;
        assert!(matches!(result, Err(MedicareError::DeviceAccessDenied(_))));
        assert_eq!(device.opened(), 0);
    }

    #[tokio::test]
    async fn test_null_device_denies() {
        let result = NullCaptureDevice.open(&request(4, 4)).await;
        assert!(matches!(result, Err(MedicareError::DeviceAccessDenied(_))));
    }

    #[tokio::test]
    async fn test_still_image_serves_decoded_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.png");
        image::RgbImage::from_pixel(5, 3, image::Rgb([10, 20, 30]))
            .save(&path)
            .unwrap();

        let device = CameraBackend::Still(StillImageDevice::new(&path));
        let mut stream = device.open(&request(1280, 720)).await.unwrap();
        assert_eq!(stream.dimensions(), (5, 3));
        let frame = stream.read_frame().unwrap();
        assert_eq!(&frame.rgb[..3], &[10, 20, 30]);
    }

    #[tokio::test]
    async fn test_still_image_missing_file_is_denied() {
        let device = StillImageDevice::new("/nonexistent/scan.png");
        let result = device.open(&request(4, 4)).await;
        assert!(matches!(result, Err(MedicareError::DeviceAccessDenied(_))));
    }
}
