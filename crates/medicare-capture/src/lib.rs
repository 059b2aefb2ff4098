//! Medicare Capture crate - camera stream lifecycle and still-frame capture.
//!
//! Provides the [`CaptureDevice`] trait for opening a video stream, a
//! [`StreamGuard`] that releases the device when dropped, the
//! [`CaptureManager`] that drives acquire / snapshot / stop, and three
//! device backends: an in-memory mock, a still-image file and a null device.

pub mod device;
pub mod encode;
pub mod guard;
pub mod manager;

use std::future::Future;

use uuid::Uuid;

use medicare_core::config::{CaptureConfig, Facing};
use medicare_core::error::MedicareError;

pub use device::{CameraBackend, MockCaptureDevice, NullCaptureDevice, StillImageDevice};
pub use encode::encode_jpeg;
pub use guard::StreamGuard;
pub use manager::{AcquireRequest, CaptureManager, CaptureState};

/// File name given to captured snapshots.
pub const SNAPSHOT_FILE_NAME: &str = "captured-image.jpg";
/// MIME type of captured snapshots.
pub const SNAPSHOT_MIME_TYPE: &str = "image/jpeg";

/// Parameters for opening a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRequest {
    pub facing: Facing,
    pub width: u32,
    pub height: u32,
}

impl From<&CaptureConfig> for StreamRequest {
    fn from(config: &CaptureConfig) -> Self {
        Self {
            facing: config.facing,
            width: config.width,
            height: config.height,
        }
    }
}

/// One decoded video frame, tightly packed RGB8.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("len", &self.rgb.len())
            .finish()
    }
}

/// What the view needs to show a live preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewHandle {
    pub stream_id: Uuid,
    pub width: u32,
    pub height: u32,
}

/// An open camera stream.
///
/// `release` must be safe to call more than once; [`StreamGuard`] calls it
/// exactly once in practice.
pub trait VideoStream: Send {
    fn id(&self) -> Uuid;

    /// Negotiated `(width, height)`.
    fn dimensions(&self) -> (u32, u32);

    /// Grab the current frame.
    fn read_frame(&mut self) -> Result<Frame, MedicareError>;

    /// Stop all tracks and give the device back.
    fn release(&mut self);
}

/// A camera that can be asked for a stream.
///
/// Opening may wait on a permission prompt, so it is async. A refusal is
/// reported as [`MedicareError::DeviceAccessDenied`].
pub trait CaptureDevice: Send + Sync {
    fn open(
        &self,
        request: &StreamRequest,
    ) -> impl Future<Output = Result<Box<dyn VideoStream>, MedicareError>> + Send;
}
