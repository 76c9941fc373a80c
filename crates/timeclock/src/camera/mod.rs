//! Camera acquisition and single-frame capture.
//!
//! A [`CameraDevice`] hands out [`LiveStream`]s. [`CaptureSession`] is the
//! scoped handle the rest of the crate works with: it owns at most one stream,
//! produces snapshots from it, and stops it on [`CaptureSession::close`] or
//! when dropped, whichever comes first.

mod snapshot;
pub mod still;
pub mod test_pattern;

use std::fmt;

use image::RgbImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{CameraConfig, CameraSource};
use crate::error::{CaptureError, NoOpError, Result};

pub use snapshot::{encode_snapshot, ImageRef, SnapshotEncoding, DEFAULT_JPEG_QUALITY};
pub use still::StillImageCamera;
pub use test_pattern::TestPatternCamera;

/// Which way the camera should face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    /// Front camera, facing the person at the kiosk.
    #[default]
    User,
    /// Rear camera.
    Environment,
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Environment => write!(f, "environment"),
        }
    }
}

/// What to ask the device for. Devices treat every field as a preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamRequest {
    /// Preferred camera direction.
    pub facing: Facing,
    /// Preferred frame width in pixels.
    pub width: u32,
    /// Preferred frame height in pixels.
    pub height: u32,
}

impl Default for StreamRequest {
    fn default() -> Self {
        Self {
            facing: Facing::User,
            width: 640,
            height: 480,
        }
    }
}

/// A source of live camera streams.
#[async_trait::async_trait]
pub trait CameraDevice: Send + Sync {
    /// Device name for logging.
    fn name(&self) -> &'static str;

    /// Negotiate access and start a stream.
    ///
    /// Implementations must not hold any device resource when this returns
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns a [`CaptureError`] describing why the camera is unavailable.
    async fn open(
        &self,
        request: &StreamRequest,
    ) -> std::result::Result<Box<dyn LiveStream>, CaptureError>;
}

/// A running camera stream.
#[async_trait::async_trait]
pub trait LiveStream: Send {
    /// The most recently rendered frame, if any.
    async fn current_frame(&mut self) -> Option<RgbImage>;

    /// Stop every track and release the device. Must be idempotent.
    fn stop(&mut self);
}

/// Scoped ownership of one camera stream.
pub struct CaptureSession {
    device: &'static str,
    stream: Option<Box<dyn LiveStream>>,
}

impl fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureSession")
            .field("device", &self.device)
            .field("open", &self.is_open())
            .finish()
    }
}

impl CaptureSession {
    /// Acquire a stream from `device`.
    ///
    /// # Errors
    ///
    /// Returns the device's [`CaptureError`]; no stream is held in that case.
    pub async fn open(
        device: &dyn CameraDevice,
        request: &StreamRequest,
    ) -> std::result::Result<Self, CaptureError> {
        debug!(device = device.name(), facing = %request.facing, "opening camera");
        match device.open(request).await {
            Ok(stream) => Ok(Self {
                device: device.name(),
                stream: Some(stream),
            }),
            Err(err) => {
                warn!(device = device.name(), error = %err, "camera unavailable");
                Err(err)
            }
        }
    }

    /// Whether the stream is still held.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Grab the current frame and encode it.
    ///
    /// The stream stays open; callers close it once they are done.
    ///
    /// # Errors
    ///
    /// Returns [`NoOpError::NoActiveStream`] after close,
    /// [`NoOpError::EmptyFrame`] before the first frame, or an encoding error.
    pub async fn capture(&mut self, encoding: SnapshotEncoding) -> Result<ImageRef> {
        let stream = self.stream.as_mut().ok_or(NoOpError::NoActiveStream)?;
        let frame = stream
            .current_frame()
            .await
            .filter(|frame| frame.width() > 0 && frame.height() > 0)
            .ok_or(NoOpError::EmptyFrame)?;

        let image = encode_snapshot(&frame, encoding)?;
        debug!(
            device = self.device,
            width = frame.width(),
            height = frame.height(),
            "captured frame"
        );
        Ok(image)
    }

    /// Stop the stream and release the device. Safe to call repeatedly.
    pub fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            debug!(device = self.device, "camera released");
        }
    }
}

impl Drop for CaptureSession {
    fn drop(&mut self) {
        self.close();
    }
}

/// Build the device selected in configuration.
#[must_use]
pub fn from_config(config: &CameraConfig) -> Box<dyn CameraDevice> {
    match config.source {
        CameraSource::TestPattern => Box::new(TestPatternCamera::new()),
        CameraSource::StillImage => Box::new(StillImageCamera::new(
            config.image_path.clone().unwrap_or_default(),
        )),
    }
}
