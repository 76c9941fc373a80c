//! Camera backed by a still image on disk.
//!
//! Some kiosks get their frames from an external grabber that keeps
//! overwriting one file. This device treats that file as the live feed: every
//! poll re-reads the latest frame, and failures to reach the file map onto the
//! usual capture errors. Reading and decoding run on the blocking pool.

use std::path::PathBuf;

use image::RgbImage;
use tracing::{debug, warn};

use super::{CameraDevice, LiveStream, StreamRequest};
use crate::error::CaptureError;

/// A camera whose frames come from an image file.
#[derive(Debug, Clone)]
pub struct StillImageCamera {
    path: PathBuf,
}

impl StillImageCamera {
    /// Serve frames from the image at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn decode(bytes: &[u8]) -> Result<RgbImage, CaptureError> {
    image::load_from_memory(bytes)
        .map(|image| image.to_rgb8())
        .map_err(|err| CaptureError::unknown(format!("unreadable frame: {err}")))
}

async fn load_frame(path: PathBuf) -> Result<RgbImage, CaptureError> {
    tokio::task::spawn_blocking(move || {
        let bytes = std::fs::read(&path)?;
        decode(&bytes)
    })
    .await
    .map_err(|err| CaptureError::unknown(format!("frame reader failed: {err}")))?
}

#[async_trait::async_trait]
impl CameraDevice for StillImageCamera {
    fn name(&self) -> &'static str {
        "still_image"
    }

    async fn open(&self, _request: &StreamRequest) -> Result<Box<dyn LiveStream>, CaptureError> {
        if self.path.as_os_str().is_empty() {
            return Err(CaptureError::DeviceNotFound);
        }

        let first_frame = load_frame(self.path.clone()).await?;
        debug!(
            path = %self.path.display(),
            width = first_frame.width(),
            height = first_frame.height(),
            "still image camera opened"
        );

        Ok(Box::new(StillImageStream {
            path: Some(self.path.clone()),
            last_frame: Some(first_frame),
        }))
    }
}

#[derive(Debug)]
struct StillImageStream {
    path: Option<PathBuf>,
    last_frame: Option<RgbImage>,
}

#[async_trait::async_trait]
impl LiveStream for StillImageStream {
    async fn current_frame(&mut self) -> Option<RgbImage> {
        let path = self.path.as_ref()?;
        // Keep showing the previous frame if the grabber is mid-write.
        match load_frame(path.clone()).await {
            Ok(frame) => self.last_frame = Some(frame),
            Err(err) => warn!(path = %path.display(), error = %err, "keeping previous frame"),
        }
        self.last_frame.clone()
    }

    fn stop(&mut self) {
        self.path = None;
        self.last_frame = None;
    }
}
