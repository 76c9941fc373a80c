//! Synthetic camera that renders a test pattern.
//!
//! Used by the kiosk when no real capture backend is configured, and by the
//! tests. It behaves like a single physical device: only one stream may be
//! open at a time, and a failure can be queued for the next open.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use image::{Rgb, RgbImage};
use tracing::trace;

use super::{CameraDevice, LiveStream, StreamRequest};
use crate::error::CaptureError;

#[derive(Debug, Default)]
struct DeviceState {
    in_use: AtomicBool,
    open_count: AtomicUsize,
    stop_count: AtomicUsize,
    pending_failure: Mutex<Option<CaptureError>>,
}

impl DeviceState {
    fn release(&self) {
        self.in_use.store(false, Ordering::SeqCst);
        self.stop_count.fetch_add(1, Ordering::SeqCst);
    }
}

/// A camera that draws frames instead of reading a sensor.
#[derive(Debug, Clone, Default)]
pub struct TestPatternCamera {
    state: Arc<DeviceState>,
    negotiation_delay: Duration,
    warmup_frames: u32,
}

impl TestPatternCamera {
    /// Create an idle test-pattern camera.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a permission prompt that takes `delay` to resolve.
    #[must_use]
    pub fn with_negotiation_delay(mut self, delay: Duration) -> Self {
        self.negotiation_delay = delay;
        self
    }

    /// Report no frame for the first `frames` polls of every stream.
    #[must_use]
    pub fn with_warmup_frames(mut self, frames: u32) -> Self {
        self.warmup_frames = frames;
        self
    }

    /// Make the next [`CameraDevice::open`] fail with `error`.
    pub fn fail_next_open(&self, error: CaptureError) {
        *self
            .state
            .pending_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    /// Whether a stream currently holds the device.
    #[must_use]
    pub fn is_in_use(&self) -> bool {
        self.state.in_use.load(Ordering::SeqCst)
    }

    /// Number of streams successfully opened.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.state.open_count.load(Ordering::SeqCst)
    }

    /// Number of streams stopped.
    #[must_use]
    pub fn stop_count(&self) -> usize {
        self.state.stop_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl CameraDevice for TestPatternCamera {
    fn name(&self) -> &'static str {
        "test_pattern"
    }

    async fn open(&self, request: &StreamRequest) -> Result<Box<dyn LiveStream>, CaptureError> {
        if !self.negotiation_delay.is_zero() {
            tokio::time::sleep(self.negotiation_delay).await;
        }

        let failure = self
            .state
            .pending_failure
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(err) = failure {
            return Err(err);
        }

        if self
            .state
            .in_use
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(CaptureError::DeviceBusy);
        }
        self.state.open_count.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(TestPatternStream {
            state: Arc::clone(&self.state),
            width: request.width,
            height: request.height,
            warmup_remaining: self.warmup_frames,
            frame_number: 0,
            stopped: false,
        }))
    }
}

#[derive(Debug)]
struct TestPatternStream {
    state: Arc<DeviceState>,
    width: u32,
    height: u32,
    warmup_remaining: u32,
    frame_number: u32,
    stopped: bool,
}

#[async_trait::async_trait]
impl LiveStream for TestPatternStream {
    async fn current_frame(&mut self) -> Option<RgbImage> {
        if self.stopped {
            return None;
        }
        if self.warmup_remaining > 0 {
            self.warmup_remaining -= 1;
            return None;
        }

        self.frame_number = self.frame_number.wrapping_add(1);
        trace!(frame = self.frame_number, "rendering test pattern");
        Some(render_pattern(self.width, self.height, self.frame_number))
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.state.release();
        }
    }
}

impl Drop for TestPatternStream {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Gradient background with a white bar along the left edge, so mirroring
/// is visible in the output.
fn render_pattern(width: u32, height: u32, frame_number: u32) -> RgbImage {
    let bar = width / 8;
    let shift = frame_number % 256;
    RgbImage::from_fn(width, height, |x, y| {
        if x < bar {
            return Rgb([255, 255, 255]);
        }
        let r = (x * 255 / width.max(1) + shift) % 256;
        let g = y * 255 / height.max(1);
        Rgb([
            u8::try_from(r).unwrap_or(u8::MAX),
            u8::try_from(g).unwrap_or(u8::MAX),
            64,
        ])
    })
}
