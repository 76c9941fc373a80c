//! Clock in/out action flow.
//!
//! A clock action moves through three states:
//!
//! ```text
//!   Idle --trigger--> AwaitingCapture --confirm_capture--> Processing --finish--> Idle
//!                          |
//!                          +--cancel--> Idle
//! ```
//!
//! The camera is open only while awaiting capture. Only one action can be in
//! flight per session, and the action button is disabled while processing.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::attendance::{AttendanceLog, AttendanceStatus, LogEntry, NewLogEntry};
use crate::camera::{CameraDevice, CaptureSession, ImageRef, SnapshotEncoding, StreamRequest};
use crate::employee::{Employee, EmployeeId};
use crate::error::{NoOpError, Result};

/// A clock action waiting on its photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAction {
    /// Who is clocking.
    pub employee_id: EmployeeId,
    /// Their display name when the action started.
    pub employee_name: String,
    /// The status they are moving to.
    pub status: AttendanceStatus,
}

/// Where the current clock action stands.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ClockState {
    /// Nothing pending.
    #[default]
    Idle,
    /// Camera open, waiting for the photo.
    AwaitingCapture(PendingAction),
    /// Photo taken, entry about to be logged.
    Processing(PendingAction, ImageRef),
}

impl ClockState {
    /// The action in flight, if any.
    #[must_use]
    pub fn pending(&self) -> Option<&PendingAction> {
        match self {
            Self::Idle => None,
            Self::AwaitingCapture(pending) | Self::Processing(pending, _) => Some(pending),
        }
    }
}

/// Drives one session's clock actions.
#[derive(Debug)]
pub struct ClockActionController {
    state: ClockState,
    capture: Option<CaptureSession>,
    request: StreamRequest,
    encoding: SnapshotEncoding,
    processing_delay: Duration,
}

impl Default for ClockActionController {
    fn default() -> Self {
        Self::new(
            StreamRequest::default(),
            SnapshotEncoding::default(),
            Duration::from_millis(crate::config::DEFAULT_PROCESSING_DELAY_MS),
        )
    }
}

impl ClockActionController {
    /// Create an idle controller.
    #[must_use]
    pub fn new(
        request: StreamRequest,
        encoding: SnapshotEncoding,
        processing_delay: Duration,
    ) -> Self {
        Self {
            state: ClockState::Idle,
            capture: None,
            request,
            encoding,
            processing_delay,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &ClockState {
        &self.state
    }

    /// Whether the camera is held by this controller.
    #[must_use]
    pub fn is_camera_open(&self) -> bool {
        self.capture.as_ref().is_some_and(CaptureSession::is_open)
    }

    /// Whether the action button accepts presses.
    #[must_use]
    pub fn action_enabled(&self) -> bool {
        !matches!(self.state, ClockState::Processing(..))
    }

    /// Start a clock action for `employee` and open the camera.
    ///
    /// The pending status is the opposite of the employee's current status.
    ///
    /// # Errors
    ///
    /// Returns [`NoOpError::ActionInProgress`] unless idle, or the camera's
    /// capture error. On a capture error the controller is back to idle and
    /// holds no camera.
    pub async fn trigger(
        &mut self,
        employee: &Employee,
        log: &AttendanceLog,
        camera: &dyn CameraDevice,
    ) -> Result<AttendanceStatus> {
        if self.state != ClockState::Idle {
            return Err(NoOpError::ActionInProgress.into());
        }

        let status = log.current_status(&employee.id).toggled();
        self.state = ClockState::AwaitingCapture(PendingAction {
            employee_id: employee.id.clone(),
            employee_name: employee.display_name(),
            status,
        });
        debug!(id = %employee.id, pending = %status, "clock action started");

        match CaptureSession::open(camera, &self.request).await {
            Ok(session) => {
                self.capture = Some(session);
                Ok(status)
            }
            Err(err) => {
                warn!(id = %employee.id, error = %err, "clock action abandoned");
                self.state = ClockState::Idle;
                Err(err.into())
            }
        }
    }

    /// Take the photo, release the camera, and move to processing.
    ///
    /// # Errors
    ///
    /// Returns [`NoOpError::NoPendingCapture`] unless awaiting capture. If the
    /// camera has no frame yet the controller stays in `AwaitingCapture` with
    /// the camera open, so the capture can be retried or cancelled.
    pub async fn confirm_capture(&mut self) -> Result<()> {
        let ClockState::AwaitingCapture(pending) = &self.state else {
            return Err(NoOpError::NoPendingCapture.into());
        };
        let session = self.capture.as_mut().ok_or(NoOpError::NoActiveStream)?;
        let photo = session.capture(self.encoding).await?;
        session.close();
        self.capture = None;

        let pending = pending.clone();
        debug!(id = %pending.employee_id, "photo captured");
        self.state = ClockState::Processing(pending, photo);
        Ok(())
    }

    /// Wait out the processing delay, log the entry, and return to idle.
    ///
    /// # Errors
    ///
    /// Returns [`NoOpError::NoPendingCapture`] unless processing.
    pub async fn finish(&mut self, log: &mut AttendanceLog) -> Result<LogEntry> {
        let ClockState::Processing(pending, photo) = &self.state else {
            return Err(NoOpError::NoPendingCapture.into());
        };
        let (pending, photo) = (pending.clone(), photo.clone());

        if !self.processing_delay.is_zero() {
            tokio::time::sleep(self.processing_delay).await;
        }

        let stored = log
            .append(NewLogEntry {
                employee_id: pending.employee_id,
                employee_name: pending.employee_name,
                status: pending.status,
                timestamp: chrono::Utc::now(),
                photo: Some(photo),
            })
            .clone();
        self.state = ClockState::Idle;
        info!(
            id = %stored.employee_id,
            name = %stored.employee_name,
            status = %stored.status,
            "clock action recorded"
        );
        Ok(stored)
    }

    /// Abandon a pending capture and release the camera.
    ///
    /// Returns `true` if an action was discarded. Processing cannot be
    /// cancelled.
    pub fn cancel(&mut self) -> bool {
        match self.state {
            ClockState::AwaitingCapture(_) => {
                self.release_camera();
                self.state = ClockState::Idle;
                debug!("clock action cancelled");
                true
            }
            ClockState::Idle => {
                self.release_camera();
                false
            }
            ClockState::Processing(..) => false,
        }
    }

    fn release_camera(&mut self) {
        if let Some(mut session) = self.capture.take() {
            session.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::TestPatternCamera;
    use crate::error::{CaptureError, Error};

    fn alex() -> Employee {
        Employee::new(
            EmployeeId::parse("1234567890123").unwrap(),
            "Alex",
            "Hartman",
            ImageRef::from_url("x"),
        )
        .unwrap()
    }

    fn controller() -> ClockActionController {
        ClockActionController::new(
            StreamRequest {
                width: 32,
                height: 24,
                ..StreamRequest::default()
            },
            SnapshotEncoding::default(),
            Duration::ZERO,
        )
    }

    async fn full_cycle(
        controller: &mut ClockActionController,
        employee: &Employee,
        log: &mut AttendanceLog,
        camera: &TestPatternCamera,
    ) -> LogEntry {
        controller.trigger(employee, log, camera).await.unwrap();
        controller.confirm_capture().await.unwrap();
        controller.finish(log).await.unwrap()
    }

    #[tokio::test]
    async fn test_first_action_clocks_in() {
        let camera = TestPatternCamera::new();
        let mut log = AttendanceLog::new();
        let mut controller = controller();
        let employee = alex();

        let pending = controller.trigger(&employee, &log, &camera).await.unwrap();
        assert_eq!(pending, AttendanceStatus::ClockedIn);
        assert!(matches!(controller.state(), ClockState::AwaitingCapture(_)));
        assert!(controller.is_camera_open());

        controller.confirm_capture().await.unwrap();
        assert!(matches!(controller.state(), ClockState::Processing(..)));
        assert!(!controller.action_enabled());
        assert!(!camera.is_in_use());

        let entry = controller.finish(&mut log).await.unwrap();
        assert_eq!(entry.status, AttendanceStatus::ClockedIn);
        assert_eq!(entry.employee_name, "Alex Hartman");
        assert!(entry.photo.as_ref().is_some_and(ImageRef::is_inline_jpeg));
        assert_eq!(controller.state(), &ClockState::Idle);
        assert!(controller.action_enabled());

        assert_eq!(log.entries_for(&employee.id).count(), 1);
        assert_eq!(log.current_status(&employee.id), AttendanceStatus::ClockedIn);
    }

    #[tokio::test]
    async fn test_two_cycles_toggle_back() {
        let camera = TestPatternCamera::new();
        let mut log = AttendanceLog::new();
        let mut controller = controller();
        let employee = alex();

        for expected in [
            AttendanceStatus::ClockedIn,
            AttendanceStatus::ClockedOut,
            AttendanceStatus::ClockedIn,
            AttendanceStatus::ClockedOut,
        ] {
            let entry = full_cycle(&mut controller, &employee, &mut log, &camera).await;
            assert_eq!(entry.status, expected);
            assert_eq!(log.current_status(&employee.id), expected);
        }
        assert_eq!(camera.open_count(), camera.stop_count());
    }

    #[tokio::test]
    async fn test_cancel_logs_nothing() {
        let camera = TestPatternCamera::new();
        let mut log = AttendanceLog::new();
        let mut controller = controller();
        let employee = alex();

        full_cycle(&mut controller, &employee, &mut log, &camera).await;
        controller.trigger(&employee, &log, &camera).await.unwrap();
        assert!(controller.cancel());

        assert_eq!(controller.state(), &ClockState::Idle);
        assert!(!camera.is_in_use());
        assert_eq!(log.len(), 1);
        assert_eq!(log.current_status(&employee.id), AttendanceStatus::ClockedIn);
    }

    #[tokio::test]
    async fn test_cancel_when_idle_is_noop() {
        let mut controller = controller();
        assert!(!controller.cancel());
        assert_eq!(controller.state(), &ClockState::Idle);
    }

    #[tokio::test]
    async fn test_processing_cannot_be_cancelled() {
        let camera = TestPatternCamera::new();
        let mut log = AttendanceLog::new();
        let mut controller = controller();
        let employee = alex();

        controller.trigger(&employee, &log, &camera).await.unwrap();
        controller.confirm_capture().await.unwrap();
        assert!(!controller.cancel());
        assert!(matches!(controller.state(), ClockState::Processing(..)));

        controller.finish(&mut log).await.unwrap();
        assert_eq!(log.len(), 1);
    }

    #[tokio::test]
    async fn test_second_trigger_is_rejected() {
        let camera = TestPatternCamera::new();
        let log = AttendanceLog::new();
        let mut controller = controller();
        let employee = alex();

        controller.trigger(&employee, &log, &camera).await.unwrap();
        let err = controller.trigger(&employee, &log, &camera).await.unwrap_err();
        assert!(matches!(err, Error::NoOp(NoOpError::ActionInProgress)));

        controller.confirm_capture().await.unwrap();
        let err = controller.trigger(&employee, &log, &camera).await.unwrap_err();
        assert!(matches!(err, Error::NoOp(NoOpError::ActionInProgress)));
        assert_eq!(camera.open_count(), 1);
    }

    #[tokio::test]
    async fn test_camera_failure_returns_to_idle() {
        let camera = TestPatternCamera::new();
        let log = AttendanceLog::new();
        let mut controller = controller();
        let employee = alex();

        for failure in [
            CaptureError::PermissionDenied,
            CaptureError::DeviceNotFound,
            CaptureError::DeviceBusy,
            CaptureError::unknown("driver crashed"),
        ] {
            camera.fail_next_open(failure.clone());
            let err = controller.trigger(&employee, &log, &camera).await.unwrap_err();
            assert!(matches!(err, Error::Capture(ref e) if *e == failure));
            assert_eq!(controller.state(), &ClockState::Idle);
            assert!(!controller.is_camera_open());
            assert!(!camera.is_in_use());
        }
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_confirm_without_frame_keeps_waiting() {
        let camera = TestPatternCamera::new().with_warmup_frames(1);
        let mut log = AttendanceLog::new();
        let mut controller = controller();
        let employee = alex();

        controller.trigger(&employee, &log, &camera).await.unwrap();
        let err = controller.confirm_capture().await.unwrap_err();
        assert!(matches!(err, Error::NoOp(NoOpError::EmptyFrame)));
        assert!(matches!(controller.state(), ClockState::AwaitingCapture(_)));
        assert!(controller.is_camera_open());

        controller.confirm_capture().await.unwrap();
        controller.finish(&mut log).await.unwrap();
        assert_eq!(log.len(), 1);
    }

    #[tokio::test]
    async fn test_confirm_and_finish_require_matching_state() {
        let mut log = AttendanceLog::new();
        let mut controller = controller();

        let err = controller.confirm_capture().await.unwrap_err();
        assert!(matches!(err, Error::NoOp(NoOpError::NoPendingCapture)));

        let err = controller.finish(&mut log).await.unwrap_err();
        assert!(matches!(err, Error::NoOp(NoOpError::NoPendingCapture)));
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_processing_delay_is_applied() {
        let camera = TestPatternCamera::new();
        let mut log = AttendanceLog::new();
        let mut controller = ClockActionController::new(
            StreamRequest::default(),
            SnapshotEncoding::default(),
            Duration::from_millis(10),
        );
        let employee = alex();

        controller.trigger(&employee, &log, &camera).await.unwrap();
        controller.confirm_capture().await.unwrap();
        let started = std::time::Instant::now();
        controller.finish(&mut log).await.unwrap();
        assert!(started.elapsed() >= Duration::from_millis(10));
    }

    #[test]
    fn test_state_pending() {
        assert!(ClockState::Idle.pending().is_none());
        let pending = PendingAction {
            employee_id: EmployeeId::parse("1234567890123").unwrap(),
            employee_name: "Alex Hartman".to_string(),
            status: AttendanceStatus::ClockedIn,
        };
        let state = ClockState::AwaitingCapture(pending.clone());
        assert_eq!(state.pending(), Some(&pending));
    }
}
