//! The kiosk: one session's worth of state and the actions a front end can
//! trigger on it.

use std::fmt;

use tracing::{debug, info};

use crate::admin::{AdminPanel, EmployeeForm};
use crate::attendance::{AttendanceLog, AttendanceStatus, LogEntry};
use crate::camera::{self, CameraDevice, ImageRef, SnapshotEncoding, StreamRequest};
use crate::clock::{ClockActionController, ClockState};
use crate::config::Config;
use crate::employee::{Employee, EmployeeId};
use crate::error::{NoOpError, Result};
use crate::registry::EmployeeRegistry;
use crate::session::{SessionController, View};

/// A running kiosk.
pub struct Kiosk {
    registry: EmployeeRegistry,
    log: AttendanceLog,
    session: SessionController,
    clock: ClockActionController,
    admin: AdminPanel,
    camera: Box<dyn CameraDevice>,
    request: StreamRequest,
    encoding: SnapshotEncoding,
}

impl fmt::Debug for Kiosk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kiosk")
            .field("employees", &self.registry.len())
            .field("log_entries", &self.log.len())
            .field("view", &self.session.view())
            .field("clock", self.clock.state())
            .field("camera", &self.camera.name())
            .finish_non_exhaustive()
    }
}

impl Kiosk {
    /// Build a kiosk using the camera selected in `config`.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a seed employee is malformed.
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config, camera::from_config(&config.camera))
    }

    /// Build a kiosk around an explicit camera device.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a seed employee is malformed.
    pub fn new(config: &Config, camera: Box<dyn CameraDevice>) -> Result<Self> {
        let registry = EmployeeRegistry::from_seeds(&config.registry.seed_employees)?;
        info!(
            employees = registry.len(),
            camera = camera.name(),
            "kiosk ready"
        );
        Ok(Self {
            registry,
            log: AttendanceLog::new(),
            session: SessionController::new(),
            clock: ClockActionController::new(
                config.stream_request(),
                config.snapshot_encoding(),
                config.processing_delay(),
            ),
            admin: AdminPanel::new(),
            camera,
            request: config.stream_request(),
            encoding: config.snapshot_encoding(),
        })
    }

    // === Read-only state ===

    /// Registered employees in registration order.
    #[must_use]
    pub fn employees(&self) -> &[Employee] {
        self.registry.list()
    }

    /// The screen being shown.
    #[must_use]
    pub fn view(&self) -> View {
        self.session.view()
    }

    /// The employee using the kiosk.
    #[must_use]
    pub fn active_employee(&self) -> Option<&Employee> {
        self.session.active_employee()
    }

    /// The active employee's derived status.
    #[must_use]
    pub fn current_status(&self) -> Option<AttendanceStatus> {
        self.active_employee()
            .map(|employee| self.log.current_status(&employee.id))
    }

    /// Any employee's derived status.
    #[must_use]
    pub fn status_of(&self, id: &EmployeeId) -> AttendanceStatus {
        self.log.current_status(id)
    }

    /// The active employee's log, newest first. Empty when nobody is selected.
    pub fn activity_log(&self) -> impl Iterator<Item = &LogEntry> + Clone + '_ {
        self.active_employee()
            .map(|employee| self.log.entries_for(&employee.id))
            .into_iter()
            .flatten()
    }

    /// The whole attendance log.
    #[must_use]
    pub fn log(&self) -> &AttendanceLog {
        &self.log
    }

    /// Where the clock action stands.
    #[must_use]
    pub fn clock_state(&self) -> &ClockState {
        self.clock.state()
    }

    /// Whether the clock action button accepts presses.
    #[must_use]
    pub fn action_enabled(&self) -> bool {
        self.clock.action_enabled()
    }

    /// The admin screen.
    #[must_use]
    pub fn admin(&self) -> &AdminPanel {
        &self.admin
    }

    /// The registration draft.
    pub fn registration_form_mut(&mut self) -> &mut EmployeeForm {
        self.admin.form_mut()
    }

    /// Name of the camera device in use.
    #[must_use]
    pub fn camera_name(&self) -> &'static str {
        self.camera.name()
    }

    // === Navigation ===

    /// Make the employee with `id` the session subject.
    ///
    /// Any pending capture for the previous subject is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`NoOpError::UnknownEmployee`] if nobody has that ID.
    pub fn select_employee(&mut self, id: &EmployeeId) -> Result<&Employee> {
        let employee = self
            .registry
            .find_by_id(id)
            .cloned()
            .ok_or(NoOpError::UnknownEmployee)?;
        self.clock.cancel();
        self.admin.close_camera();
        self.session.select_employee(employee);
        self.session
            .active_employee()
            .ok_or_else(|| NoOpError::NoActiveEmployee.into())
    }

    /// End the session and return to the profile picker.
    pub fn logout(&mut self) {
        self.clock.cancel();
        self.admin.close_camera();
        self.session.logout();
    }

    /// Enter or leave the admin screen.
    ///
    /// Entering abandons a pending clock capture; leaving closes the profile
    /// camera.
    pub fn toggle_admin(&mut self) -> View {
        if self.session.view() == View::Admin {
            self.admin.close_camera();
        } else {
            self.clock.cancel();
        }
        self.session.toggle_admin()
    }

    // === Registration ===

    /// Open the camera for a new employee's profile photo.
    ///
    /// # Errors
    ///
    /// Returns [`NoOpError::NotOnAdminScreen`] outside the admin view, or the
    /// camera's capture error.
    pub async fn open_profile_camera(&mut self) -> Result<()> {
        if self.session.view() != View::Admin {
            return Err(NoOpError::NotOnAdminScreen.into());
        }
        self.admin
            .open_camera(self.camera.as_ref(), &self.request)
            .await
    }

    /// Take the profile photo.
    ///
    /// # Errors
    ///
    /// Returns a no-op error if the camera is closed or has no frame.
    pub async fn capture_profile_photo(&mut self) -> Result<&ImageRef> {
        self.admin.capture_photo(self.encoding).await
    }

    /// Close the profile camera without a photo.
    pub fn close_profile_camera(&mut self) {
        self.admin.close_camera();
    }

    /// Register the employee described by the registration form.
    ///
    /// # Errors
    ///
    /// Returns a validation error; the registry and form are unchanged then.
    pub fn add_employee(&mut self) -> Result<Employee> {
        self.admin.submit(&mut self.registry)
    }

    // === Clock actions ===

    /// Start a clock action for the active employee and open the camera.
    ///
    /// # Errors
    ///
    /// Returns [`NoOpError::NoActiveEmployee`], [`NoOpError::NotOnClockScreen`],
    /// [`NoOpError::ActionInProgress`], or the camera's capture error.
    pub async fn trigger_clock_action(&mut self) -> Result<AttendanceStatus> {
        let employee = self
            .session
            .active_employee()
            .ok_or(NoOpError::NoActiveEmployee)?;
        if self.session.view() != View::Clock {
            return Err(NoOpError::NotOnClockScreen.into());
        }
        self.clock
            .trigger(employee, &self.log, self.camera.as_ref())
            .await
    }

    /// Take the photo and log the pending action.
    ///
    /// # Errors
    ///
    /// Returns a no-op error if nothing is pending or the camera has no
    /// frame; the action stays pending then.
    pub async fn confirm_capture(&mut self) -> Result<LogEntry> {
        self.clock.confirm_capture().await?;
        let entry = self.clock.finish(&mut self.log).await?;
        debug!(entry = entry.id, "capture confirmed");
        Ok(entry)
    }

    /// Abandon the pending clock action. Returns whether one was pending.
    pub fn cancel_capture(&mut self) -> bool {
        self.clock.cancel()
    }
}
