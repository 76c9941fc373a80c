//! Employee registration.
//!
//! The admin screen keeps a form draft and, while the operator is taking the
//! new employee's profile photo, its own camera session.

use tracing::{debug, info};

use crate::camera::{CameraDevice, CaptureSession, ImageRef, SnapshotEncoding, StreamRequest};
use crate::employee::{Employee, EmployeeId, EMPLOYEE_ID_LEN};
use crate::error::{NoOpError, Result, ValidationError};
use crate::registry::EmployeeRegistry;

/// Registration form contents.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmployeeForm {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    id_input: String,
    /// Captured profile photo.
    pub photo: Option<ImageRef>,
}

impl EmployeeForm {
    /// An empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The ID typed so far.
    #[must_use]
    pub fn id_input(&self) -> &str {
        &self.id_input
    }

    /// Replace the ID field. Input that is not digits, or longer than
    /// 13 characters, is ignored and `false` is returned.
    pub fn set_id_input(&mut self, value: &str) -> bool {
        if EmployeeId::is_valid_prefix(value) {
            value.clone_into(&mut self.id_input);
            true
        } else {
            false
        }
    }

    /// Check the form and build the employee it describes.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] for an empty field or missing
    /// photo, and [`ValidationError::InvalidEmployeeId`] for an ID that is not
    /// exactly 13 digits.
    pub fn to_employee(&self) -> std::result::Result<Employee, ValidationError> {
        if self.first_name.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "first_name" });
        }
        if self.last_name.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "last_name" });
        }
        if self.id_input.is_empty() {
            return Err(ValidationError::MissingField { field: "id" });
        }
        let Some(photo) = self.photo.clone() else {
            return Err(ValidationError::MissingField { field: "photo" });
        };
        if self.id_input.len() != EMPLOYEE_ID_LEN {
            return Err(ValidationError::InvalidEmployeeId {
                value: self.id_input.clone(),
            });
        }

        let id = EmployeeId::parse(self.id_input.as_str())?;
        Employee::new(id, self.first_name.trim(), self.last_name.trim(), photo)
    }
}

/// The admin screen's state.
#[derive(Debug, Default)]
pub struct AdminPanel {
    form: EmployeeForm,
    camera: Option<CaptureSession>,
}

impl AdminPanel {
    /// An empty panel with the camera closed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The registration draft.
    #[must_use]
    pub fn form(&self) -> &EmployeeForm {
        &self.form
    }

    /// Edit the registration draft.
    pub fn form_mut(&mut self) -> &mut EmployeeForm {
        &mut self.form
    }

    /// Whether the profile camera is open.
    #[must_use]
    pub fn is_camera_open(&self) -> bool {
        self.camera.as_ref().is_some_and(CaptureSession::is_open)
    }

    /// Open the camera for a profile photo. Opening twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the camera's capture error; the panel holds no camera then.
    pub async fn open_camera(
        &mut self,
        device: &dyn CameraDevice,
        request: &StreamRequest,
    ) -> Result<()> {
        if self.is_camera_open() {
            return Ok(());
        }
        self.camera = Some(CaptureSession::open(device, request).await?);
        Ok(())
    }

    /// Take the profile photo and close the camera.
    ///
    /// # Errors
    ///
    /// Returns [`NoOpError::NoActiveStream`] if the camera is closed, or the
    /// capture failure. On failure the camera stays open.
    pub async fn capture_photo(&mut self, encoding: SnapshotEncoding) -> Result<&ImageRef> {
        let session = self.camera.as_mut().ok_or(NoOpError::NoActiveStream)?;
        let photo = session.capture(encoding).await?;
        self.close_camera();
        debug!("profile photo captured");
        let photo: &ImageRef = self.form.photo.insert(photo);
        Ok(photo)
    }

    /// Close the camera without taking a photo.
    pub fn close_camera(&mut self) {
        if let Some(mut session) = self.camera.take() {
            session.close();
        }
    }

    /// Register the drafted employee and clear the form.
    ///
    /// The form is kept on failure so it can be corrected.
    ///
    /// # Errors
    ///
    /// Returns the form's validation error or
    /// [`ValidationError::DuplicateId`].
    pub fn submit(&mut self, registry: &mut EmployeeRegistry) -> Result<Employee> {
        let employee = self.form.to_employee()?;
        let added = registry.add(employee)?.clone();
        info!(id = %added.id, "employee added from admin panel");
        self.form = EmployeeForm::new();
        Ok(added)
    }
}
