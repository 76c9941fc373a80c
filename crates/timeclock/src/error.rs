//! Error types for timeclock.
//!
//! Failures fall into three families: validation of employee data, camera
//! capture, and actions that have nothing to act on. The crate-level [`Error`]
//! wraps those together with configuration, image, and I/O failures.

use std::path::PathBuf;
use thiserror::Error;

/// Employee data was rejected before reaching the registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The employee ID is not exactly 13 ASCII digits.
    #[error("employee ID must be exactly 13 digits, got '{value}'")]
    InvalidEmployeeId {
        /// The rejected input.
        value: String,
    },

    /// A required registration field was left empty.
    #[error("missing required field: {field}")]
    MissingField {
        /// Name of the empty field.
        field: &'static str,
    },

    /// An employee with this ID is already registered.
    #[error("an employee with ID {id} already exists")]
    DuplicateId {
        /// The conflicting ID.
        id: String,
    },
}

/// The camera could not be acquired.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// The user or the operating system refused camera access.
    #[error("camera permission denied")]
    PermissionDenied,

    /// No camera is connected or enabled.
    #[error("camera device not found")]
    DeviceNotFound,

    /// Another application holds the camera.
    #[error("camera device is busy")]
    DeviceBusy,

    /// Anything else the device reported.
    #[error("camera error: {0}")]
    Unknown(String),
}

impl CaptureError {
    /// Create an unknown capture error.
    #[must_use]
    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown(message.into())
    }

    /// Message shown to the person standing at the kiosk.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => {
                "Camera access was denied. Please allow camera access in your system settings."
            }
            Self::DeviceNotFound => {
                "No camera was found. Please ensure a camera is connected and enabled."
            }
            Self::DeviceBusy => {
                "Your camera is already in use by another application. Please close it and try again."
            }
            Self::Unknown(_) => "Could not access the camera. An unknown error occurred.",
        }
    }
}

impl From<std::io::Error> for CaptureError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match err.kind() {
            ErrorKind::PermissionDenied => Self::PermissionDenied,
            ErrorKind::NotFound => Self::DeviceNotFound,
            // EBUSY
            _ if err.raw_os_error() == Some(16) => Self::DeviceBusy,
            _ => Self::Unknown(err.to_string()),
        }
    }
}

/// An action was triggered with nothing to act on.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpError {
    /// Capture requested while no camera stream is open.
    #[error("no active camera stream")]
    NoActiveStream,

    /// The stream has not rendered a frame yet.
    #[error("camera has not produced a frame yet")]
    EmptyFrame,

    /// A clock action needs a selected employee.
    #[error("no employee is selected")]
    NoActiveEmployee,

    /// No registered employee has the requested ID.
    #[error("no employee is registered with that ID")]
    UnknownEmployee,

    /// Clock actions are only taken from the clock screen.
    #[error("clock actions are only available on the clock screen")]
    NotOnClockScreen,

    /// Profile photos are only taken from the admin screen.
    #[error("profile photos are only taken on the admin screen")]
    NotOnAdminScreen,

    /// A clock action is already pending or processing.
    #[error("a clock action is already in progress")]
    ActionInProgress,

    /// Confirm was requested without a pending capture.
    #[error("no capture is pending")]
    NoPendingCapture,
}

/// The main error type for timeclock operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Domain Errors ===
    /// Employee data failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The camera could not be acquired.
    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// The action had nothing to act on.
    #[error(transparent)]
    NoOp(#[from] NoOpError),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Encoding Errors ===
    /// A frame could not be encoded or decoded.
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to write a file.
    #[error("failed to write {path}: {source}")]
    FileWrite {
        /// Path that couldn't be written.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for timeclock operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Check if this error was raised by validation of employee data.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Check if this error means the camera could not be acquired.
    #[must_use]
    pub fn is_capture_error(&self) -> bool {
        matches!(self, Self::Capture(_))
    }

    /// Check if this error is a duplicate employee ID.
    #[must_use]
    pub fn is_duplicate_id(&self) -> bool {
        matches!(self, Self::Validation(ValidationError::DuplicateId { .. }))
    }

    /// The message to show at the kiosk, if this error has one.
    #[must_use]
    pub fn user_message(&self) -> Option<String> {
        match self {
            Self::Capture(err) => Some(err.user_message().to_string()),
            Self::Validation(err) => Some(err.to_string()),
            Self::NoOp(err) => Some(err.to_string()),
            _ => None,
        }
    }
}
