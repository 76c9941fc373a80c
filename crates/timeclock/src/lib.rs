//! `timeclock` - A photo-verified employee time-clock kiosk
//!
//! This library provides the kiosk core: the employee registry, the in-memory
//! attendance log, the clock-in/clock-out flow that captures a photo per
//! action, and the camera sessions that back it.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod admin;
pub mod attendance;
pub mod camera;
pub mod cli;
pub mod clock;
pub mod config;
pub mod employee;
pub mod error;
pub mod kiosk;
pub mod logging;
pub mod registry;
pub mod session;

pub use attendance::{AttendanceLog, AttendanceStatus, LogEntry};
pub use camera::{CameraDevice, CaptureSession, ImageRef};
pub use config::Config;
pub use employee::{Employee, EmployeeId};
pub use error::{CaptureError, Error, NoOpError, Result, ValidationError};
pub use kiosk::Kiosk;
pub use logging::init_logging;
pub use registry::EmployeeRegistry;
pub use session::View;
