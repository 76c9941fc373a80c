//! Text shown at the kiosk for each attendance status.

use std::fmt::Display;

use chrono::{DateTime, Local, TimeZone, Utc};

use crate::attendance::{AttendanceStatus, LogEntry};

/// Shown on the action button while a clock action is being logged.
pub const PROCESSING_LABEL: &str = "Processing...";

/// How a status is presented on the clock screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPresentation {
    /// Status heading.
    pub label: &'static str,
    /// Line under the heading.
    pub message: &'static str,
    /// Text of the button that moves to the other status.
    pub action_label: &'static str,
}

/// Title and confirm text of a camera prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapturePrompt {
    /// Prompt heading.
    pub title: &'static str,
    /// What confirming does.
    pub button: &'static str,
}

/// Prompt for a new employee's profile photo.
pub const PROFILE_PROMPT: CapturePrompt = CapturePrompt {
    title: "Capture Employee Photo",
    button: "Set as Profile Photo",
};

/// Presentation of an employee's current status.
#[must_use]
pub fn status_presentation(status: AttendanceStatus) -> StatusPresentation {
    match status {
        AttendanceStatus::ClockedIn => StatusPresentation {
            label: "Clocked In",
            message: "You are currently clocked in. Have a productive day!",
            action_label: "Clock Out",
        },
        AttendanceStatus::ClockedOut => StatusPresentation {
            label: "Clocked Out",
            message: "You are currently clocked out. Ready to start your shift?",
            action_label: "Clock In",
        },
    }
}

/// Prompt for the photo that records a move to `pending`.
#[must_use]
pub fn capture_prompt(pending: AttendanceStatus) -> CapturePrompt {
    match pending {
        AttendanceStatus::ClockedIn => CapturePrompt {
            title: "Clock In: Photo Capture",
            button: "Capture Photo & Clock In",
        },
        AttendanceStatus::ClockedOut => CapturePrompt {
            title: "Clock Out: Photo Capture",
            button: "Capture Photo & Clock Out",
        },
    }
}

/// Wall-clock time of an entry in the kiosk's local zone.
#[must_use]
pub fn format_time(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%I:%M:%S %p")
        .to_string()
}

/// The clock screen's date and time line, e.g.
/// `Friday, October 16, 2026  03:04:05 PM`.
#[must_use]
pub fn format_clock<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    now.format("%A, %B %-d, %Y  %I:%M:%S %p").to_string()
}

/// One activity log row.
#[must_use]
pub fn format_log_entry(entry: &LogEntry) -> String {
    let photo = if entry.photo.is_some() { "photo" } else { "no photo" };
    format!(
        "{}  {:<12} {} ({photo})",
        format_time(entry.timestamp),
        status_presentation(entry.status).label,
        entry.employee_name,
    )
}
