//! Attendance log.
//!
//! The log is append-only and keeps the newest entry at the front. An
//! employee's status is never stored: it is read off their most recent entry.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::camera::ImageRef;
use crate::employee::{Employee, EmployeeId};

/// Whether an employee is on the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    /// On shift.
    ClockedIn,
    /// Off shift. Employees with no history are here.
    #[default]
    ClockedOut,
}

impl AttendanceStatus {
    /// The status a clock action moves to from this one.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::ClockedOut => Self::ClockedIn,
            Self::ClockedIn => Self::ClockedOut,
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClockedIn => write!(f, "Clocked In"),
            Self::ClockedOut => write!(f, "Clocked Out"),
        }
    }
}

/// A log entry before the store has assigned it an ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLogEntry {
    /// Who clocked.
    pub employee_id: EmployeeId,
    /// Their display name at the time.
    pub employee_name: String,
    /// The status they moved to.
    pub status: AttendanceStatus,
    /// When it happened.
    pub timestamp: DateTime<Utc>,
    /// Snapshot taken at the kiosk.
    pub photo: Option<ImageRef>,
}

impl NewLogEntry {
    /// Record `employee` moving to `status` now.
    #[must_use]
    pub fn now(employee: &Employee, status: AttendanceStatus, photo: Option<ImageRef>) -> Self {
        Self {
            employee_id: employee.id.clone(),
            employee_name: employee.display_name(),
            status,
            timestamp: Utc::now(),
            photo,
        }
    }
}

/// A stored, immutable log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Assigned by the log, increasing with every append.
    pub id: u64,
    /// Who clocked.
    pub employee_id: EmployeeId,
    /// Their display name at the time.
    pub employee_name: String,
    /// The status they moved to.
    pub status: AttendanceStatus,
    /// When it happened.
    pub timestamp: DateTime<Utc>,
    /// Snapshot taken at the kiosk.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<ImageRef>,
}

/// In-memory attendance log, newest first.
#[derive(Debug, Default)]
pub struct AttendanceLog {
    entries: VecDeque<LogEntry>,
    last_id: u64,
}

impl AttendanceLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an entry at the head of the log and return it.
    pub fn append(&mut self, entry: NewLogEntry) -> &LogEntry {
        self.last_id += 1;
        let stored = LogEntry {
            id: self.last_id,
            employee_id: entry.employee_id,
            employee_name: entry.employee_name,
            status: entry.status,
            timestamp: entry.timestamp,
            photo: entry.photo,
        };
        debug!(
            id = stored.id,
            employee = %stored.employee_id,
            status = %stored.status,
            "appended log entry"
        );
        self.entries.push_front(stored);
        &self.entries[0]
    }

    /// Every entry, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> + Clone + '_ {
        self.entries.iter()
    }

    /// One employee's entries, newest first.
    ///
    /// The iterator is lazy and can be cloned to walk it again.
    pub fn entries_for<'a>(
        &'a self,
        employee_id: &'a EmployeeId,
    ) -> impl Iterator<Item = &'a LogEntry> + Clone + 'a {
        self.entries
            .iter()
            .filter(move |entry| &entry.employee_id == employee_id)
    }

    /// The status of the employee's most recent entry, or
    /// [`AttendanceStatus::ClockedOut`] if they have none.
    #[must_use]
    pub fn current_status(&self, employee_id: &EmployeeId) -> AttendanceStatus {
        self.entries_for(employee_id)
            .next()
            .map_or(AttendanceStatus::ClockedOut, |entry| entry.status)
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn id(value: &str) -> EmployeeId {
        EmployeeId::parse(value).unwrap()
    }

    fn entry(employee: &str, status: AttendanceStatus) -> NewLogEntry {
        NewLogEntry {
            employee_id: id(employee),
            employee_name: "Test Person".to_string(),
            status,
            timestamp: Utc::now(),
            photo: None,
        }
    }

    const ALEX: &str = "1234567890123";
    const JANE: &str = "9876543210987";

    #[test]
    fn test_toggled() {
        assert_eq!(
            AttendanceStatus::ClockedOut.toggled(),
            AttendanceStatus::ClockedIn
        );
        assert_eq!(
            AttendanceStatus::ClockedIn.toggled(),
            AttendanceStatus::ClockedOut
        );
    }

    #[test]
    fn test_status_display() {
        assert_eq!(AttendanceStatus::ClockedIn.to_string(), "Clocked In");
        assert_eq!(AttendanceStatus::ClockedOut.to_string(), "Clocked Out");
    }

    #[test]
    fn test_no_entries_means_clocked_out() {
        let log = AttendanceLog::new();
        assert!(log.is_empty());
        assert_eq!(log.current_status(&id(ALEX)), AttendanceStatus::ClockedOut);
        assert_eq!(log.entries_for(&id(ALEX)).count(), 0);
    }

    #[test]
    fn test_append_assigns_increasing_ids() {
        let mut log = AttendanceLog::new();
        let first = log.append(entry(ALEX, AttendanceStatus::ClockedIn)).id;
        let second = log.append(entry(ALEX, AttendanceStatus::ClockedOut)).id;
        assert!(second > first);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_entries_for_is_newest_first_and_filtered() {
        let mut log = AttendanceLog::new();
        log.append(entry(ALEX, AttendanceStatus::ClockedIn));
        log.append(entry(JANE, AttendanceStatus::ClockedIn));
        log.append(entry(ALEX, AttendanceStatus::ClockedOut));

        let alex = id(ALEX);
        let ids: Vec<u64> = log.entries_for(&alex).map(|e| e.id).collect();
        assert_eq!(ids, vec![3, 1]);

        let all: Vec<u64> = log.iter().map(|e| e.id).collect();
        assert_eq!(all, vec![3, 2, 1]);
    }

    #[test]
    fn test_entries_for_is_restartable() {
        let mut log = AttendanceLog::new();
        log.append(entry(ALEX, AttendanceStatus::ClockedIn));
        log.append(entry(ALEX, AttendanceStatus::ClockedOut));

        let alex = id(ALEX);
        let entries = log.entries_for(&alex);
        assert_eq!(entries.clone().count(), 2);
        assert_eq!(entries.count(), 2);
    }

    #[test]
    fn test_status_follows_append_order_not_timestamp() {
        let mut log = AttendanceLog::new();
        let mut late = entry(ALEX, AttendanceStatus::ClockedIn);
        late.timestamp = Utc::now() + Duration::hours(1);
        log.append(late);

        let mut early = entry(ALEX, AttendanceStatus::ClockedOut);
        early.timestamp = Utc::now() - Duration::hours(1);
        log.append(early);

        assert_eq!(log.current_status(&id(ALEX)), AttendanceStatus::ClockedOut);
    }

    #[test]
    fn test_status_tracks_last_append() {
        let mut log = AttendanceLog::new();
        let alex = id(ALEX);
        let sequence = [
            AttendanceStatus::ClockedIn,
            AttendanceStatus::ClockedIn,
            AttendanceStatus::ClockedOut,
            AttendanceStatus::ClockedIn,
        ];
        for status in sequence {
            log.append(entry(ALEX, status));
            assert_eq!(log.current_status(&alex), status);
        }
    }

    #[test]
    fn test_append_never_touches_prior_entries() {
        let mut log = AttendanceLog::new();
        let alex = id(ALEX);
        let first = log.append(entry(ALEX, AttendanceStatus::ClockedIn)).clone();

        let mut previous_len = 1;
        for status in [AttendanceStatus::ClockedOut, AttendanceStatus::ClockedIn] {
            log.append(entry(ALEX, status));
            let len = log.entries_for(&alex).count();
            assert!(len > previous_len);
            previous_len = len;
        }

        let oldest = log.entries_for(&alex).last().unwrap();
        assert_eq!(oldest, &first);
    }

    #[test]
    fn test_other_employees_unaffected() {
        let mut log = AttendanceLog::new();
        log.append(entry(ALEX, AttendanceStatus::ClockedIn));
        assert_eq!(log.current_status(&id(JANE)), AttendanceStatus::ClockedOut);
    }

    #[test]
    fn test_new_log_entry_now_snapshots_name() {
        let employee = Employee::new(
            id(ALEX),
            "Alex",
            "Hartman",
            ImageRef::from_url("x"),
        )
        .unwrap();
        let draft = NewLogEntry::now(&employee, AttendanceStatus::ClockedIn, None);
        assert_eq!(draft.employee_name, "Alex Hartman");
        assert_eq!(draft.employee_id, employee.id);
    }

    #[test]
    fn test_log_entry_serialization_skips_missing_photo() {
        let mut log = AttendanceLog::new();
        let json = serde_json::to_string(log.append(entry(ALEX, AttendanceStatus::ClockedIn)))
            .unwrap();
        assert!(json.contains("\"status\":\"clocked_in\""));
        assert!(!json.contains("photo"));
    }
}
