//! Which screen the kiosk shows and who is using it.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::employee::Employee;

/// Kiosk screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// Profile picker.
    #[default]
    Selection,
    /// Clock in/out for the active employee.
    Clock,
    /// Employee registration.
    Admin,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Selection => write!(f, "selection"),
            Self::Clock => write!(f, "clock"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

/// The active session subject and screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// The employee using the kiosk, if any.
    pub active_employee: Option<Employee>,
    /// The screen being shown.
    pub view: View,
}

/// Owns the [`Session`] and applies navigation actions to it.
#[derive(Debug, Default)]
pub struct SessionController {
    session: Session,
}

impl SessionController {
    /// Start at the profile picker with nobody selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current session state.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Current screen.
    #[must_use]
    pub fn view(&self) -> View {
        self.session.view
    }

    /// The employee using the kiosk, if any.
    #[must_use]
    pub fn active_employee(&self) -> Option<&Employee> {
        self.session.active_employee.as_ref()
    }

    /// Make `employee` the session subject and show the clock.
    pub fn select_employee(&mut self, employee: Employee) {
        debug!(id = %employee.id, "employee selected");
        self.session.active_employee = Some(employee);
        self.session.view = View::Clock;
    }

    /// Clear the session subject and return to the profile picker.
    pub fn logout(&mut self) {
        if let Some(employee) = self.session.active_employee.take() {
            debug!(id = %employee.id, "employee logged out");
        }
        self.session.view = View::Selection;
    }

    /// Enter or leave the admin screen. Leaving returns to the clock when
    /// someone is selected, otherwise to the picker.
    pub fn toggle_admin(&mut self) -> View {
        self.session.view = match self.session.view {
            View::Admin if self.session.active_employee.is_some() => View::Clock,
            View::Admin => View::Selection,
            View::Selection | View::Clock => View::Admin,
        };
        debug!(view = %self.session.view, "view toggled");
        self.session.view
    }
}
