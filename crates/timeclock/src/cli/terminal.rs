//! Line-oriented kiosk front end used by `timeclock run`.
//!
//! Each input line is one command. After every command that changes the
//! screen, the current view is printed again.

use std::io::Write;

use chrono::Local;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use super::present::{self, PROFILE_PROMPT};
use crate::employee::EmployeeId;
use crate::error::Result;
use crate::kiosk::Kiosk;
use crate::session::View;

const HELP: &str = "\
Commands:
  list                 Show registered employees
  select <id>          Start a session for an employee
  clock                Clock in or out (opens the camera)
  capture              Take the photo for the open camera
  cancel               Close the camera without a photo
  log [--json]         Show the active employee's activity
  status               Show the current screen
  logout               End the session
  admin                Enter or leave the admin panel
  first <name>         Admin: set first name
  last <name>          Admin: set last name
  id <digits>          Admin: set employee ID
  camera               Admin: open the camera for a profile photo
  add                  Admin: register the employee
  quit                 Exit";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Print the command list.
    Help,
    /// List employees.
    List,
    /// Select an employee by ID.
    Select(String),
    /// Start a clock action.
    Clock,
    /// Confirm the open camera.
    Capture,
    /// Close the open camera.
    Cancel,
    /// Print the activity log.
    Log {
        /// Dump as JSON.
        json: bool,
    },
    /// Print the current screen.
    Status,
    /// End the session.
    Logout,
    /// Toggle the admin panel.
    Admin,
    /// Set the form's first name.
    First(String),
    /// Set the form's last name.
    Last(String),
    /// Set the form's ID.
    Id(String),
    /// Open the profile camera.
    Camera,
    /// Submit the form.
    Add,
    /// Leave the kiosk.
    Quit,
}

impl Input {
    /// Parse one line. A blank line re-prints the screen.
    ///
    /// # Errors
    ///
    /// Returns a message for unknown commands and missing arguments.
    pub fn parse(line: &str) -> std::result::Result<Self, String> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(word, rest)| (word, rest.trim()));
        let required = |name: &str| {
            if rest.is_empty() {
                Err(format!("usage: {word} <{name}>"))
            } else {
                Ok(rest.to_string())
            }
        };

        match word.to_ascii_lowercase().as_str() {
            "" | "status" => Ok(Self::Status),
            "help" | "?" => Ok(Self::Help),
            "list" | "ls" => Ok(Self::List),
            "select" => required("id").map(Self::Select),
            "clock" => Ok(Self::Clock),
            "capture" | "snap" => Ok(Self::Capture),
            "cancel" => Ok(Self::Cancel),
            "log" => Ok(Self::Log {
                json: rest == "--json",
            }),
            "logout" => Ok(Self::Logout),
            "admin" => Ok(Self::Admin),
            "first" => required("name").map(Self::First),
            "last" => required("name").map(Self::Last),
            "id" => required("digits").map(Self::Id),
            "camera" => Ok(Self::Camera),
            "add" => Ok(Self::Add),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command '{other}', type 'help'")),
        }
    }
}

/// Drive `kiosk` from `input` until it ends or `quit` is entered.
///
/// Command failures are printed and the loop continues. Cameras are released
/// before returning.
///
/// # Errors
///
/// Returns an error only if reading input or writing output fails.
pub async fn run<R, W>(kiosk: &mut Kiosk, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    render(kiosk, out)?;
    let mut lines = input.lines();

    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = match Input::parse(&line) {
            Ok(Input::Quit) => break,
            Ok(command) => command,
            Err(message) => {
                writeln!(out, "{message}")?;
                continue;
            }
        };
        debug!(?command, "terminal command");

        if let Err(err) = dispatch(kiosk, command, out).await {
            warn!(error = %err, "command failed");
            let message = err.user_message().unwrap_or_else(|| err.to_string());
            writeln!(out, "! {message}")?;
        }
    }

    kiosk.logout();
    writeln!(out, "Goodbye.")?;
    Ok(())
}

async fn dispatch<W: Write>(kiosk: &mut Kiosk, command: Input, out: &mut W) -> Result<()> {
    match command {
        Input::Help => writeln!(out, "{HELP}")?,
        Input::List => write_employees(kiosk, out)?,
        Input::Status => render(kiosk, out)?,
        Input::Select(raw) => {
            let id = EmployeeId::parse(raw)?;
            kiosk.select_employee(&id)?;
            render(kiosk, out)?;
        }
        Input::Logout => {
            kiosk.logout();
            render(kiosk, out)?;
        }
        Input::Admin => {
            kiosk.toggle_admin();
            render(kiosk, out)?;
        }
        Input::Clock => {
            let pending = kiosk.trigger_clock_action().await?;
            let prompt = present::capture_prompt(pending);
            writeln!(out, "[{}] camera: {}", prompt.title, kiosk.camera_name())?;
            writeln!(out, "Type 'capture' to {}, or 'cancel'.", prompt.button)?;
        }
        Input::Capture if kiosk.view() == View::Admin => {
            kiosk.capture_profile_photo().await?;
            writeln!(out, "Profile photo set.")?;
        }
        Input::Capture => {
            writeln!(out, "{}", present::PROCESSING_LABEL)?;
            out.flush()?;
            let entry = kiosk.confirm_capture().await?;
            writeln!(out, "{}", present::format_log_entry(&entry))?;
            render(kiosk, out)?;
        }
        Input::Cancel if kiosk.view() == View::Admin => kiosk.close_profile_camera(),
        Input::Cancel => {
            if kiosk.cancel_capture() {
                writeln!(out, "Capture cancelled.")?;
            }
        }
        Input::Log { json } => write_log(kiosk, json, out)?,
        Input::First(_) | Input::Last(_) | Input::Id(_) | Input::Camera | Input::Add
            if kiosk.view() != View::Admin =>
        {
            writeln!(out, "Open the admin panel first ('admin').")?;
        }
        Input::First(name) => kiosk.registration_form_mut().first_name = name,
        Input::Last(name) => kiosk.registration_form_mut().last_name = name,
        Input::Id(digits) => {
            if !kiosk.registration_form_mut().set_id_input(&digits) {
                writeln!(out, "Employee ID accepts up to 13 digits.")?;
            }
        }
        Input::Camera => {
            kiosk.open_profile_camera().await?;
            writeln!(out, "[{}] camera: {}", PROFILE_PROMPT.title, kiosk.camera_name())?;
            writeln!(out, "Type 'capture' to {}, or 'cancel'.", PROFILE_PROMPT.button)?;
        }
        Input::Add => {
            let employee = kiosk.add_employee()?;
            writeln!(
                out,
                "Added {} ({}).",
                employee.display_name(),
                employee.id
            )?;
        }
        Input::Quit => {}
    }
    Ok(())
}

fn render<W: Write>(kiosk: &Kiosk, out: &mut W) -> Result<()> {
    match kiosk.view() {
        View::Selection => {
            writeln!(out, "Select your profile ('select <id>'):")?;
            write_employees(kiosk, out)?;
        }
        View::Clock => {
            if let (Some(employee), Some(status)) =
                (kiosk.active_employee(), kiosk.current_status())
            {
                let shown = present::status_presentation(status);
                writeln!(out, "{}", present::format_clock(&Local::now()))?;
                writeln!(out, "{} ({})", employee.display_name(), employee.id)?;
                writeln!(out, "{}: {}", shown.label, shown.message)?;
                let action = if kiosk.action_enabled() {
                    shown.action_label
                } else {
                    present::PROCESSING_LABEL
                };
                writeln!(out, "[{action}] type 'clock'")?;
            }
        }
        View::Admin => {
            let form = kiosk.admin().form();
            writeln!(out, "Admin: register employee")?;
            writeln!(out, "  first:  {}", form.first_name)?;
            writeln!(out, "  last:   {}", form.last_name)?;
            writeln!(out, "  id:     {}", form.id_input())?;
            let photo = if form.photo.is_some() { "captured" } else { "none" };
            writeln!(out, "  photo:  {photo}")?;
            writeln!(out, "Registered employees:")?;
            write_employees(kiosk, out)?;
        }
    }
    Ok(())
}

fn write_employees<W: Write>(kiosk: &Kiosk, out: &mut W) -> Result<()> {
    if kiosk.employees().is_empty() {
        writeln!(out, "  (no employees registered)")?;
    }
    for employee in kiosk.employees() {
        let status = present::status_presentation(kiosk.status_of(&employee.id));
        writeln!(
            out,
            "  {}  {:<24} {}",
            employee.id,
            employee.display_name(),
            status.label
        )?;
    }
    Ok(())
}

fn write_log<W: Write>(kiosk: &Kiosk, json: bool, out: &mut W) -> Result<()> {
    if json {
        let entries: Vec<_> = kiosk.activity_log().collect();
        writeln!(out, "{}", serde_json::to_string_pretty(&entries)?)?;
        return Ok(());
    }
    if kiosk.activity_log().next().is_none() {
        writeln!(out, "No activity recorded yet.")?;
    }
    for entry in kiosk.activity_log() {
        writeln!(out, "  {}", present::format_log_entry(entry))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    use crate::camera::TestPatternCamera;
    use crate::config::Config;

    fn test_kiosk() -> Kiosk {
        let mut config = Config::default();
        config.camera.width = 16;
        config.camera.height = 12;
        config.clock.processing_delay_ms = 0;
        Kiosk::new(&config, Box::new(TestPatternCamera::new())).unwrap()
    }

    async fn drive(kiosk: &mut Kiosk, script: &str) -> String {
        let mut out = Vec::new();
        run(kiosk, script.as_bytes(), &mut out).await.unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Input::parse(""), Ok(Input::Status));
        assert_eq!(Input::parse("  LIST "), Ok(Input::List));
        assert_eq!(
            Input::parse("select 1234567890123"),
            Ok(Input::Select("1234567890123".to_string()))
        );
        assert_eq!(Input::parse("log --json"), Ok(Input::Log { json: true }));
        assert_eq!(Input::parse("log"), Ok(Input::Log { json: false }));
        assert_eq!(
            Input::parse("first Mary Ann"),
            Ok(Input::First("Mary Ann".to_string()))
        );
        assert_eq!(Input::parse("exit"), Ok(Input::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Input::parse("select"), Err("usage: select <id>".to_string()));
        assert!(Input::parse("dance").unwrap_err().contains("unknown command"));
    }

    #[tokio::test]
    async fn test_clock_in_session() {
        let mut kiosk = test_kiosk();
        let output = drive(&mut kiosk, "select 1234567890123\nclock\ncapture\nlog\nquit\n").await;

        assert!(output.contains("Alex Hartman"));
        assert!(output.contains("Clock In: Photo Capture"));
        assert!(output.contains("Processing..."));
        assert!(output.contains("You are currently clocked in"));
        assert!(output.contains("[Clock Out]"));
        assert!(output.contains("Goodbye."));
        assert_eq!(kiosk.log().len(), 1);
        assert_eq!(kiosk.view(), View::Selection);
    }

    #[tokio::test]
    async fn test_errors_are_reported_and_loop_continues() {
        let mut kiosk = test_kiosk();
        let output = drive(&mut kiosk, "clock\nselect 42\nselect 0000000000000\nhop\n").await;

        assert!(output.contains("! no employee is selected"));
        assert!(output.contains("13 digits"));
        assert!(output.contains("no employee is registered"));
        assert!(output.contains("unknown command 'hop'"));
        assert!(output.contains("Goodbye."));
    }

    #[tokio::test]
    async fn test_cancel_logs_nothing() {
        let mut kiosk = test_kiosk();
        let output = drive(&mut kiosk, "select 9876543210987\nclock\ncancel\nlog\n").await;

        assert!(output.contains("Capture cancelled."));
        assert!(output.contains("No activity recorded yet."));
        assert!(kiosk.log().is_empty());
    }

    #[tokio::test]
    async fn test_admin_registration() {
        let mut kiosk = test_kiosk();
        let script = "admin\nfirst Somchai\nlast Jaidee\nid 12ab\nid 1112223334445\ncamera\ncapture\nadd\nadmin\nlist\n";
        let output = drive(&mut kiosk, script).await;

        assert!(output.contains("Employee ID accepts up to 13 digits."));
        assert!(output.contains("Capture Employee Photo"));
        assert!(output.contains("Profile photo set."));
        assert!(output.contains("Added Somchai Jaidee (1112223334445)."));
        assert_eq!(kiosk.employees().len(), 3);
    }

    #[tokio::test]
    async fn test_clock_screen_shows_date() {
        let mut kiosk = test_kiosk();
        let output = drive(&mut kiosk, "select 1234567890123\n").await;
        let year = Local::now().year().to_string();
        assert!(output
            .lines()
            .any(|line| line.contains(&year) && line.ends_with('M')));
    }

    #[tokio::test]
    async fn test_admin_screen_lists_employees() {
        let mut kiosk = test_kiosk();
        let output = drive(&mut kiosk, "admin\n").await;
        let admin = output.split("Admin: register employee").nth(1).unwrap();
        assert!(admin.contains("Registered employees:"));
        assert!(admin.contains("Alex Hartman"));
        assert!(admin.contains("Jane Doe"));
    }

    #[tokio::test]
    async fn test_clock_refused_from_admin_screen() {
        let mut kiosk = test_kiosk();
        let output = drive(
            &mut kiosk,
            "select 1234567890123\nadmin\nclock\ncamera\ncancel\ncamera\ncapture\n",
        )
        .await;
        assert!(output.contains("! clock actions are only available on the clock screen"));
        assert!(!output.contains("camera device is busy"));
        assert!(output.contains("Profile photo set."));
        assert!(kiosk.log().is_empty());
    }

    #[tokio::test]
    async fn test_form_commands_need_admin() {
        let mut kiosk = test_kiosk();
        let output = drive(&mut kiosk, "first Somchai\n").await;
        assert!(output.contains("Open the admin panel first"));
        assert!(kiosk.admin().form().first_name.is_empty());
    }

    #[tokio::test]
    async fn test_log_json() {
        let mut kiosk = test_kiosk();
        let output = drive(&mut kiosk, "select 1234567890123\nclock\ncapture\nlog --json\n").await;
        assert!(output.contains("\"status\": \"clocked_in\""));
        assert!(output.contains("\"employee_name\": \"Alex Hartman\""));
    }
}
