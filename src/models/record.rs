//! Consolidated attendance record models.
//!
//! This module contains the [`ConsolidatedDayRecord`] produced for every
//! employee/day of a report, its [`DayStatus`], and the [`ExportRow`]
//! projection handed to tabular exporters.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{PermissionClass, Role};

/// The final human-meaningful status of an employee/day.
///
/// # Example
///
/// ```
/// use attendance_engine::models::{DayStatus, PermissionClass};
///
/// assert_eq!(DayStatus::Incomplete.label(PermissionClass::None), "Incomplete");
/// assert_eq!(
///     DayStatus::Incomplete.label(PermissionClass::MedicalAppointment),
///     "Incomplete (with permission)"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// Neither source reported anything for the day.
    NoActivity,
    /// Punches exist but no entry or exit could be resolved.
    AbsentUnjustified,
    /// Arrived after the entry tolerance without a permission.
    Late,
    /// Entry resolved, exit missing.
    MissingExit,
    /// Exit resolved, entry missing.
    MissingEntry,
    /// Entry and exit resolved with no shortfall beyond what policy allows.
    Complete,
    /// Entry and exit resolved with an unexcused shortfall.
    Incomplete,
}

/// Suffix appended to complete/incomplete statuses on permission days.
pub const WITH_PERMISSION_SUFFIX: &str = " (with permission)";

impl DayStatus {
    /// Renders the status, adding the permission suffix where it applies.
    pub fn label(&self, permission: PermissionClass) -> String {
        match self {
            DayStatus::Complete | DayStatus::Incomplete if permission.is_active() => {
                format!("{}{}", self, WITH_PERMISSION_SUFFIX)
            }
            _ => self.to_string(),
        }
    }
}

impl std::fmt::Display for DayStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DayStatus::NoActivity => "No Activity",
            DayStatus::AbsentUnjustified => "Absent (Unjustified)",
            DayStatus::Late => "Late",
            DayStatus::MissingExit => "Missing Exit",
            DayStatus::MissingEntry => "Missing Entry",
            DayStatus::Complete => "Complete",
            DayStatus::Incomplete => "Incomplete",
        };
        write!(f, "{}", label)
    }
}

/// One unified attendance record for an employee on a day.
///
/// Created fresh per report and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedDayRecord {
    /// Name shown in reports.
    pub employee_display_name: String,
    /// Organizational area, when the terminal source provided one.
    pub area: Option<String>,
    /// The UTC calendar date of the record.
    pub date: NaiveDate,
    /// Resolved entry.
    pub entry_time: Option<DateTime<Utc>>,
    /// Resolved departure for lunch.
    pub lunch_out_time: Option<DateTime<Utc>>,
    /// Resolved return from lunch.
    pub lunch_in_time: Option<DateTime<Utc>>,
    /// Resolved exit.
    pub exit_time: Option<DateTime<Utc>>,
    /// Provenance tags (`"<Role>: <Source>"`) in role order.
    pub sources_used: Vec<String>,
    /// The permission class active for the day.
    pub permission_class: PermissionClass,
    /// The free-text label the class was derived from.
    pub permission_label: Option<String>,
    /// Unworked time relative to the schedule anchors, in whole minutes.
    pub unworked_minutes: i64,
    /// The final status.
    pub status: DayStatus,
}

impl ConsolidatedDayRecord {
    /// Returns the resolved time for a role.
    pub fn time_for(&self, role: Role) -> Option<DateTime<Utc>> {
        match role {
            Role::Entry => self.entry_time,
            Role::LunchOut => self.lunch_out_time,
            Role::LunchIn => self.lunch_in_time,
            Role::Exit => self.exit_time,
        }
    }

    /// The unworked duration.
    pub fn unworked(&self) -> Duration {
        Duration::minutes(self.unworked_minutes)
    }

    /// The unworked duration in hours.
    ///
    /// # Example
    ///
    /// ```
    /// use attendance_engine::models::{ConsolidatedDayRecord, DayStatus, PermissionClass};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let record = ConsolidatedDayRecord {
    ///     employee_display_name: "Perez Ana".to_string(),
    ///     area: None,
    ///     date: NaiveDate::from_ymd_opt(2025, 8, 18).unwrap(),
    ///     entry_time: None,
    ///     lunch_out_time: None,
    ///     lunch_in_time: None,
    ///     exit_time: None,
    ///     sources_used: vec![],
    ///     permission_class: PermissionClass::None,
    ///     permission_label: None,
    ///     unworked_minutes: 90,
    ///     status: DayStatus::Incomplete,
    /// };
    /// assert_eq!(record.unworked_hours(), Decimal::new(15, 1)); // 1.5 hours
    /// ```
    pub fn unworked_hours(&self) -> Decimal {
        Decimal::new(self.unworked_minutes, 0) / Decimal::new(60, 0)
    }

    /// The status rendered with the permission suffix where it applies.
    pub fn status_label(&self) -> String {
        self.status.label(self.permission_class)
    }
}

/// A record flattened to display strings for tabular export.
///
/// Dates render as `dd/MM/yyyy`, times and the shortfall as `HH:mm`; missing
/// values render as empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRow {
    /// Employee display name.
    pub employee: String,
    /// Area, or empty.
    pub area: String,
    /// `dd/MM/yyyy`.
    pub date: String,
    /// `HH:mm` or empty.
    pub entry: String,
    /// `HH:mm` or empty.
    pub lunch_out: String,
    /// `HH:mm` or empty.
    pub lunch_in: String,
    /// `HH:mm` or empty.
    pub exit: String,
    /// Status label including the permission suffix.
    pub status: String,
    /// Provenance tags joined with `", "`.
    pub sources: String,
    /// Permission class label, or empty for no permission.
    pub permission: String,
    /// Unworked duration as `HH:mm`.
    pub unworked: String,
}

impl ExportRow {
    /// Column headers matching the field order.
    pub const HEADERS: [&'static str; 11] = [
        "Employee",
        "Area",
        "Date",
        "Entry",
        "Lunch Out",
        "Lunch In",
        "Exit",
        "Status",
        "Sources",
        "Permission",
        "Unworked",
    ];
}

fn format_clock(time: Option<DateTime<Utc>>) -> String {
    time.map(|t| t.format("%H:%M").to_string())
        .unwrap_or_default()
}

/// Renders a minute count as `HH:mm`.
pub fn format_minutes(minutes: i64) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

impl From<&ConsolidatedDayRecord> for ExportRow {
    fn from(record: &ConsolidatedDayRecord) -> Self {
        ExportRow {
            employee: record.employee_display_name.clone(),
            area: record.area.clone().unwrap_or_default(),
            date: record.date.format("%d/%m/%Y").to_string(),
            entry: format_clock(record.entry_time),
            lunch_out: format_clock(record.lunch_out_time),
            lunch_in: format_clock(record.lunch_in_time),
            exit: format_clock(record.exit_time),
            status: record.status_label(),
            sources: record.sources_used.join(", "),
            permission: if record.permission_class.is_active() {
                record.permission_class.to_string()
            } else {
                String::new()
            },
            unworked: format_minutes(record.unworked_minutes),
        }
    }
}
