//! Report request and result models.
//!
//! This module contains the [`ReportRequest`] accepted by the report
//! assembler and the [`ConsolidatedReport`] it returns, along with the
//! warnings collected while building it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ConsolidatedDayRecord, ExportRow, ReportRange};

/// Parameters of one report generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRequest {
    /// The calendar days to cover.
    pub range: ReportRange,
    /// Restricts the report to one employee, matched on the normalized
    /// terminal or biometric identity.
    pub employee_filter: Option<String>,
}

impl ReportRequest {
    /// A request for every employee in the range.
    pub fn new(range: ReportRange) -> Self {
        Self {
            range,
            employee_filter: None,
        }
    }

    /// Restricts the request to the named employee.
    pub fn for_employee(mut self, name: impl Into<String>) -> Self {
        self.employee_filter = Some(name.into());
        self
    }
}

/// Identifies the kind of anomaly a warning describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningCode {
    /// A punch with an empty name or unusable timestamp was dropped.
    MalformedPunch,
    /// A punch fell outside the report's UTC window and was ignored.
    PunchOutsideRange,
    /// An identity match was decided by first-seen order among equal scores.
    LowConfidenceMatch,
    /// A lunch-window punch beyond the second was ignored.
    ExtraLunchPunch,
    /// A punch carried several role flags and was treated as unhinted.
    AmbiguousHint,
    /// A lone exit hint was reclassified as entry.
    LoneExitReclassified,
    /// Evaluating one employee/day failed; the day was skipped.
    DayEvaluationFailed,
}

/// How much attention a warning deserves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Informational.
    Low,
    /// Data was discarded or reinterpreted.
    Medium,
    /// Output for an employee/day is missing.
    High,
}

/// A non-fatal anomaly observed while generating a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportWarning {
    /// The kind of anomaly.
    pub code: WarningCode,
    /// How serious it is.
    pub severity: Severity,
    /// The employee concerned, when known.
    pub employee: Option<String>,
    /// The day concerned, when known.
    pub date: Option<NaiveDate>,
    /// Human-readable description.
    pub message: String,
}

impl ReportWarning {
    /// Creates a warning not tied to an employee or day.
    pub fn new(code: WarningCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            employee: None,
            date: None,
            message: message.into(),
        }
    }

    /// Attaches the employee/day the warning is about.
    pub fn on_day(mut self, employee: impl Into<String>, date: NaiveDate) -> Self {
        self.employee = Some(employee.into());
        self.date = Some(date);
        self
    }
}

/// The result of a report generation.
///
/// Records are ordered by display name then date. Both lists are a pure
/// function of the input punches and configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsolidatedReport {
    /// One record per employee/day.
    pub records: Vec<ConsolidatedDayRecord>,
    /// Anomalies encountered along the way.
    pub warnings: Vec<ReportWarning>,
}

impl ConsolidatedReport {
    /// Projects every record into an [`ExportRow`].
    pub fn export_rows(&self) -> Vec<ExportRow> {
        self.records.iter().map(ExportRow::from).collect()
    }
}
