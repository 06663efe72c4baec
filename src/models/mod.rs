//! Core data models for the Attendance Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod day_group;
mod permission;
mod punch;
mod record;
mod report;
mod report_range;

pub use day_group::{DayPunchGroup, Employee, EmployeeKey};
pub use permission::PermissionClass;
pub use punch::{RawPunch, RawPunchRecord, Role, RoleHints, Source, parse_timestamp};
pub use record::{
    ConsolidatedDayRecord, DayStatus, ExportRow, WITH_PERMISSION_SUFFIX, format_minutes,
};
pub use report::{ConsolidatedReport, ReportRequest, ReportWarning, Severity, WarningCode};
pub use report_range::ReportRange;
