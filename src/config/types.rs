//! Configuration types for attendance reconciliation.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::{Duration, NaiveTime, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::PermissionClass;

/// The half-open time-of-day window in which punches count as lunch movements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LunchWindow {
    /// First time-of-day inside the window.
    pub start: NaiveTime,
    /// First time-of-day after the window.
    pub end: NaiveTime,
}

impl LunchWindow {
    /// Checks if a time-of-day falls inside `[start, end)`.
    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.start && time < self.end
    }
}

/// One row of the ordered permission keyword table.
///
/// A label matches when it contains every keyword (case- and
/// accent-insensitive).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRule {
    /// The class assigned on match.
    pub class: PermissionClass,
    /// Keywords that must all appear in the label.
    pub keywords: Vec<String>,
    /// Expected worked hours on a day with this permission.
    pub expected_hours: Decimal,
}

impl PermissionRule {
    fn new(class: PermissionClass, keywords: &[&str]) -> Self {
        Self {
            class,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            expected_hours: class.default_expected_hours().unwrap_or(Decimal::from(8)),
        }
    }
}

/// Schedule section as stored in `schedule.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleFile {
    /// Nominal start of the workday.
    pub nominal_entry: NaiveTime,
    /// Grace period after the nominal entry, in minutes.
    pub entry_tolerance_minutes: u32,
    /// End of the workday.
    pub exit_anchor: NaiveTime,
    /// Lunch window.
    pub lunch_window: LunchWindow,
    /// Expected worked hours on a regular day.
    pub standard_workday_hours: Decimal,
    /// Days on which employees are expected to punch.
    pub workdays: Vec<Weekday>,
}

/// Permission table as stored in `permissions.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PermissionsFile {
    /// Rules evaluated in order until the first match.
    pub permissions: Vec<PermissionRule>,
}

/// Every business constant the reconciliation rules depend on.
///
/// # Example
///
/// ```
/// use attendance_engine::config::ScheduleConfig;
/// use chrono::NaiveTime;
///
/// let config = ScheduleConfig::default();
/// assert_eq!(config.entry_anchor(), NaiveTime::from_hms_opt(8, 40, 0).unwrap());
/// assert!(config.lunch_window.contains(NaiveTime::from_hms_opt(12, 30, 0).unwrap()));
/// assert!(!config.lunch_window.contains(NaiveTime::from_hms_opt(15, 0, 0).unwrap()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Nominal start of the workday (08:30).
    pub nominal_entry: NaiveTime,
    /// Grace period after the nominal entry, in minutes (10).
    pub entry_tolerance_minutes: u32,
    /// End of the workday (17:00).
    pub exit_anchor: NaiveTime,
    /// Lunch window (`[12:30, 15:00)`).
    pub lunch_window: LunchWindow,
    /// Expected worked hours on a day without permission (8).
    pub standard_workday_hours: Decimal,
    /// Days on which a missing punch yields a `NoActivity` record (Mon–Fri).
    pub workdays: Vec<Weekday>,
    /// Ordered permission keyword table.
    pub permissions: Vec<PermissionRule>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            nominal_entry: NaiveTime::from_hms_opt(8, 30, 0).unwrap_or(NaiveTime::MIN),
            entry_tolerance_minutes: 10,
            exit_anchor: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
            lunch_window: LunchWindow {
                start: NaiveTime::from_hms_opt(12, 30, 0).unwrap_or(NaiveTime::MIN),
                end: NaiveTime::from_hms_opt(15, 0, 0).unwrap_or(NaiveTime::MIN),
            },
            standard_workday_hours: Decimal::from(8),
            workdays: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            permissions: default_permission_rules(),
        }
    }
}

/// The built-in keyword table, in evaluation order.
pub fn default_permission_rules() -> Vec<PermissionRule> {
    vec![
        PermissionRule::new(PermissionClass::OfficialDuty, &["oficial"]),
        PermissionRule::new(PermissionClass::PersonalMatter, &["asuntos", "personales"]),
        PermissionRule::new(PermissionClass::Calamity, &["calamidad"]),
        PermissionRule::new(PermissionClass::Illness, &["enfermedad"]),
        PermissionRule::new(PermissionClass::MedicalAppointment, &["cita", "medica"]),
        PermissionRule::new(PermissionClass::Rehabilitation, &["rehabilitacion"]),
    ]
}

impl ScheduleConfig {
    /// Builds a configuration from the two YAML sections.
    pub fn from_files(schedule: ScheduleFile, permissions: PermissionsFile) -> Self {
        Self {
            nominal_entry: schedule.nominal_entry,
            entry_tolerance_minutes: schedule.entry_tolerance_minutes,
            exit_anchor: schedule.exit_anchor,
            lunch_window: schedule.lunch_window,
            standard_workday_hours: schedule.standard_workday_hours,
            workdays: schedule.workdays,
            permissions: permissions.permissions,
        }
    }

    /// Nominal entry plus tolerance (08:40 by default).
    ///
    /// Serves both as the lateness threshold and as the entry anchor of
    /// the shortfall computation.
    pub fn entry_anchor(&self) -> NaiveTime {
        self.nominal_entry + Duration::minutes(i64::from(self.entry_tolerance_minutes))
    }

    /// Returns true when the weekday is a configured workday.
    pub fn is_workday(&self, weekday: Weekday) -> bool {
        self.workdays.contains(&weekday)
    }

    /// Expected worked hours under a permission class.
    pub fn expected_hours(&self, class: PermissionClass) -> Decimal {
        if !class.is_active() {
            return self.standard_workday_hours;
        }
        self.permissions
            .iter()
            .find(|rule| rule.class == class)
            .map(|rule| rule.expected_hours)
            .or_else(|| class.default_expected_hours())
            .unwrap_or(self.standard_workday_hours)
    }

    /// Checks the configuration for internally inconsistent values.
    pub fn validate(&self) -> EngineResult<()> {
        if self.lunch_window.start >= self.lunch_window.end {
            return Err(invalid("lunch_window", "start must precede end"));
        }

        // NaiveTime addition wraps around midnight.
        let anchor = self.entry_anchor();
        if anchor < self.nominal_entry || anchor >= self.exit_anchor {
            return Err(invalid(
                "entry_tolerance_minutes",
                "nominal entry plus tolerance must fall before the exit anchor",
            ));
        }

        if self.standard_workday_hours <= Decimal::ZERO {
            return Err(invalid("standard_workday_hours", "must be positive"));
        }

        for rule in &self.permissions {
            if !rule.class.is_active() {
                return Err(invalid("permissions", "a rule cannot map to class 'none'"));
            }
            if rule.keywords.is_empty() || rule.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(invalid(
                    "permissions",
                    &format!("rule for '{}' needs non-blank keywords", rule.class),
                ));
            }
            if rule.expected_hours <= Decimal::ZERO
                || rule.expected_hours > self.standard_workday_hours
            {
                return Err(invalid(
                    "permissions",
                    &format!(
                        "expected hours for '{}' must be within (0, {}]",
                        rule.class, self.standard_workday_hours
                    ),
                ));
            }
        }

        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> EngineError {
    EngineError::InvalidConfig {
        field: field.to_string(),
        message: message.to_string(),
    }
}
