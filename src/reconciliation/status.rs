//! Day status evaluation.
//!
//! This module assigns the final [`DayStatus`] of an employee/day from its
//! resolved times, permission class and shortfall. It is a pure function of
//! those inputs.

use chrono::NaiveTime;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::config::ScheduleConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{DayStatus, PermissionClass};

/// The resolved facts of one day that decide its status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusInput {
    /// True when either source reported at least one punch.
    pub has_punches: bool,
    /// Time of day of the resolved entry.
    pub entry: Option<NaiveTime>,
    /// Time of day of the resolved exit.
    pub exit: Option<NaiveTime>,
    /// The day's permission class.
    pub permission: PermissionClass,
    /// Unworked minutes against the anchors.
    pub unworked_minutes: i64,
}

/// Minutes of shortfall a permission class excuses.
///
/// The allowance is the standard workday minus the class's expected hours,
/// so a class expecting the full day excuses nothing.
pub fn permission_allowance_minutes(
    class: PermissionClass,
    config: &ScheduleConfig,
) -> EngineResult<i64> {
    if !class.is_active() {
        return Ok(0);
    }
    let excused_hours = (config.standard_workday_hours - config.expected_hours(class)).max(Decimal::ZERO);
    (excused_hours * Decimal::from(60))
        .trunc()
        .to_i64()
        .ok_or_else(|| EngineError::CalculationError {
            message: format!("permission allowance for '{}' does not fit in minutes", class),
        })
}

/// Evaluates the status of a day. The first matching rule wins:
///
/// 1. No entry and no exit: [`DayStatus::NoActivity`] when the day has no
///    punches at all, [`DayStatus::AbsentUnjustified`] otherwise.
/// 2. Entry after the entry anchor without permission: [`DayStatus::Late`].
/// 3. Entry without exit: [`DayStatus::MissingExit`].
/// 4. Exit without entry: [`DayStatus::MissingEntry`].
/// 5. Both present: [`DayStatus::Complete`] when nothing is unworked, or on
///    a permission day when the shortfall is within the class's allowance;
///    otherwise [`DayStatus::Incomplete`].
///
/// # Example
///
/// ```
/// use attendance_engine::config::ScheduleConfig;
/// use attendance_engine::models::{DayStatus, PermissionClass};
/// use attendance_engine::reconciliation::{StatusInput, evaluate_status};
/// use chrono::NaiveTime;
///
/// let input = StatusInput {
///     has_punches: true,
///     entry: NaiveTime::from_hms_opt(8, 55, 0),
///     exit: NaiveTime::from_hms_opt(17, 0, 0),
///     permission: PermissionClass::None,
///     unworked_minutes: 15,
/// };
/// let status = evaluate_status(&input, &ScheduleConfig::default()).unwrap();
/// assert_eq!(status, DayStatus::Late);
/// ```
pub fn evaluate_status(input: &StatusInput, config: &ScheduleConfig) -> EngineResult<DayStatus> {
    let status = match (input.entry, input.exit) {
        (None, None) if input.has_punches => DayStatus::AbsentUnjustified,
        (None, None) => DayStatus::NoActivity,
        (Some(entry), _) if entry > config.entry_anchor() && !input.permission.is_active() => {
            DayStatus::Late
        }
        (Some(_), None) => DayStatus::MissingExit,
        (None, Some(_)) => DayStatus::MissingEntry,
        (Some(_), Some(_)) => {
            let allowance = permission_allowance_minutes(input.permission, config)?;
            if input.unworked_minutes == 0
                || (input.permission.is_active() && input.unworked_minutes <= allowance)
            {
                DayStatus::Complete
            } else {
                DayStatus::Incomplete
            }
        }
    };
    Ok(status)
}
