//! Shortfall calculation.
//!
//! This module measures how much of the scheduled day an employee did not
//! work, relative to the entry and exit anchors.

use chrono::NaiveTime;

use crate::config::ScheduleConfig;

/// The unworked time of a day, split by cause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShortfallResult {
    /// Whole minutes arrived after the entry anchor.
    pub late_minutes: i64,
    /// Whole minutes left before the exit anchor.
    pub early_minutes: i64,
    /// `late_minutes + early_minutes`; never negative.
    pub unworked_minutes: i64,
}

fn minutes_between(earlier: NaiveTime, later: NaiveTime) -> i64 {
    (later - earlier).num_minutes().max(0)
}

/// Calculates the unworked time of a day from its resolved entry and exit.
///
/// Entries after the entry anchor count the minutes late; exits before the
/// exit anchor count the minutes early. A missing time contributes nothing,
/// and an on-time day with both times yields zero.
///
/// # Example
///
/// ```
/// use attendance_engine::config::ScheduleConfig;
/// use attendance_engine::reconciliation::calculate_shortfall;
/// use chrono::NaiveTime;
///
/// let config = ScheduleConfig::default();
/// let entry = NaiveTime::from_hms_opt(8, 30, 0);
/// let exit = NaiveTime::from_hms_opt(11, 30, 0);
///
/// let shortfall = calculate_shortfall(entry, exit, &config);
/// assert_eq!(shortfall.late_minutes, 0);
/// assert_eq!(shortfall.early_minutes, 330);
/// assert_eq!(shortfall.unworked_minutes, 330);
/// ```
pub fn calculate_shortfall(
    entry: Option<NaiveTime>,
    exit: Option<NaiveTime>,
    config: &ScheduleConfig,
) -> ShortfallResult {
    let late_minutes = entry
        .map(|entry| minutes_between(config.entry_anchor(), entry))
        .unwrap_or(0);
    let early_minutes = exit
        .map(|exit| minutes_between(exit, config.exit_anchor))
        .unwrap_or(0);

    ShortfallResult {
        late_minutes,
        early_minutes,
        unworked_minutes: late_minutes + early_minutes,
    }
}
