//! Event classification.
//!
//! This module assigns each punch of a [`DayPunchGroup`] a semantic
//! [`Role`]. The rules run over the day's punches from both sources merged
//! in chronological order; each punch keeps its source for arbitration.
//!
//! In priority order:
//!
//! 1. A punch with an unambiguous hint keeps the hinted role, except that
//!    inside the lunch window an entry hint becomes lunch-in and an exit
//!    hint becomes lunch-out.
//! 2. Unhinted lunch-window punches fill the lunch roles no hint claimed,
//!    lunch-out first, then lunch-in; further ones are ignored.
//! 3. Unhinted punches outside the lunch window: with two or more, the first
//!    is entry and the last is exit; a single one is entry.
//!
//! A lone non-lunch punch never stays an exit.

use chrono::{DateTime, Utc};

use crate::config::LunchWindow;
use crate::models::{DayPunchGroup, RawPunch, ReportWarning, Role, Severity, Source, WarningCode};

use super::name_normalizer::normalize_name;

/// Where a punch's role came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleOrigin {
    /// An explicit role flag set by the source.
    Hint,
    /// A recognized free-text label ("entrada", "salida").
    Label,
    /// The punch's position among the day's unhinted punches.
    Position,
    /// The permission policy's exit inference.
    Permission,
}

/// A punch of a day group together with the role it was assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedPunch {
    /// Index of the punch in [`DayPunchGroup::punches`].
    pub index: usize,
    /// The source that recorded the punch.
    pub source: Source,
    /// When the punch happened.
    pub timestamp: DateTime<Utc>,
    /// The assigned role; `None` for punches the rules leave unused.
    pub role: Option<Role>,
    /// How the role was decided.
    pub origin: RoleOrigin,
    /// True when the punch falls inside the lunch window.
    pub in_lunch_window: bool,
}

/// The classified punches of one day and the anomalies noticed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedDay {
    /// One entry per punch, in the group's chronological order.
    pub punches: Vec<ClassifiedPunch>,
    /// Ignored lunch punches, ambiguous hints and reclassified exits.
    pub warnings: Vec<ReportWarning>,
}

impl ClassifiedDay {
    /// Returns true when any punch carries the role.
    pub fn has_role(&self, role: Role) -> bool {
        self.punches.iter().any(|p| p.role == Some(role))
    }

    /// The candidate a source offers for a role: the earliest punch with
    /// that role, or the latest for [`Role::Exit`].
    pub fn candidate(&self, source: Source, role: Role) -> Option<&ClassifiedPunch> {
        let mut with_role = self
            .punches
            .iter()
            .filter(|p| p.source == source && p.role == Some(role));
        if role == Role::Exit {
            with_role.last()
        } else {
            with_role.next()
        }
    }
}

/// Reads a role from a recognized free-text label.
///
/// Labels mentioning lunch ("almuerzo", "lunch") map to the lunch roles.
///
/// # Example
///
/// ```
/// use attendance_engine::models::Role;
/// use attendance_engine::reconciliation::label_role;
///
/// assert_eq!(label_role("Entrada"), Some(Role::Entry));
/// assert_eq!(label_role("salida almuerzo"), Some(Role::LunchOut));
/// assert_eq!(label_role(""), None);
/// ```
pub fn label_role(label: &str) -> Option<Role> {
    let label = normalize_name(label);
    let lunch = label.contains("almuerzo") || label.contains("lunch");
    let entering = label.contains("entrada") || label.contains("entry");
    let leaving = label.contains("salida") || label.contains("exit");

    match (entering, leaving, lunch) {
        (true, false, false) => Some(Role::Entry),
        (true, false, true) => Some(Role::LunchIn),
        (false, true, false) => Some(Role::Exit),
        (false, true, true) => Some(Role::LunchOut),
        _ => None,
    }
}

/// Moves generic entry/exit hints onto the lunch roles inside the window.
fn downgrade_for_lunch(role: Role) -> Role {
    match role {
        Role::Entry | Role::LunchIn => Role::LunchIn,
        Role::Exit | Role::LunchOut => Role::LunchOut,
    }
}

/// Decides the hinted role of a punch, if any.
///
/// Returns the role with its origin, or `None` for an unhinted punch. A
/// punch with several flags set is reported and treated as unhinted.
fn hinted_role(punch: &RawPunch, warnings: &mut Vec<ReportWarning>) -> Option<(Role, RoleOrigin)> {
    if punch.role_hints.is_ambiguous() {
        warnings.push(ReportWarning::new(
            WarningCode::AmbiguousHint,
            Severity::Low,
            format!(
                "{} punch at {} carries several role flags; treated as unhinted",
                punch.source,
                punch.timestamp.format("%H:%M:%S")
            ),
        ));
        return None;
    }
    if let Some(role) = punch.role_hints.role() {
        return Some((role, RoleOrigin::Hint));
    }
    label_role(&punch.label).map(|role| (role, RoleOrigin::Label))
}

/// Assigns roles across the merged day, all sources together.
///
/// Punches keep their source, so arbitration still sees which system
/// supplied each role.
fn assign_roles(
    group: &DayPunchGroup,
    classified: &mut [ClassifiedPunch],
    warnings: &mut Vec<ReportWarning>,
) {
    let mut lunch_unhinted = Vec::new();
    let mut other_unhinted = Vec::new();

    for (index, punch) in group.punches.iter().enumerate() {
        let in_window = classified[index].in_lunch_window;
        match hinted_role(punch, warnings) {
            Some((role, origin)) => {
                classified[index].role = Some(if in_window {
                    downgrade_for_lunch(role)
                } else {
                    role
                });
                classified[index].origin = origin;
            }
            None if in_window => lunch_unhinted.push(index),
            None => other_unhinted.push(index),
        }
    }

    // Lunch roles already set by a hint are not handed out again.
    let open_lunch_roles: Vec<Role> = [Role::LunchOut, Role::LunchIn]
        .into_iter()
        .filter(|role| !classified.iter().any(|p| p.role == Some(*role)))
        .collect();

    for (position, &index) in lunch_unhinted.iter().enumerate() {
        match open_lunch_roles.get(position) {
            Some(role) => classified[index].role = Some(*role),
            None => warnings.push(ReportWarning::new(
                WarningCode::ExtraLunchPunch,
                Severity::Low,
                format!(
                    "{} lunch-window punch at {} ignored",
                    classified[index].source,
                    classified[index].timestamp.format("%H:%M:%S")
                ),
            )),
        }
    }

    match other_unhinted.as_slice() {
        [] => {}
        [only] => classified[*only].role = Some(Role::Entry),
        [first, .., last] => {
            classified[*first].role = Some(Role::Entry);
            classified[*last].role = Some(Role::Exit);
        }
    }
}

/// Classifies the punches of one day group.
///
/// Times of day are compared against the lunch window using the UTC
/// wall-clock component of each timestamp.
///
/// # Example
///
/// ```
/// use attendance_engine::config::ScheduleConfig;
/// use attendance_engine::models::{DayPunchGroup, EmployeeKey, RawPunch, Role, Source};
/// use attendance_engine::reconciliation::classify_day;
/// use chrono::{TimeZone, Utc};
///
/// let key = EmployeeKey::BiometricOnly { biometric: "ana perez".to_string() };
/// let mut group = DayPunchGroup::empty(key, Utc.with_ymd_and_hms(2025, 8, 18, 0, 0, 0).unwrap().date_naive());
/// for (h, m) in [(8, 25), (12, 35), (14, 50), (17, 5)] {
///     let at = Utc.with_ymd_and_hms(2025, 8, 18, h, m, 0).unwrap();
///     group.punches.push(RawPunch::new(Source::Biometric, "Ana Perez", at));
/// }
///
/// let day = classify_day(&group, &ScheduleConfig::default().lunch_window);
/// let roles: Vec<_> = day.punches.iter().map(|p| p.role).collect();
/// assert_eq!(
///     roles,
///     vec![Some(Role::Entry), Some(Role::LunchOut), Some(Role::LunchIn), Some(Role::Exit)]
/// );
/// ```
pub fn classify_day(group: &DayPunchGroup, lunch: &LunchWindow) -> ClassifiedDay {
    let mut classified: Vec<ClassifiedPunch> = group
        .punches
        .iter()
        .enumerate()
        .map(|(index, punch)| ClassifiedPunch {
            index,
            source: punch.source,
            timestamp: punch.timestamp,
            role: None,
            origin: RoleOrigin::Position,
            in_lunch_window: lunch.contains(punch.time_of_day()),
        })
        .collect();
    let mut warnings = Vec::new();

    assign_roles(group, &mut classified, &mut warnings);

    let mut non_lunch = classified.iter_mut().filter(|p| !p.in_lunch_window);
    if let (Some(lone), None) = (non_lunch.next(), non_lunch.next()) {
        if lone.role == Some(Role::Exit) {
            lone.role = Some(Role::Entry);
            warnings.push(ReportWarning::new(
                WarningCode::LoneExitReclassified,
                Severity::Medium,
                format!(
                    "only non-lunch punch of the day ({} at {}) was hinted as exit; treated as entry",
                    lone.source,
                    lone.timestamp.format("%H:%M:%S")
                ),
            ));
        }
    }

    ClassifiedDay {
        punches: classified,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScheduleConfig;
    use crate::models::{EmployeeKey, RoleHints};
    use chrono::{NaiveDate, NaiveDateTime};

    fn make_datetime(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
    }

    fn punch(source: Source, time: &str) -> RawPunch {
        RawPunch::new(
            source,
            "Ana Perez",
            make_datetime(&format!("2025-08-18 {}:00", time)),
        )
    }

    fn hinted(source: Source, time: &str, role: Role) -> RawPunch {
        let mut p = punch(source, time);
        p.role_hints = RoleHints::only(role);
        p
    }

    fn labelled(source: Source, time: &str, label: &str) -> RawPunch {
        let mut p = punch(source, time);
        p.label = label.to_string();
        p
    }

    fn group(punches: Vec<RawPunch>) -> DayPunchGroup {
        let mut group = DayPunchGroup::empty(
            EmployeeKey::BiometricOnly {
                biometric: "ana perez".to_string(),
            },
            NaiveDate::from_ymd_opt(2025, 8, 18).unwrap(),
        );
        group.punches = punches;
        group.punches.sort_by_key(|p| p.timestamp);
        group
    }

    fn roles(day: &ClassifiedDay) -> Vec<Option<Role>> {
        day.punches.iter().map(|p| p.role).collect()
    }

    fn lunch() -> LunchWindow {
        ScheduleConfig::default().lunch_window
    }

    #[test]
    fn test_empty_day_has_no_roles() {
        let day = classify_day(&group(vec![]), &lunch());
        assert!(day.punches.is_empty());
        assert!(day.warnings.is_empty());
    }

    #[test]
    fn test_single_unhinted_punch_is_entry() {
        let day = classify_day(&group(vec![punch(Source::Terminal, "17:05")]), &lunch());
        assert_eq!(roles(&day), vec![Some(Role::Entry)]);
    }

    #[test]
    fn test_first_and_last_non_lunch_punches() {
        let day = classify_day(
            &group(vec![
                punch(Source::Terminal, "08:20"),
                punch(Source::Terminal, "10:00"),
                punch(Source::Terminal, "17:10"),
            ]),
            &lunch(),
        );
        assert_eq!(roles(&day), vec![Some(Role::Entry), None, Some(Role::Exit)]);
    }

    #[test]
    fn test_third_lunch_punch_is_ignored_with_warning() {
        let day = classify_day(
            &group(vec![
                punch(Source::Biometric, "12:31"),
                punch(Source::Biometric, "13:00"),
                punch(Source::Biometric, "14:00"),
            ]),
            &lunch(),
        );
        assert_eq!(
            roles(&day),
            vec![Some(Role::LunchOut), Some(Role::LunchIn), None]
        );
        assert_eq!(day.warnings.len(), 1);
        assert_eq!(day.warnings[0].code, WarningCode::ExtraLunchPunch);
    }

    #[test]
    fn test_lunch_window_end_is_exclusive() {
        let day = classify_day(
            &group(vec![punch(Source::Biometric, "08:30"), punch(Source::Biometric, "15:00")]),
            &lunch(),
        );
        assert_eq!(roles(&day), vec![Some(Role::Entry), Some(Role::Exit)]);
    }

    #[test]
    fn test_hints_are_downgraded_inside_lunch_window() {
        let day = classify_day(
            &group(vec![
                hinted(Source::Terminal, "08:30", Role::Entry),
                hinted(Source::Terminal, "12:40", Role::Exit),
                hinted(Source::Terminal, "14:10", Role::Entry),
                hinted(Source::Terminal, "17:00", Role::Exit),
            ]),
            &lunch(),
        );
        assert_eq!(
            roles(&day),
            vec![
                Some(Role::Entry),
                Some(Role::LunchOut),
                Some(Role::LunchIn),
                Some(Role::Exit)
            ]
        );
        assert!(day.punches.iter().all(|p| p.origin == RoleOrigin::Hint));
    }

    #[test]
    fn test_labels_act_as_hints() {
        let day = classify_day(
            &group(vec![
                labelled(Source::Biometric, "08:25", "entrada"),
                labelled(Source::Biometric, "12:35", "salida"),
                labelled(Source::Biometric, "14:50", "entrada"),
                labelled(Source::Biometric, "17:05", "salida"),
            ]),
            &lunch(),
        );
        assert_eq!(
            roles(&day),
            vec![
                Some(Role::Entry),
                Some(Role::LunchOut),
                Some(Role::LunchIn),
                Some(Role::Exit)
            ]
        );
        assert_eq!(day.punches[1].origin, RoleOrigin::Label);
    }

    #[test]
    fn test_position_rules_span_both_sources() {
        let day = classify_day(
            &group(vec![punch(Source::Terminal, "08:30"), punch(Source::Biometric, "17:05")]),
            &lunch(),
        );
        assert_eq!(roles(&day), vec![Some(Role::Entry), Some(Role::Exit)]);
        assert!(day.candidate(Source::Terminal, Role::Entry).is_some());
        assert!(day.candidate(Source::Biometric, Role::Exit).is_some());
        assert!(day.candidate(Source::Biometric, Role::Entry).is_none());
    }

    #[test]
    fn test_hinted_entries_from_both_sources_compete() {
        let day = classify_day(
            &group(vec![
                hinted(Source::Biometric, "08:38", Role::Entry),
                hinted(Source::Terminal, "09:10", Role::Entry),
            ]),
            &lunch(),
        );
        assert_eq!(roles(&day), vec![Some(Role::Entry), Some(Role::Entry)]);
        assert!(day.candidate(Source::Terminal, Role::Entry).is_some());
        assert!(day.candidate(Source::Biometric, Role::Entry).is_some());
        assert!(!day.has_role(Role::Exit));
    }

    #[test]
    fn test_unhinted_lunch_punch_fills_role_left_open_by_hint() {
        let day = classify_day(
            &group(vec![
                hinted(Source::Terminal, "12:40", Role::LunchOut),
                punch(Source::Biometric, "14:00"),
            ]),
            &lunch(),
        );
        assert_eq!(roles(&day), vec![Some(Role::LunchOut), Some(Role::LunchIn)]);
        assert_eq!(day.punches[1].origin, RoleOrigin::Position);
    }

    #[test]
    fn test_lunch_punch_ignored_when_hints_fill_both_lunch_roles() {
        let day = classify_day(
            &group(vec![
                hinted(Source::Terminal, "12:40", Role::LunchOut),
                punch(Source::Terminal, "13:10"),
                hinted(Source::Terminal, "14:00", Role::LunchIn),
            ]),
            &lunch(),
        );
        assert_eq!(
            roles(&day),
            vec![Some(Role::LunchOut), None, Some(Role::LunchIn)]
        );
        assert_eq!(day.warnings[0].code, WarningCode::ExtraLunchPunch);
    }

    #[test]
    fn test_lone_exit_hint_becomes_entry() {
        let day = classify_day(
            &group(vec![hinted(Source::Terminal, "17:05", Role::Exit)]),
            &lunch(),
        );
        assert_eq!(roles(&day), vec![Some(Role::Entry)]);
        assert_eq!(day.warnings[0].code, WarningCode::LoneExitReclassified);
    }

    #[test]
    fn test_exit_hint_kept_when_day_has_other_punches() {
        let day = classify_day(
            &group(vec![
                punch(Source::Biometric, "08:30"),
                hinted(Source::Terminal, "17:05", Role::Exit),
            ]),
            &lunch(),
        );
        assert_eq!(roles(&day), vec![Some(Role::Entry), Some(Role::Exit)]);
    }

    #[test]
    fn test_ambiguous_hint_is_treated_as_unhinted() {
        let mut both = punch(Source::Terminal, "08:30");
        both.role_hints = RoleHints {
            is_entry: true,
            is_exit: true,
            ..RoleHints::default()
        };
        let day = classify_day(&group(vec![both, punch(Source::Terminal, "17:00")]), &lunch());
        assert_eq!(roles(&day), vec![Some(Role::Entry), Some(Role::Exit)]);
        assert_eq!(day.warnings[0].code, WarningCode::AmbiguousHint);
    }

    #[test]
    fn test_exit_candidate_is_latest() {
        let day = classify_day(
            &group(vec![
                hinted(Source::Terminal, "08:30", Role::Entry),
                hinted(Source::Terminal, "16:00", Role::Exit),
                hinted(Source::Terminal, "17:15", Role::Exit),
            ]),
            &lunch(),
        );
        let exit = day.candidate(Source::Terminal, Role::Exit).unwrap();
        assert_eq!(exit.timestamp, make_datetime("2025-08-18 17:15:00"));
    }

    #[test]
    fn test_label_role_variants() {
        assert_eq!(label_role("ENTRADA"), Some(Role::Entry));
        assert_eq!(label_role("Salida"), Some(Role::Exit));
        assert_eq!(label_role("Entrada almuerzo"), Some(Role::LunchIn));
        assert_eq!(label_role("entrada/salida"), None);
        assert_eq!(label_role("marcación"), None);
    }
}
