//! Permission policy.
//!
//! This module turns the free-text permission label of a day into a
//! [`PermissionClass`] using the ordered keyword table, and applies the
//! class's relaxation of exit classification.

use crate::config::PermissionRule;
use crate::models::{PermissionClass, Role};

use super::classifier::{ClassifiedDay, RoleOrigin};
use super::name_normalizer::normalize_name;

/// Classifies a permission label against an ordered rule table.
///
/// Label and keywords are compared in normalized form (case- and
/// accent-insensitive, `ñ` folded). The first rule whose keywords all
/// appear as substrings of the label wins; an absent, blank or unmatched
/// label yields [`PermissionClass::None`].
///
/// # Example
///
/// ```
/// use attendance_engine::config::default_permission_rules;
/// use attendance_engine::models::PermissionClass;
/// use attendance_engine::reconciliation::classify_permission;
///
/// let rules = default_permission_rules();
/// assert_eq!(
///     classify_permission(Some("CITA MÉDICA IESS"), &rules),
///     PermissionClass::MedicalAppointment
/// );
/// assert_eq!(classify_permission(Some("vacaciones"), &rules), PermissionClass::None);
/// assert_eq!(classify_permission(None, &rules), PermissionClass::None);
/// ```
pub fn classify_permission(label: Option<&str>, rules: &[PermissionRule]) -> PermissionClass {
    let Some(label) = label.map(normalize_name).filter(|l| !l.is_empty()) else {
        return PermissionClass::None;
    };

    rules
        .iter()
        .find(|rule| {
            rule.keywords
                .iter()
                .all(|keyword| label.contains(normalize_name(keyword).as_str()))
        })
        .map(|rule| rule.class)
        .unwrap_or_default()
}

/// Infers the day's exit from its last punch on a permission day.
///
/// Applies only when `class` is active and no punch was classified as
/// exit. The chronologically last punch of the day becomes the exit,
/// whatever role it held, unless it is the day's only punch and already
/// the entry. Returns the index of the re-roled punch.
pub fn infer_permission_exit(day: &mut ClassifiedDay, class: PermissionClass) -> Option<usize> {
    if !class.is_active() || day.has_role(Role::Exit) {
        return None;
    }

    let only_punch = day.punches.len() == 1;
    let last = day.punches.last_mut()?;
    if only_punch && last.role == Some(Role::Entry) {
        return None;
    }

    last.role = Some(Role::Exit);
    last.origin = RoleOrigin::Permission;
    Some(last.index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ScheduleConfig, default_permission_rules};
    use crate::models::{DayPunchGroup, EmployeeKey, RawPunch, Source};
    use crate::reconciliation::classify_day;
    use chrono::{NaiveDate, NaiveDateTime};

    fn day_of(times: &[&str]) -> ClassifiedDay {
        let mut group = DayPunchGroup::empty(
            EmployeeKey::TerminalOnly {
                terminal: "perez ana".to_string(),
            },
            NaiveDate::from_ymd_opt(2025, 8, 18).unwrap(),
        );
        for time in times {
            let at = NaiveDateTime::parse_from_str(&format!("2025-08-18 {}:00", time), "%Y-%m-%d %H:%M:%S")
                .unwrap()
                .and_utc();
            group.punches.push(RawPunch::new(Source::Terminal, "PEREZ ANA", at));
        }
        classify_day(&group, &ScheduleConfig::default().lunch_window)
    }

    #[test]
    fn test_keyword_table_order_and_matching() {
        let rules = default_permission_rules();
        let cases = [
            ("Comisión Oficial", PermissionClass::OfficialDuty),
            ("asuntos PERSONALES", PermissionClass::PersonalMatter),
            ("Calamidad doméstica", PermissionClass::Calamity),
            ("Enfermedad", PermissionClass::Illness),
            ("Cita Medica", PermissionClass::MedicalAppointment),
            ("Rehabilitación", PermissionClass::Rehabilitation),
        ];
        for (label, expected) in cases {
            assert_eq!(classify_permission(Some(label), &rules), expected, "{}", label);
        }
    }

    #[test]
    fn test_every_keyword_of_a_group_is_required() {
        let rules = default_permission_rules();
        assert_eq!(classify_permission(Some("cita"), &rules), PermissionClass::None);
        assert_eq!(classify_permission(Some("asuntos"), &rules), PermissionClass::None);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let rules = default_permission_rules();
        assert_eq!(
            classify_permission(Some("oficial por enfermedad"), &rules),
            PermissionClass::OfficialDuty
        );
    }

    #[test]
    fn test_blank_label_is_none() {
        let rules = default_permission_rules();
        assert_eq!(classify_permission(Some("   "), &rules), PermissionClass::None);
    }

    #[test]
    fn test_no_inference_without_permission() {
        let mut day = day_of(&["08:30", "12:40"]);
        assert_eq!(infer_permission_exit(&mut day, PermissionClass::None), None);
        assert!(!day.has_role(Role::Exit));
    }

    #[test]
    fn test_last_punch_becomes_exit() {
        let mut day = day_of(&["08:30", "12:40"]);
        assert_eq!(
            infer_permission_exit(&mut day, PermissionClass::Illness),
            Some(1)
        );
        assert_eq!(day.punches[1].role, Some(Role::Exit));
        assert_eq!(day.punches[1].origin, RoleOrigin::Permission);
        assert_eq!(day.punches[0].role, Some(Role::Entry));
    }

    #[test]
    fn test_existing_exit_is_kept() {
        let mut day = day_of(&["08:30", "11:30"]);
        assert!(day.has_role(Role::Exit));
        assert_eq!(
            infer_permission_exit(&mut day, PermissionClass::MedicalAppointment),
            None
        );
    }

    #[test]
    fn test_single_entry_punch_is_not_reused_as_exit() {
        let mut day = day_of(&["08:30"]);
        assert_eq!(
            infer_permission_exit(&mut day, PermissionClass::Calamity),
            None
        );
        assert_eq!(day.punches[0].role, Some(Role::Entry));
    }

    #[test]
    fn test_single_lunch_punch_becomes_exit() {
        let mut day = day_of(&["13:00"]);
        assert_eq!(
            infer_permission_exit(&mut day, PermissionClass::PersonalMatter),
            Some(0)
        );
    }

    #[test]
    fn test_empty_day_infers_nothing() {
        let mut day = day_of(&[]);
        assert_eq!(infer_permission_exit(&mut day, PermissionClass::Illness), None);
    }
}
