//! Daily punch grouping.
//!
//! This module partitions the punches of a report window into one
//! [`DayPunchGroup`] per resolved employee and UTC calendar date.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::{DayPunchGroup, EmployeeKey, RawPunch, Source};

use super::identity::IdentityMap;

/// Groups punches by resolved employee and UTC calendar date.
///
/// Within each group punches are sorted ascending by timestamp; equal
/// timestamps keep their input order. The first non-blank permission label
/// and area found on a terminal punch of the day are lifted into the group.
/// Biometric values for those fields are ignored. Punches whose identity
/// is unknown to `identities` are skipped.
///
/// The map iterates in key order, so downstream processing is
/// deterministic.
pub fn group_by_day(
    punches: &[RawPunch],
    identities: &IdentityMap,
) -> BTreeMap<(EmployeeKey, NaiveDate), DayPunchGroup> {
    let mut groups: BTreeMap<(EmployeeKey, NaiveDate), DayPunchGroup> = BTreeMap::new();

    for punch in punches {
        let Some(key) = identities.key_for_punch(punch) else {
            continue;
        };
        let date = punch.date();
        groups
            .entry((key.clone(), date))
            .or_insert_with(|| DayPunchGroup::empty(key.clone(), date))
            .punches
            .push(punch.clone());
    }

    for group in groups.values_mut() {
        group.punches.sort_by_key(|p| p.timestamp);

        group.terminal_permission_label =
            first_terminal_value(&group.punches, |p| p.permission_label.as_deref());
        group.area = first_terminal_value(&group.punches, |p| p.area.as_deref());
    }

    groups
}

fn first_terminal_value(
    punches: &[RawPunch],
    field: impl Fn(&RawPunch) -> Option<&str>,
) -> Option<String> {
    punches
        .iter()
        .filter(|p| p.source == Source::Terminal)
        .filter_map(field)
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}
