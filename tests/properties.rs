//! Property tests for the reconciliation invariants.

use std::collections::HashSet;

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use proptest::prelude::*;
use proptest::test_runner::Config;

use attendance_engine::config::ScheduleConfig;
use attendance_engine::models::{RawPunch, ReportRange, ReportRequest, Role, RoleHints, Source};
use attendance_engine::reconciliation::{
    calculate_shortfall, consolidate, normalize_name, resolve_identities,
};

const NAME_POOL: [&str; 10] = [
    "PEREZ ANA",
    "Ana Pérez",
    "Perez Ana",
    "GOMEZ LUIS",
    "Luis Gómez",
    "TORRES ANA",
    "Ana Torres",
    "ÁLVAREZ MARÍA JOSÉ",
    "María José Alvarez",
    "Ñandú Peña",
];

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, 18).unwrap()
}

fn punch_at(source: Source, name: &str, minute_of_day: u32) -> RawPunch {
    let time = NaiveTime::from_hms_opt(minute_of_day / 60, minute_of_day % 60, 0).unwrap();
    RawPunch::new(source, name, Utc.from_utc_datetime(&day().and_time(time)))
}

fn source_strategy() -> impl Strategy<Value = Source> {
    prop_oneof![Just(Source::Terminal), Just(Source::Biometric)]
}

fn hints_strategy() -> impl Strategy<Value = RoleHints> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(is_entry, is_exit, is_lunch_out, is_lunch_in)| RoleHints {
            is_entry,
            is_exit,
            is_lunch_out,
            is_lunch_in,
        },
    )
}

fn punch_strategy() -> impl Strategy<Value = RawPunch> {
    (source_strategy(), 0..NAME_POOL.len(), 0u32..1440, hints_strategy()).prop_map(
        |(source, name, minute, hints)| {
            let mut punch = punch_at(source, NAME_POOL[name], minute);
            punch.role_hints = hints;
            punch
        },
    )
}

fn minute_outside_lunch() -> impl Strategy<Value = u32> {
    // Default lunch window is [12:30, 15:00)
    prop_oneof![0u32..750, 900u32..1440]
}

proptest! {
    #![proptest_config(Config::with_cases(128))]

    #[test]
    fn normalization_is_idempotent(raw in "\\PC{0,40}") {
        let once = normalize_name(&raw);
        prop_assert_eq!(normalize_name(&once), once.clone());
        prop_assert!(!once.contains("  "));
        prop_assert_eq!(once.trim(), once.as_str());
    }

    #[test]
    fn identity_links_are_one_to_one(punches in prop::collection::vec(punch_strategy(), 0..24)) {
        let resolution = resolve_identities(&punches);

        let mut terminals = HashSet::new();
        let mut biometrics = HashSet::new();
        for link in resolution.map.links() {
            prop_assert!(terminals.insert(link.terminal.clone()));
            prop_assert!(biometrics.insert(link.biometric.clone()));
        }
    }

    #[test]
    fn shortfall_is_never_negative(entry in 0u32..1440, exit in 0u32..1440) {
        let config = ScheduleConfig::default();
        let to_time = |m: u32| NaiveTime::from_hms_opt(m / 60, m % 60, 0);
        let result = calculate_shortfall(to_time(entry), to_time(exit), &config);

        prop_assert!(result.late_minutes >= 0);
        prop_assert!(result.early_minutes >= 0);
        prop_assert_eq!(result.unworked_minutes, result.late_minutes + result.early_minutes);
    }

    #[test]
    fn punctual_days_have_no_shortfall(entry in 0u32..=520, exit in 1020u32..1440) {
        // 520 is the 08:40 entry anchor, 1020 the 17:00 exit anchor
        let config = ScheduleConfig::default();
        let to_time = |m: u32| NaiveTime::from_hms_opt(m / 60, m % 60, 0);
        let result = calculate_shortfall(to_time(entry), to_time(exit), &config);
        prop_assert_eq!(result.unworked_minutes, 0);
    }

    #[test]
    fn single_non_lunch_punch_never_becomes_exit(
        source in source_strategy(),
        minute in minute_outside_lunch(),
        hints in hints_strategy(),
        lunch in prop::collection::vec((source_strategy(), 750u32..900, hints_strategy()), 0..4),
    ) {
        let mut punches = vec![{
            let mut p = punch_at(source, "Ana Perez", minute);
            p.role_hints = hints;
            p
        }];
        for (lunch_source, lunch_minute, lunch_hints) in lunch {
            let mut p = punch_at(lunch_source, "Ana Perez", lunch_minute);
            p.role_hints = lunch_hints;
            punches.push(p);
        }

        let request = ReportRequest::new(ReportRange::single_day(day()));
        let report = consolidate(punches, &ScheduleConfig::default(), &request);

        for record in &report.records {
            prop_assert_eq!(record.time_for(Role::Exit), None);
        }
    }

    #[test]
    fn consolidation_is_deterministic(punches in prop::collection::vec(punch_strategy(), 0..32)) {
        let config = ScheduleConfig::default();
        let request = ReportRequest::new(ReportRange::single_day(day()));

        let first = serde_json::to_string(&consolidate(punches.clone(), &config, &request)).unwrap();
        let second = serde_json::to_string(&consolidate(punches, &config, &request)).unwrap();
        prop_assert_eq!(first, second);
    }
}
