//! Report assembly.
//!
//! This module orchestrates one report run: it loads the window's punches
//! once, resolves identities, groups punches per employee/day, evaluates
//! every employee/day of the range and returns the records ordered by
//! display name then date.

use std::collections::HashMap;
use std::time::Instant;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ScheduleConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    ConsolidatedDayRecord, ConsolidatedReport, DayPunchGroup, Employee, EmployeeKey, RawPunch,
    ReportRange, ReportRequest, ReportWarning, Severity, WarningCode,
};
use crate::store::PunchStore;

use super::arbitration::arbitrate;
use super::classifier::classify_day;
use super::grouping::group_by_day;
use super::identity::resolve_identities;
use super::name_normalizer::normalize_name;
use super::permission_policy::{classify_permission, infer_permission_exit};
use super::shortfall::calculate_shortfall;
use super::status::{StatusInput, evaluate_status};

/// The evaluation of one employee/day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayEvaluation {
    /// The consolidated record.
    pub record: ConsolidatedDayRecord,
    /// Anomalies noticed while classifying the day.
    pub warnings: Vec<ReportWarning>,
}

/// Evaluates one employee/day.
///
/// Runs permission classification, event classification, permission exit
/// inference, source arbitration, shortfall and status in that order.
/// `fallback_area` is used when no terminal punch of the day names an area.
///
/// # Errors
///
/// Returns `CalculationError` when the group holds a punch dated outside
/// the group's day, or when the permission allowance cannot be computed.
pub fn evaluate_day(
    group: &DayPunchGroup,
    employee: &Employee,
    fallback_area: Option<&str>,
    config: &ScheduleConfig,
) -> EngineResult<DayEvaluation> {
    if let Some(stray) = group.punches.iter().find(|p| p.date() != group.date) {
        return Err(EngineError::CalculationError {
            message: format!(
                "punch at {} does not belong to day {}",
                stray.timestamp, group.date
            ),
        });
    }

    let permission_label = group.terminal_permission_label.as_deref();
    let permission = classify_permission(permission_label, &config.permissions);

    let mut day = classify_day(group, &config.lunch_window);
    infer_permission_exit(&mut day, permission);

    let merged = arbitrate(&day, config);
    for line in &merged.reasoning {
        debug!(employee = %employee.display_name, date = %group.date, "{}", line);
    }

    let entry = merged.entry.as_ref().map(|r| r.timestamp);
    let exit = merged.exit.as_ref().map(|r| r.timestamp);

    let shortfall = calculate_shortfall(
        entry.map(|t| t.time()),
        exit.map(|t| t.time()),
        config,
    );

    let status = evaluate_status(
        &StatusInput {
            has_punches: !group.is_empty(),
            entry: entry.map(|t| t.time()),
            exit: exit.map(|t| t.time()),
            permission,
            unworked_minutes: shortfall.unworked_minutes,
        },
        config,
    )?;

    let record = ConsolidatedDayRecord {
        employee_display_name: employee.display_name.clone(),
        area: group.area.clone().or_else(|| fallback_area.map(str::to_string)),
        date: group.date,
        entry_time: entry,
        lunch_out_time: merged.lunch_out.as_ref().map(|r| r.timestamp),
        lunch_in_time: merged.lunch_in.as_ref().map(|r| r.timestamp),
        exit_time: exit,
        sources_used: merged.sources_used(),
        permission_class: permission,
        permission_label: permission_label
            .filter(|_| permission.is_active())
            .map(str::to_string),
        unworked_minutes: shortfall.unworked_minutes,
        status,
    };

    let warnings = day
        .warnings
        .into_iter()
        .map(|w| w.on_day(employee.display_name.clone(), group.date))
        .collect();

    Ok(DayEvaluation { record, warnings })
}

/// Builds a report from an already loaded set of punches.
///
/// Punches outside the request's range, and punches whose name normalizes
/// to nothing, are dropped with a warning. Every resolved employee gets one
/// record per configured workday of the range, plus one for any other day
/// on which they punched. A failure evaluating one employee/day is logged,
/// reported as [`WarningCode::DayEvaluationFailed`] and skipped.
///
/// The output is a pure function of the punches, configuration and request.
pub fn consolidate(
    mut punches: Vec<RawPunch>,
    config: &ScheduleConfig,
    request: &ReportRequest,
) -> ConsolidatedReport {
    let range = request.range;
    let mut warnings = Vec::new();

    punches.sort_by_key(|p| p.timestamp);
    punches.retain(|punch| {
        if !range.contains_instant(punch.timestamp) {
            warn!(name = %punch.person_name, timestamp = %punch.timestamp, "Ignoring punch outside report range");
            warnings.push(ReportWarning::new(
                WarningCode::PunchOutsideRange,
                Severity::Low,
                format!(
                    "{} punch of '{}' at {} is outside the report range",
                    punch.source, punch.person_name, punch.timestamp
                ),
            ));
            return false;
        }
        if normalize_name(&punch.person_name).is_empty() {
            warn!(timestamp = %punch.timestamp, "Ignoring punch without a usable name");
            warnings.push(ReportWarning::new(
                WarningCode::MalformedPunch,
                Severity::Medium,
                format!("{} punch at {} has no usable name", punch.source, punch.timestamp),
            ));
            return false;
        }
        true
    });

    let identities = resolve_identities(&punches);
    warnings.extend(identities.warnings);
    let identities = identities.map;

    let groups = group_by_day(&punches, &identities);

    let employees: Vec<&Employee> = match request.employee_filter.as_deref() {
        Some(filter) => {
            let found = identities.find(filter);
            if found.is_none() {
                info!(filter = %filter, "No employee matches the report filter");
            }
            found.into_iter().collect()
        }
        None => identities.employees().iter().collect(),
    };

    let mut areas: HashMap<&EmployeeKey, &str> = HashMap::new();
    for ((key, _), group) in &groups {
        if let Some(area) = group.area.as_deref() {
            areas.entry(key).or_insert(area);
        }
    }

    let mut rows: Vec<(String, NaiveDate, &EmployeeKey, ConsolidatedDayRecord)> = Vec::new();
    for employee in employees {
        for date in range.days() {
            let lookup = (employee.key.clone(), date);
            let empty;
            let group = match groups.get(&lookup) {
                Some(group) => group,
                None if config.is_workday(date.weekday()) => {
                    empty = DayPunchGroup::empty(employee.key.clone(), date);
                    &empty
                }
                None => continue,
            };

            match evaluate_day(group, employee, areas.get(&employee.key).copied(), config) {
                Ok(evaluation) => {
                    warnings.extend(evaluation.warnings);
                    rows.push((
                        normalize_name(&employee.display_name),
                        date,
                        &employee.key,
                        evaluation.record,
                    ));
                }
                Err(err) => {
                    warn!(
                        employee = %employee.display_name,
                        date = %date,
                        error = %err,
                        "Day evaluation failed"
                    );
                    warnings.push(
                        ReportWarning::new(
                            WarningCode::DayEvaluationFailed,
                            Severity::High,
                            err.to_string(),
                        )
                        .on_day(employee.display_name.clone(), date),
                    );
                }
            }
        }
    }

    rows.sort_by(|a, b| {
        (&a.0, &a.3.employee_display_name, a.1, a.2).cmp(&(&b.0, &b.3.employee_display_name, b.1, b.2))
    });

    ConsolidatedReport {
        records: rows.into_iter().map(|(_, _, _, record)| record).collect(),
        warnings,
    }
}

/// Generates the consolidated attendance report for a request.
///
/// Loads the punches of the range's UTC window from `store` once and
/// hands them to [`consolidate`].
///
/// # Errors
///
/// Returns the store's error if loading fails. Malformed punches and
/// per-day failures never abort the run; they surface as report warnings.
///
/// # Example
///
/// ```
/// use attendance_engine::config::ScheduleConfig;
/// use attendance_engine::models::{DayStatus, RawPunch, ReportRange, ReportRequest, Source};
/// use attendance_engine::reconciliation::generate_consolidated_report;
/// use attendance_engine::store::InMemoryPunchStore;
/// use chrono::{NaiveDate, TimeZone, Utc};
///
/// let store = InMemoryPunchStore::from_punches(vec![
///     RawPunch::new(Source::Terminal, "PEREZ ANA", Utc.with_ymd_and_hms(2025, 8, 18, 8, 30, 0).unwrap()),
///     RawPunch::new(Source::Terminal, "PEREZ ANA", Utc.with_ymd_and_hms(2025, 8, 18, 17, 0, 0).unwrap()),
/// ]);
/// let request = ReportRequest::new(ReportRange::single_day(
///     NaiveDate::from_ymd_opt(2025, 8, 18).unwrap(),
/// ));
///
/// let report = generate_consolidated_report(&store, &ScheduleConfig::default(), &request).unwrap();
/// assert_eq!(report.records.len(), 1);
/// assert_eq!(report.records[0].status, DayStatus::Complete);
/// ```
pub fn generate_consolidated_report<S: PunchStore + ?Sized>(
    store: &S,
    config: &ScheduleConfig,
    request: &ReportRequest,
) -> EngineResult<ConsolidatedReport> {
    let correlation_id = Uuid::new_v4();
    let start_time = Instant::now();

    let (window_start, window_end) = request.range.utc_bounds()?;
    let punches = store.punches_between(window_start, window_end).map_err(|err| {
        warn!(correlation_id = %correlation_id, error = %err, "Failed to load punches");
        err
    })?;

    info!(
        correlation_id = %correlation_id,
        start_date = %request.range.start_date(),
        end_date = %request.range.end_date(),
        punches = punches.len(),
        filtered = request.employee_filter.is_some(),
        "Generating consolidated report"
    );

    let report = consolidate(punches, config, request);

    info!(
        correlation_id = %correlation_id,
        records = report.records.len(),
        warnings = report.warnings.len(),
        duration_us = start_time.elapsed().as_micros(),
        "Consolidated report generated"
    );

    Ok(report)
}

/// Generates the consolidated report for every employee between two dates.
///
/// # Errors
///
/// Returns `InvalidDateRange` before touching the store when `end_date`
/// precedes `start_date`.
pub fn generate_report_between<S: PunchStore + ?Sized>(
    store: &S,
    config: &ScheduleConfig,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> EngineResult<ConsolidatedReport> {
    let range = ReportRange::new(start_date, end_date)?;
    generate_consolidated_report(store, config, &ReportRequest::new(range))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DayStatus, PermissionClass, Source};
    use crate::store::InMemoryPunchStore;
    use chrono::{DateTime, NaiveDateTime, Utc};

    fn make_datetime(s: &str) -> DateTime<Utc> {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
            .unwrap()
            .and_utc()
    }

    fn make_date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn punch(source: Source, name: &str, at: &str) -> RawPunch {
        RawPunch::new(source, name, make_datetime(at))
    }

    fn employee(name: &str) -> Employee {
        Employee {
            key: EmployeeKey::TerminalOnly {
                terminal: normalize_name(name),
            },
            display_name: name.to_string(),
        }
    }

    fn single_day_request(date: &str) -> ReportRequest {
        ReportRequest::new(ReportRange::single_day(make_date(date)))
    }

    #[test]
    fn test_evaluate_day_rejects_stray_punch() {
        let ana = employee("Perez Ana");
        let mut group = DayPunchGroup::empty(ana.key.clone(), make_date("2025-08-18"));
        group
            .punches
            .push(punch(Source::Terminal, "PEREZ ANA", "2025-08-19 08:30:00"));

        let result = evaluate_day(&group, &ana, None, &ScheduleConfig::default());
        assert!(matches!(result, Err(EngineError::CalculationError { .. })));
    }

    #[test]
    fn test_evaluate_day_uses_fallback_area() {
        let ana = employee("Perez Ana");
        let group = DayPunchGroup::empty(ana.key.clone(), make_date("2025-08-18"));

        let evaluation = evaluate_day(&group, &ana, Some("Legal"), &ScheduleConfig::default()).unwrap();
        assert_eq!(evaluation.record.area.as_deref(), Some("Legal"));
        assert_eq!(evaluation.record.status, DayStatus::NoActivity);
    }

    #[test]
    fn test_unmatched_permission_label_is_not_kept() {
        let ana = employee("Perez Ana");
        let mut group = DayPunchGroup::empty(ana.key.clone(), make_date("2025-08-18"));
        group
            .punches
            .push(punch(Source::Terminal, "PEREZ ANA", "2025-08-18 08:30:00"));
        group.terminal_permission_label = Some("Vacaciones".to_string());

        let evaluation = evaluate_day(&group, &ana, None, &ScheduleConfig::default()).unwrap();
        assert_eq!(evaluation.record.permission_class, PermissionClass::None);
        assert_eq!(evaluation.record.permission_label, None);
    }

    #[test]
    fn test_out_of_range_punches_are_warned_and_ignored() {
        let punches = vec![
            punch(Source::Terminal, "PEREZ ANA", "2025-08-18 08:30:00"),
            punch(Source::Terminal, "PEREZ ANA", "2025-08-19 08:30:00"),
        ];

        let report = consolidate(punches, &ScheduleConfig::default(), &single_day_request("2025-08-18"));
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.warnings.len(), 1);
        assert_eq!(report.warnings[0].code, WarningCode::PunchOutsideRange);
    }

    #[test]
    fn test_weekend_without_punches_is_skipped() {
        // 2025-08-16 is a Saturday, 2025-08-18 a Monday.
        let punches = vec![punch(Source::Terminal, "PEREZ ANA", "2025-08-18 08:30:00")];
        let request = ReportRequest::new(
            ReportRange::new(make_date("2025-08-16"), make_date("2025-08-18")).unwrap(),
        );

        let report = consolidate(punches, &ScheduleConfig::default(), &request);
        let dates: Vec<_> = report.records.iter().map(|r| r.date).collect();
        assert_eq!(dates, vec![make_date("2025-08-18")]);
    }

    #[test]
    fn test_weekend_with_punches_is_reported() {
        let punches = vec![
            punch(Source::Terminal, "PEREZ ANA", "2025-08-16 09:00:00"),
            punch(Source::Terminal, "PEREZ ANA", "2025-08-16 13:00:00"),
        ];
        let report = consolidate(punches, &ScheduleConfig::default(), &single_day_request("2025-08-16"));
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].date, make_date("2025-08-16"));
    }

    #[test]
    fn test_records_sorted_by_name_then_date() {
        let punches = vec![
            punch(Source::Terminal, "ZAMBRANO LUIS", "2025-08-18 08:30:00"),
            punch(Source::Terminal, "ÁLVAREZ JOSÉ", "2025-08-19 08:30:00"),
            punch(Source::Terminal, "ÁLVAREZ JOSÉ", "2025-08-18 08:30:00"),
        ];
        let request = ReportRequest::new(
            ReportRange::new(make_date("2025-08-18"), make_date("2025-08-19")).unwrap(),
        );

        let report = consolidate(punches, &ScheduleConfig::default(), &request);
        let order: Vec<_> = report
            .records
            .iter()
            .map(|r| (r.employee_display_name.as_str(), r.date))
            .collect();
        assert_eq!(
            order,
            vec![
                ("Álvarez José", make_date("2025-08-18")),
                ("Álvarez José", make_date("2025-08-19")),
                ("Zambrano Luis", make_date("2025-08-18")),
                ("Zambrano Luis", make_date("2025-08-19")),
            ]
        );
    }

    #[test]
    fn test_filter_with_unknown_name_yields_no_records() {
        let store = InMemoryPunchStore::from_punches(vec![punch(
            Source::Terminal,
            "PEREZ ANA",
            "2025-08-18 08:30:00",
        )]);
        let request = single_day_request("2025-08-18").for_employee("Nobody Here");

        let report = generate_consolidated_report(&store, &ScheduleConfig::default(), &request).unwrap();
        assert!(report.records.is_empty());
    }

    #[test]
    fn test_generate_between_rejects_inverted_range() {
        let store = InMemoryPunchStore::new();
        let result = generate_report_between(
            &store,
            &ScheduleConfig::default(),
            make_date("2025-08-22"),
            make_date("2025-08-18"),
        );
        assert!(matches!(result, Err(EngineError::InvalidDateRange { .. })));
    }
}
