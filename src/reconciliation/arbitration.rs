//! Source arbitration.
//!
//! This module merges the per-source role candidates of a classified day
//! into one time per role and records which source supplied each one.

use chrono::{DateTime, NaiveTime, Utc};

use crate::config::ScheduleConfig;
use crate::models::{Role, Source};

use super::classifier::{ClassifiedDay, ClassifiedPunch, RoleOrigin};

/// A role's chosen time and its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTime {
    /// The role this time fills.
    pub role: Role,
    /// The chosen instant.
    pub timestamp: DateTime<Utc>,
    /// The source that supplied it.
    pub source: Source,
    /// Provenance tag, e.g. `"Entry: Biometric (prioritized)"`.
    pub tag: String,
}

/// The merged roles of one day.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ArbitrationResult {
    /// Resolved entry.
    pub entry: Option<ResolvedTime>,
    /// Resolved lunch-out.
    pub lunch_out: Option<ResolvedTime>,
    /// Resolved lunch-in.
    pub lunch_in: Option<ResolvedTime>,
    /// Resolved exit.
    pub exit: Option<ResolvedTime>,
    /// One line per decision, for debug logging.
    pub reasoning: Vec<String>,
}

impl ArbitrationResult {
    /// Returns the resolved time for a role.
    pub fn get(&self, role: Role) -> Option<&ResolvedTime> {
        match role {
            Role::Entry => self.entry.as_ref(),
            Role::LunchOut => self.lunch_out.as_ref(),
            Role::LunchIn => self.lunch_in.as_ref(),
            Role::Exit => self.exit.as_ref(),
        }
    }

    fn slot(&mut self, role: Role) -> &mut Option<ResolvedTime> {
        match role {
            Role::Entry => &mut self.entry,
            Role::LunchOut => &mut self.lunch_out,
            Role::LunchIn => &mut self.lunch_in,
            Role::Exit => &mut self.exit,
        }
    }

    /// Provenance tags in role order.
    pub fn sources_used(&self) -> Vec<String> {
        Role::ALL
            .iter()
            .filter_map(|role| self.get(*role))
            .map(|resolved| resolved.tag.clone())
            .collect()
    }
}

/// Decides which source's entry to keep when both supplied one.
///
/// The biometric entry wins only when it evidences an on-time arrival the
/// terminal missed: terminal after the anchor, biometric at or before it.
///
/// # Example
///
/// ```
/// use attendance_engine::models::Source;
/// use attendance_engine::reconciliation::prioritized_entry_source;
/// use chrono::NaiveTime;
///
/// let anchor = NaiveTime::from_hms_opt(8, 40, 0).unwrap();
/// let terminal = NaiveTime::from_hms_opt(9, 10, 0).unwrap();
/// let biometric = NaiveTime::from_hms_opt(8, 38, 0).unwrap();
/// assert_eq!(prioritized_entry_source(terminal, biometric, anchor), Source::Biometric);
/// assert_eq!(prioritized_entry_source(biometric, terminal, anchor), Source::Terminal);
/// ```
pub fn prioritized_entry_source(terminal: NaiveTime, biometric: NaiveTime, anchor: NaiveTime) -> Source {
    if terminal > anchor && biometric <= anchor {
        Source::Biometric
    } else {
        Source::Terminal
    }
}

fn resolve(role: Role, punch: &ClassifiedPunch, tag: String) -> ResolvedTime {
    ResolvedTime {
        role,
        timestamp: punch.timestamp,
        source: punch.source,
        tag,
    }
}

/// Merges the per-source candidates of a classified day.
///
/// - A role supplied by one source is taken from it and tagged
///   `"<Role>: <Source>"`, or `"Exit: <Source> (permission)"` when the
///   permission policy inferred it.
/// - An entry supplied by both sources goes through
///   [`prioritized_entry_source`] and is tagged `"(prioritized)"`.
/// - Any other role supplied by both sources is taken from the terminal.
pub fn arbitrate(day: &ClassifiedDay, config: &ScheduleConfig) -> ArbitrationResult {
    let mut result = ArbitrationResult::default();
    let anchor = config.entry_anchor();

    for role in Role::ALL {
        let terminal = day.candidate(Source::Terminal, role);
        let biometric = day.candidate(Source::Biometric, role);

        let resolved = match (terminal, biometric) {
            (None, None) => None,
            (Some(only), None) | (None, Some(only)) => {
                let tag = if only.origin == RoleOrigin::Permission {
                    format!("{}: {} (permission)", role, only.source)
                } else {
                    format!("{}: {}", role, only.source)
                };
                result.reasoning.push(format!(
                    "{} taken from {} at {}",
                    role,
                    only.source,
                    only.timestamp.format("%H:%M:%S")
                ));
                Some(resolve(role, only, tag))
            }
            (Some(t), Some(b)) if role == Role::Entry => {
                let (t_time, b_time) = (t.timestamp.time(), b.timestamp.time());
                let winner = match prioritized_entry_source(t_time, b_time, anchor) {
                    Source::Terminal => t,
                    Source::Biometric => b,
                };
                result.reasoning.push(format!(
                    "Entry: terminal {} vs biometric {} against anchor {}; chose {}",
                    t_time.format("%H:%M:%S"),
                    b_time.format("%H:%M:%S"),
                    anchor.format("%H:%M"),
                    winner.source
                ));
                Some(resolve(
                    role,
                    winner,
                    format!("{}: {} (prioritized)", role, winner.source),
                ))
            }
            (Some(t), Some(b)) => {
                result.reasoning.push(format!(
                    "{}: both sources reported ({} vs {}); terminal preferred",
                    role,
                    t.timestamp.format("%H:%M:%S"),
                    b.timestamp.format("%H:%M:%S")
                ));
                Some(resolve(role, t, format!("{}: {}", role, t.source)))
            }
        };

        *result.slot(role) = resolved;
    }

    result
}
