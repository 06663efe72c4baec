//! Cross-source identity resolution.
//!
//! The terminal system spells names "<lastname> <firstname>" while the
//! biometric clock spells them "<firstname> <lastname>". This module links
//! the two spellings of the same person with a two-phase pass: every
//! candidate pair is scored first, then pairs are accepted greedily in a
//! fixed order so the result never depends on hash iteration.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};

use tracing::warn;

use crate::models::{Employee, EmployeeKey, RawPunch, ReportWarning, Severity, Source, WarningCode};

use super::name_normalizer::{normalize_name, title_case};

/// Minimum score a pair must exceed to be linked.
///
/// A single shared token (typically a common first name) is too weak.
pub const MIN_LINK_SCORE: usize = 1;

/// A terminal identity linked to a biometric identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityLink {
    /// Normalized terminal name.
    pub terminal: String,
    /// Normalized biometric name.
    pub biometric: String,
    /// The score the link was accepted with.
    pub score: usize,
}

/// Counts the biometric name tokens that appear as substrings of the
/// terminal name.
///
/// Both arguments are expected in normalized form.
///
/// # Example
///
/// ```
/// use attendance_engine::reconciliation::match_score;
///
/// assert_eq!(match_score("perez gomez ana", "ana perez"), 2);
/// assert_eq!(match_score("perez gomez ana", "ana torres"), 1);
/// ```
pub fn match_score(terminal: &str, biometric: &str) -> usize {
    biometric
        .split_whitespace()
        .filter(|token| terminal.contains(*token))
        .count()
}

/// A distinct identity observed in one source, in first-seen order.
#[derive(Debug, Clone)]
struct Observed {
    normalized: String,
    raw: String,
}

fn observe(punches: &[RawPunch], source: Source) -> Vec<Observed> {
    let mut seen = HashSet::new();
    let mut observed = Vec::new();
    for punch in punches.iter().filter(|p| p.source == source) {
        let normalized = normalize_name(&punch.person_name);
        if normalized.is_empty() || !seen.insert(normalized.clone()) {
            continue;
        }
        observed.push(Observed {
            normalized,
            raw: punch.person_name.clone(),
        });
    }
    observed
}

/// The outcome of identity resolution for one report run.
///
/// Maps each normalized name of either source onto the [`EmployeeKey`] it
/// belongs to. The linking is injective in both directions.
#[derive(Debug, Clone, Default)]
pub struct IdentityMap {
    links: Vec<IdentityLink>,
    employees: Vec<Employee>,
    by_terminal: HashMap<String, EmployeeKey>,
    by_biometric: HashMap<String, EmployeeKey>,
}

impl IdentityMap {
    /// Accepted links, strongest first.
    pub fn links(&self) -> &[IdentityLink] {
        &self.links
    }

    /// Every resolved employee: linked ones first, then terminal-only, then
    /// biometric-only, each in first-seen order.
    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    /// Looks up the employee a normalized name of the given source belongs to.
    pub fn key_for(&self, source: Source, normalized: &str) -> Option<&EmployeeKey> {
        match source {
            Source::Terminal => self.by_terminal.get(normalized),
            Source::Biometric => self.by_biometric.get(normalized),
        }
    }

    /// Looks up the employee a punch belongs to.
    pub fn key_for_punch(&self, punch: &RawPunch) -> Option<&EmployeeKey> {
        self.key_for(punch.source, &normalize_name(&punch.person_name))
    }

    /// Finds the employee whose terminal or biometric identity equals the
    /// normalized form of `name`.
    pub fn find(&self, name: &str) -> Option<&Employee> {
        let wanted = normalize_name(name);
        self.employees.iter().find(|employee| {
            employee.key.identity_for(Source::Terminal) == Some(wanted.as_str())
                || employee.key.identity_for(Source::Biometric) == Some(wanted.as_str())
        })
    }
}

/// Identity resolution output plus the anomalies noticed along the way.
#[derive(Debug, Clone)]
pub struct IdentityResolution {
    /// The resolved identities.
    pub map: IdentityMap,
    /// Low-confidence matches decided by first-seen order.
    pub warnings: Vec<ReportWarning>,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    score: usize,
    terminal: usize,
    biometric: usize,
}

/// Resolves the identities of every punch in a report window.
///
/// `punches` must already be in chronological order; that order defines
/// which spelling counts as first seen.
///
/// Phase one scores every (terminal, biometric) pair and keeps those
/// scoring above [`MIN_LINK_SCORE`]. Phase two sorts them by score
/// descending, then terminal first-seen index, then biometric first-seen
/// index, and accepts a pair when neither side is already claimed.
/// A pair accepted while an equally scored rival was still open is
/// reported as a [`WarningCode::LowConfidenceMatch`].
///
/// # Example
///
/// ```
/// use attendance_engine::models::{RawPunch, Source, EmployeeKey};
/// use attendance_engine::reconciliation::resolve_identities;
/// use chrono::{TimeZone, Utc};
///
/// let at = Utc.with_ymd_and_hms(2025, 8, 18, 8, 30, 0).unwrap();
/// let punches = vec![
///     RawPunch::new(Source::Terminal, "PEREZ GOMEZ ANA", at),
///     RawPunch::new(Source::Biometric, "Ana Pérez", at),
/// ];
///
/// let resolution = resolve_identities(&punches);
/// assert_eq!(resolution.map.links().len(), 1);
/// assert_eq!(
///     resolution.map.employees()[0].key,
///     EmployeeKey::Linked {
///         terminal: "perez gomez ana".to_string(),
///         biometric: "ana perez".to_string(),
///     }
/// );
/// ```
pub fn resolve_identities(punches: &[RawPunch]) -> IdentityResolution {
    let terminals = observe(punches, Source::Terminal);
    let biometrics = observe(punches, Source::Biometric);

    let mut candidates: Vec<Candidate> = Vec::new();
    for (t_idx, terminal) in terminals.iter().enumerate() {
        for (b_idx, biometric) in biometrics.iter().enumerate() {
            let score = match_score(&terminal.normalized, &biometric.normalized);
            if score > MIN_LINK_SCORE {
                candidates.push(Candidate {
                    score,
                    terminal: t_idx,
                    biometric: b_idx,
                });
            }
        }
    }
    candidates.sort_by_key(|c| (Reverse(c.score), c.terminal, c.biometric));

    let mut terminal_claimed = vec![false; terminals.len()];
    let mut biometric_claimed = vec![false; biometrics.len()];
    let mut links = Vec::new();
    let mut warnings = Vec::new();

    for candidate in &candidates {
        if terminal_claimed[candidate.terminal] || biometric_claimed[candidate.biometric] {
            continue;
        }

        let rivals = candidates
            .iter()
            .filter(|other| {
                other.score == candidate.score
                    && (other.terminal == candidate.terminal) != (other.biometric == candidate.biometric)
                    && !terminal_claimed[other.terminal]
                    && !biometric_claimed[other.biometric]
            })
            .count();

        let terminal = &terminals[candidate.terminal];
        let biometric = &biometrics[candidate.biometric];

        if rivals > 0 {
            warn!(
                terminal = %terminal.normalized,
                biometric = %biometric.normalized,
                score = candidate.score,
                rivals,
                "Identity match decided by first-seen order"
            );
            warnings.push(ReportWarning {
                code: WarningCode::LowConfidenceMatch,
                severity: Severity::Low,
                employee: Some(title_case(&terminal.raw)),
                date: None,
                message: format!(
                    "'{}' linked to '{}' with score {} by first-seen order over {} equally scored candidate(s)",
                    terminal.normalized, biometric.normalized, candidate.score, rivals
                ),
            });
        }

        terminal_claimed[candidate.terminal] = true;
        biometric_claimed[candidate.biometric] = true;
        links.push((candidate.terminal, candidate.biometric, candidate.score));
    }

    let mut map = IdentityMap::default();

    // Linked employees are listed in terminal first-seen order.
    let mut linked = links.clone();
    linked.sort_by_key(|(t_idx, _, _)| *t_idx);
    for (t_idx, b_idx, score) in linked {
        let terminal = &terminals[t_idx];
        let biometric = &biometrics[b_idx];
        let key = EmployeeKey::Linked {
            terminal: terminal.normalized.clone(),
            biometric: biometric.normalized.clone(),
        };
        map.by_terminal.insert(terminal.normalized.clone(), key.clone());
        map.by_biometric.insert(biometric.normalized.clone(), key.clone());
        map.employees.push(Employee {
            key,
            display_name: title_case(&terminal.raw),
        });
        map.links.push(IdentityLink {
            terminal: terminal.normalized.clone(),
            biometric: biometric.normalized.clone(),
            score,
        });
    }
    map.links.sort_by(|a, b| b.score.cmp(&a.score));

    for (t_idx, terminal) in terminals.iter().enumerate() {
        if terminal_claimed[t_idx] {
            continue;
        }
        let key = EmployeeKey::TerminalOnly {
            terminal: terminal.normalized.clone(),
        };
        map.by_terminal.insert(terminal.normalized.clone(), key.clone());
        map.employees.push(Employee {
            key,
            display_name: title_case(&terminal.raw),
        });
    }

    for (b_idx, biometric) in biometrics.iter().enumerate() {
        if biometric_claimed[b_idx] {
            continue;
        }
        let key = EmployeeKey::BiometricOnly {
            biometric: biometric.normalized.clone(),
        };
        map.by_biometric.insert(biometric.normalized.clone(), key.clone());
        map.employees.push(Employee {
            key,
            display_name: title_case(&biometric.raw),
        });
    }

    IdentityResolution { map, warnings }
}
