//! Punch store boundary.
//!
//! The report pipeline reads raw punches through the [`PunchStore`] trait
//! once per report. [`InMemoryPunchStore`] is the bundled implementation
//! used by tests, benchmarks and embedding services that load exports
//! into memory.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::error::{EngineError, EngineResult};
use crate::models::{RawPunch, RawPunchRecord, ReportWarning, Severity, WarningCode};

/// Read access to stored raw punches.
///
/// Implementations must answer concurrent read-only queries through
/// `&self`.
pub trait PunchStore {
    /// Returns every punch with `start <= timestamp < end`, in ascending
    /// timestamp order.
    fn punches_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EngineResult<Vec<RawPunch>>;
}

/// A punch store held entirely in memory, kept sorted by timestamp.
///
/// Punches with equal timestamps keep their insertion order.
///
/// # Example
///
/// ```
/// use attendance_engine::models::{RawPunch, Source};
/// use attendance_engine::store::{InMemoryPunchStore, PunchStore};
/// use chrono::{TimeZone, Utc};
///
/// let mut store = InMemoryPunchStore::new();
/// store.insert(RawPunch::new(
///     Source::Terminal,
///     "PEREZ ANA",
///     Utc.with_ymd_and_hms(2025, 8, 18, 8, 30, 0).unwrap(),
/// ));
///
/// let found = store
///     .punches_between(
///         Utc.with_ymd_and_hms(2025, 8, 18, 0, 0, 0).unwrap(),
///         Utc.with_ymd_and_hms(2025, 8, 19, 0, 0, 0).unwrap(),
///     )
///     .unwrap();
/// assert_eq!(found.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryPunchStore {
    punches: Vec<RawPunch>,
}

impl InMemoryPunchStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the given punches.
    pub fn from_punches(punches: impl IntoIterator<Item = RawPunch>) -> Self {
        let mut punches: Vec<RawPunch> = punches.into_iter().collect();
        punches.sort_by_key(|p| p.timestamp);
        Self { punches }
    }

    /// Adds one punch.
    pub fn insert(&mut self, punch: RawPunch) {
        let position = self
            .punches
            .partition_point(|existing| existing.timestamp <= punch.timestamp);
        self.punches.insert(position, punch);
    }

    /// Converts and adds ingestion records.
    ///
    /// Records that cannot be converted are dropped; each one yields a
    /// [`WarningCode::MalformedPunch`] warning in input order.
    pub fn ingest(&mut self, records: impl IntoIterator<Item = RawPunchRecord>) -> Vec<ReportWarning> {
        let mut warnings = Vec::new();
        let mut accepted = 0usize;

        for record in records {
            match RawPunch::try_from(record) {
                Ok(punch) => {
                    self.insert(punch);
                    accepted += 1;
                }
                Err(EngineError::MalformedPunch { reference, message }) => {
                    warn!(reference = %reference, reason = %message, "Dropping malformed punch");
                    warnings.push(ReportWarning::new(
                        WarningCode::MalformedPunch,
                        Severity::Medium,
                        format!("{}: {}", reference, message),
                    ));
                }
                Err(other) => {
                    warn!(error = %other, "Dropping punch record");
                    warnings.push(ReportWarning::new(
                        WarningCode::MalformedPunch,
                        Severity::Medium,
                        other.to_string(),
                    ));
                }
            }
        }

        debug!(accepted, rejected = warnings.len(), "Ingested punch records");
        warnings
    }

    /// Number of stored punches.
    pub fn len(&self) -> usize {
        self.punches.len()
    }

    /// Returns true when the store holds no punches.
    pub fn is_empty(&self) -> bool {
        self.punches.is_empty()
    }
}

impl PunchStore for InMemoryPunchStore {
    fn punches_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> EngineResult<Vec<RawPunch>> {
        if end < start {
            return Err(EngineError::StoreError {
                message: format!("query end {} precedes start {}", end, start),
            });
        }
        let from = self.punches.partition_point(|p| p.timestamp < start);
        let to = self.punches.partition_point(|p| p.timestamp < end);
        Ok(self.punches[from..to].to_vec())
    }
}
