//! Raw punch model and related types.
//!
//! This module defines the [`RawPunch`] struct for representing a single
//! timestamped event from one of the two attendance sources, together with
//! the [`RawPunchRecord`] wire shape submitted by the ingestion workers.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// One of the two independent attendance systems.
///
/// The ordering places the terminal (primary) source first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// The access-control terminal system. Authoritative for scheduled movements.
    Terminal,
    /// The biometric clock. Preferred for on-time evidence at entry.
    Biometric,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Terminal => write!(f, "Terminal"),
            Source::Biometric => write!(f, "Biometric"),
        }
    }
}

/// The semantic meaning assigned to a punch within a day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Arrival at the start of the workday.
    Entry,
    /// Leaving for lunch.
    LunchOut,
    /// Returning from lunch.
    LunchIn,
    /// Departure at the end of the workday.
    Exit,
}

impl Role {
    /// All roles in the order they occur during a regular day.
    pub const ALL: [Role; 4] = [Role::Entry, Role::LunchOut, Role::LunchIn, Role::Exit];
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Entry => write!(f, "Entry"),
            Role::LunchOut => write!(f, "Lunch Out"),
            Role::LunchIn => write!(f, "Lunch In"),
            Role::Exit => write!(f, "Exit"),
        }
    }
}

/// Role flags reported by the source alongside a punch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleHints {
    /// The source marked the punch as an entry.
    pub is_entry: bool,
    /// The source marked the punch as an exit.
    pub is_exit: bool,
    /// The source marked the punch as leaving for lunch.
    pub is_lunch_out: bool,
    /// The source marked the punch as returning from lunch.
    pub is_lunch_in: bool,
}

impl RoleHints {
    /// Hints carrying exactly one role.
    pub fn only(role: Role) -> Self {
        let mut hints = Self::default();
        match role {
            Role::Entry => hints.is_entry = true,
            Role::LunchOut => hints.is_lunch_out = true,
            Role::LunchIn => hints.is_lunch_in = true,
            Role::Exit => hints.is_exit = true,
        }
        hints
    }

    fn flagged(&self) -> impl Iterator<Item = Role> + '_ {
        [
            (self.is_entry, Role::Entry),
            (self.is_lunch_out, Role::LunchOut),
            (self.is_lunch_in, Role::LunchIn),
            (self.is_exit, Role::Exit),
        ]
        .into_iter()
        .filter_map(|(set, role)| set.then_some(role))
    }

    /// Returns the hinted role when exactly one flag is set.
    ///
    /// # Example
    ///
    /// ```
    /// use attendance_engine::models::{Role, RoleHints};
    ///
    /// assert_eq!(RoleHints::only(Role::Exit).role(), Some(Role::Exit));
    /// assert_eq!(RoleHints::default().role(), None);
    /// ```
    pub fn role(&self) -> Option<Role> {
        let mut flagged = self.flagged();
        match (flagged.next(), flagged.next()) {
            (Some(role), None) => Some(role),
            _ => None,
        }
    }

    /// Returns true when more than one flag is set.
    pub fn is_ambiguous(&self) -> bool {
        self.flagged().count() > 1
    }
}

/// A single timestamped attendance event from one source.
///
/// Punches are immutable once ingested. `area` and `permission_label` are
/// only meaningful on terminal punches; the grouper ignores them on
/// biometric ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPunch {
    /// The system that recorded the punch.
    pub source: Source,
    /// The person's name exactly as the source spelled it.
    pub person_name: String,
    /// When the punch happened. Sources record wall-clock time as UTC.
    pub timestamp: DateTime<Utc>,
    /// Free-text label from the source (e.g. "entrada", "salida").
    #[serde(default)]
    pub label: String,
    /// Role flags from the source.
    #[serde(default)]
    pub role_hints: RoleHints,
    /// Organizational area of the employee, if the source knows it.
    #[serde(default)]
    pub area: Option<String>,
    /// Free-text leave/permission label attached to the punch's day.
    #[serde(default)]
    pub permission_label: Option<String>,
}

impl RawPunch {
    /// Creates a punch without label, hints or terminal metadata.
    pub fn new(source: Source, person_name: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            source,
            person_name: person_name.into(),
            timestamp,
            label: String::new(),
            role_hints: RoleHints::default(),
            area: None,
            permission_label: None,
        }
    }

    /// Returns the time-of-day component used by every schedule rule.
    pub fn time_of_day(&self) -> NaiveTime {
        self.timestamp.time()
    }

    /// Returns the UTC calendar date the punch belongs to.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

/// The shape in which ingestion workers submit punches.
///
/// Timestamps arrive as text and names may be missing, so conversion into a
/// [`RawPunch`] can fail with [`EngineError::MalformedPunch`].
///
/// # Example
///
/// ```
/// use attendance_engine::models::{RawPunch, RawPunchRecord, Source};
///
/// let json = r#"{
///     "source": "biometric",
///     "person_name": "Ana Pérez",
///     "timestamp": "2025-08-18 08:25:00",
///     "label": "entrada",
///     "is_entry": true
/// }"#;
/// let record: RawPunchRecord = serde_json::from_str(json).unwrap();
/// let punch = RawPunch::try_from(record).unwrap();
/// assert_eq!(punch.source, Source::Biometric);
/// assert!(punch.role_hints.is_entry);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPunchRecord {
    /// The system that recorded the punch.
    pub source: Source,
    /// The person's name as exported by the source.
    #[serde(default)]
    pub person_name: Option<String>,
    /// RFC 3339, or `YYYY-MM-DD HH:MM[:SS]` read as UTC.
    pub timestamp: String,
    /// Free-text label.
    #[serde(default)]
    pub label: Option<String>,
    /// Role flags, flattened into the record.
    #[serde(flatten)]
    pub role_hints: RoleHints,
    /// Organizational area (terminal exports only).
    #[serde(default)]
    pub area: Option<String>,
    /// Leave/permission text (terminal exports only).
    #[serde(default)]
    pub permission_label: Option<String>,
}

const NAIVE_TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parses a punch timestamp.
///
/// Accepts RFC 3339 (any offset, converted to UTC) or a naive
/// `YYYY-MM-DD HH:MM[:SS]` value taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl TryFrom<RawPunchRecord> for RawPunch {
    type Error = EngineError;

    fn try_from(record: RawPunchRecord) -> EngineResult<Self> {
        let person_name = non_blank(record.person_name).ok_or_else(|| {
            EngineError::MalformedPunch {
                reference: format!("{} punch at '{}'", record.source, record.timestamp),
                message: "empty person name".to_string(),
            }
        })?;

        let timestamp =
            parse_timestamp(&record.timestamp).ok_or_else(|| EngineError::MalformedPunch {
                reference: person_name.clone(),
                message: format!("unparsable timestamp '{}'", record.timestamp),
            })?;

        Ok(RawPunch {
            source: record.source,
            person_name,
            timestamp,
            label: record.label.unwrap_or_default(),
            role_hints: record.role_hints,
            area: non_blank(record.area),
            permission_label: non_blank(record.permission_label),
        })
    }
}
