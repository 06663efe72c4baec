//! Employee identity and per-day punch grouping models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{RawPunch, Source};

/// The resolved identity of one employee within a report run.
///
/// Identities are normalized names; they are never persisted and only live
/// for the duration of one report.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EmployeeKey {
    /// A terminal identity matched to a biometric identity.
    Linked {
        /// Normalized terminal name ("<lastname> <firstname>").
        terminal: String,
        /// Normalized biometric name ("<firstname> <lastname>").
        biometric: String,
    },
    /// A terminal identity with no qualifying biometric match.
    TerminalOnly {
        /// Normalized terminal name.
        terminal: String,
    },
    /// A biometric identity never claimed by a terminal identity.
    BiometricOnly {
        /// Normalized biometric name.
        biometric: String,
    },
}

impl EmployeeKey {
    /// Returns the normalized identity this key holds for a source, if any.
    pub fn identity_for(&self, source: Source) -> Option<&str> {
        match (self, source) {
            (EmployeeKey::Linked { terminal, .. }, Source::Terminal)
            | (EmployeeKey::TerminalOnly { terminal }, Source::Terminal) => Some(terminal.as_str()),
            (EmployeeKey::Linked { biometric, .. }, Source::Biometric)
            | (EmployeeKey::BiometricOnly { biometric }, Source::Biometric) => Some(biometric.as_str()),
            _ => None,
        }
    }
}

/// A resolved employee and the name shown for them in reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// The identity key.
    pub key: EmployeeKey,
    /// Title-cased display name.
    pub display_name: String,
}

/// All punches of one employee on one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayPunchGroup {
    /// The employee the punches belong to.
    pub employee_key: EmployeeKey,
    /// The UTC calendar date.
    pub date: NaiveDate,
    /// Punches from both sources, ascending by timestamp.
    pub punches: Vec<RawPunch>,
    /// First non-blank permission label found on a terminal punch of the day.
    pub terminal_permission_label: Option<String>,
    /// First non-blank area found on a terminal punch of the day.
    pub area: Option<String>,
}

impl DayPunchGroup {
    /// An empty group for a day without punches.
    pub fn empty(employee_key: EmployeeKey, date: NaiveDate) -> Self {
        Self {
            employee_key,
            date,
            punches: Vec::new(),
            terminal_permission_label: None,
            area: None,
        }
    }

    /// Returns true when neither source reported anything for the day.
    pub fn is_empty(&self) -> bool {
        self.punches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_for_linked_key() {
        let key = EmployeeKey::Linked {
            terminal: "perez ana".to_string(),
            biometric: "ana perez".to_string(),
        };
        assert_eq!(key.identity_for(Source::Terminal), Some("perez ana"));
        assert_eq!(key.identity_for(Source::Biometric), Some("ana perez"));
    }

    #[test]
    fn test_identity_for_standalone_keys() {
        let terminal = EmployeeKey::TerminalOnly {
            terminal: "perez ana".to_string(),
        };
        assert_eq!(terminal.identity_for(Source::Biometric), None);

        let biometric = EmployeeKey::BiometricOnly {
            biometric: "ana perez".to_string(),
        };
        assert_eq!(biometric.identity_for(Source::Terminal), None);
        assert_eq!(biometric.identity_for(Source::Biometric), Some("ana perez"));
    }

    #[test]
    fn test_empty_group() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 18).unwrap();
        let group = DayPunchGroup::empty(
            EmployeeKey::TerminalOnly {
                terminal: "perez ana".to_string(),
            },
            date,
        );
        assert!(group.is_empty());
        assert_eq!(group.terminal_permission_label, None);
    }

    #[test]
    fn test_key_serialization_is_tagged() {
        let key = EmployeeKey::BiometricOnly {
            biometric: "ana perez".to_string(),
        };
        let json = serde_json::to_string(&key).unwrap();
        assert_eq!(json, r#"{"kind":"biometric_only","biometric":"ana perez"}"#);
    }
}
