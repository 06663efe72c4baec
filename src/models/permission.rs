//! Permission classification model.
//!
//! This module contains the [`PermissionClass`] tagged variant derived from
//! the free-text leave label attached to a terminal day.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An approved absence/leave classification that shrinks the expected workday.
///
/// # Example
///
/// ```
/// use attendance_engine::models::PermissionClass;
/// use rust_decimal::Decimal;
///
/// assert!(!PermissionClass::None.is_active());
/// assert_eq!(
///     PermissionClass::MedicalAppointment.default_expected_hours(),
///     Some(Decimal::from(6))
/// );
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PermissionClass {
    /// No permission; the regular schedule applies.
    #[default]
    None,
    /// Official business away from the workplace.
    OfficialDuty,
    /// Personal matters.
    PersonalMatter,
    /// Family calamity.
    Calamity,
    /// Illness.
    Illness,
    /// Medical appointment.
    MedicalAppointment,
    /// Rehabilitation session.
    Rehabilitation,
}

impl PermissionClass {
    /// Returns true for every class other than [`PermissionClass::None`].
    pub fn is_active(&self) -> bool {
        *self != PermissionClass::None
    }

    /// The expected worked duration of a day under this class, in hours.
    ///
    /// `None` leaves the standard schedule unchanged and has no value of
    /// its own.
    pub fn default_expected_hours(&self) -> Option<Decimal> {
        match self {
            PermissionClass::None => None,
            PermissionClass::OfficialDuty => Some(Decimal::from(8)),
            PermissionClass::PersonalMatter
            | PermissionClass::Calamity
            | PermissionClass::Illness => Some(Decimal::from(4)),
            PermissionClass::MedicalAppointment | PermissionClass::Rehabilitation => {
                Some(Decimal::from(6))
            }
        }
    }
}

impl std::fmt::Display for PermissionClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PermissionClass::None => "None",
            PermissionClass::OfficialDuty => "Official Duty",
            PermissionClass::PersonalMatter => "Personal Matter",
            PermissionClass::Calamity => "Calamity",
            PermissionClass::Illness => "Illness",
            PermissionClass::MedicalAppointment => "Medical Appointment",
            PermissionClass::Rehabilitation => "Rehabilitation",
        };
        write!(f, "{}", label)
    }
}
