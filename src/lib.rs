//! Attendance reconciliation engine.
//!
//! This crate merges time-clock punches from two unsynchronized sources, an
//! access-control terminal and a biometric clock, into one consolidated
//! record per employee and day, with a status that accounts for lateness,
//! missing punches and approved permissions.
//!
//! # Example
//!
//! ```
//! use attendance_engine::config::ScheduleConfig;
//! use attendance_engine::models::{RawPunch, ReportRange, ReportRequest, Source};
//! use attendance_engine::reconciliation::generate_consolidated_report;
//! use attendance_engine::store::InMemoryPunchStore;
//! use chrono::{NaiveDate, TimeZone, Utc};
//!
//! let store = InMemoryPunchStore::from_punches(vec![
//!     RawPunch::new(Source::Biometric, "Ana Pérez", Utc.with_ymd_and_hms(2025, 8, 18, 8, 25, 0).unwrap()),
//!     RawPunch::new(Source::Biometric, "Ana Pérez", Utc.with_ymd_and_hms(2025, 8, 18, 17, 5, 0).unwrap()),
//! ]);
//! let range = ReportRange::single_day(NaiveDate::from_ymd_opt(2025, 8, 18).unwrap());
//!
//! let report = generate_consolidated_report(
//!     &store,
//!     &ScheduleConfig::default(),
//!     &ReportRequest::new(range),
//! )
//! .unwrap();
//! assert_eq!(report.records[0].status_label(), "Complete");
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod models;
pub mod reconciliation;
pub mod store;
