//! Reconciliation logic for the attendance engine.
//!
//! This module contains the rules that turn raw punches from the terminal
//! and biometric sources into consolidated day records: name
//! normalization, identity resolution, daily grouping, event
//! classification, source arbitration, the permission policy, shortfall
//! and status evaluation, and the report assembler that runs them in
//! order.

mod arbitration;
mod assembler;
mod classifier;
mod grouping;
mod identity;
mod name_normalizer;
mod permission_policy;
mod shortfall;
mod status;

pub use arbitration::{ArbitrationResult, ResolvedTime, arbitrate, prioritized_entry_source};
pub use assembler::{
    DayEvaluation, consolidate, evaluate_day, generate_consolidated_report,
    generate_report_between,
};
pub use classifier::{ClassifiedDay, ClassifiedPunch, RoleOrigin, classify_day, label_role};
pub use grouping::group_by_day;
pub use identity::{
    IdentityLink, IdentityMap, IdentityResolution, MIN_LINK_SCORE, match_score,
    resolve_identities,
};
pub use name_normalizer::{normalize_name, title_case};
pub use permission_policy::{classify_permission, infer_permission_exit};
pub use shortfall::{ShortfallResult, calculate_shortfall};
pub use status::{StatusInput, evaluate_status, permission_allowance_minutes};
