//! Name canonicalization.
//!
//! This module provides [`normalize_name`], the comparison form of a person
//! name used by identity matching and the employee filter, and
//! [`title_case`], the display form shown in reports.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Canonicalizes a free-text person name for comparison.
///
/// Steps: lower-case, fold `ñ` to `n`, decompose accented characters and
/// drop the combining marks, collapse whitespace runs to one space, trim.
/// The function is total: empty input yields an empty string.
///
/// # Example
///
/// ```
/// use attendance_engine::reconciliation::normalize_name;
///
/// assert_eq!(normalize_name("  PÉREZ   Muñoz  Ana "), "perez munoz ana");
/// assert_eq!(normalize_name(""), "");
/// ```
pub fn normalize_name(raw: &str) -> String {
    let folded: String = raw
        .to_lowercase()
        .replace('ñ', "n")
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Renders a raw name for display: whitespace collapsed, each word
/// capitalized, accents preserved.
///
/// # Example
///
/// ```
/// use attendance_engine::reconciliation::title_case;
///
/// assert_eq!(title_case("PÉREZ  muñoz ana"), "Pérez Muñoz Ana");
/// ```
pub fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
