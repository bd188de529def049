//! Shared utilities for the cleaning pipeline.
//!
//! Cell-level parsing helpers used by several stages. None of them fail:
//! a value that cannot be parsed is reported as `None`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeDelta};

// =============================================================================
// Numeric Parsing
// =============================================================================

/// Parse a cell as a finite `f64`.
///
/// Surrounding whitespace is ignored. Empty strings, non-numeric text and
/// `NaN`/`inf` spellings yield `None`.
///
/// # Example
///
/// ```rust,ignore
/// use survey_cleaning::utils::parse_numeric_string;
///
/// assert_eq!(parse_numeric_string(" 2.3 "), Some(2.3));
/// assert_eq!(parse_numeric_string("abc"), None);
/// ```
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Round to a fixed number of decimal places, ties to even.
///
/// `round_to(3.125, 2)` is `3.12` and `round_to(3.135, 2)` is `3.14`.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round_ties_even() / factor
}

// =============================================================================
// Timestamp Parsing
// =============================================================================

/// Datetime layouts accepted in the Timestamp column, tried in order.
const DATETIME_FORMATS: [&str; 10] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    // Google Forms exports
    "%Y/%m/%d %I:%M:%S %p",
    "%m/%d/%Y %I:%M:%S %p",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts; the time defaults to midnight.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse a Timestamp cell.
///
/// Offsets in RFC 3339 input and trailing `GMT+h[:mm]` suffixes are
/// normalized to UTC.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.naive_utc());
    }

    if let Some((local, offset)) = split_gmt_suffix(trimmed) {
        return parse_naive(local)?.checked_sub_signed(offset);
    }

    parse_naive(trimmed)
}

/// Split `"<local time> GMT+1"` into the local part and its UTC offset.
///
/// A bare `GMT` suffix is a zero offset. Offsets beyond 14 hours are rejected.
fn split_gmt_suffix(s: &str) -> Option<(&str, TimeDelta)> {
    let (local, suffix) = s.rsplit_once(" GMT")?;
    if suffix.is_empty() {
        return Some((local.trim_end(), TimeDelta::zero()));
    }

    let sign = match suffix.as_bytes()[0] {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let (hours, minutes) = match suffix[1..].split_once(':') {
        Some((h, m)) => (h.parse::<u32>().ok()?, m.parse::<u32>().ok()?),
        None => (suffix[1..].parse::<u32>().ok()?, 0),
    };
    if hours > 14 || minutes > 59 {
        return None;
    }

    Some((
        local.trim_end(),
        TimeDelta::minutes(sign * i64::from(hours * 60 + minutes)),
    ))
}

fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Convert epoch milliseconds back to a naive UTC datetime.
pub fn millis_to_datetime(millis: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp_millis(millis).map(|dt| dt.naive_utc())
}

// =============================================================================
// Text Utilities
// =============================================================================

/// Title-case a string: the first letter of every alphabetic run is
/// upper-cased and the rest lower-cased.
///
/// # Example
///
/// ```rust,ignore
/// use survey_cleaning::utils::title_case;
///
/// assert_eq!(title_case("fEMALE"), "Female");
/// assert_eq!(title_case("non-binary"), "Non-Binary");
/// ```
pub fn title_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut at_word_start = true;

    for c in s.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                result.extend(c.to_uppercase());
            } else {
                result.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            result.push(c);
            at_word_start = true;
        }
    }

    result
}

// =============================================================================
// Tests
// =============================================================================
