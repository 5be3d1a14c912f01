//! DDMS date formats.
//!
//! DDMS dates are a union of `xs:dateTime`, `xs:date`, `xs:gYearMonth` and
//! `xs:gYear`. Values are kept verbatim on components (so rendering is
//! byte-stable); this module only decides whether a string is acceptable.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::error::{DdmsError, Result};

/// Extended values accepted by temporal coverage in place of a date.
pub const NOT_APPLICABLE: &str = "Not Applicable";
pub const UNKNOWN: &str = "Unknown";

fn strip_zone(value: &str) -> &str {
    if let Some(stripped) = value.strip_suffix('Z') {
        return stripped;
    }
    // trailing +hh:mm / -hh:mm on a date-only value
    let split = value.len().saturating_sub(6);
    if split > 0
        && let (Some(head), Some(tail)) = (value.get(..split), value.get(split..))
    {
        let bytes = tail.as_bytes();
        if (bytes[0] == b'+' || bytes[0] == b'-') && bytes[3] == b':' && head.len() >= 4 {
            return head;
        }
    }
    value
}

/// Whether `value` parses as any DDMS date form.
pub fn is_ddms_date(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    if DateTime::parse_from_rfc3339(value).is_ok() {
        return true;
    }
    if NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok() {
        return true;
    }
    let bare = strip_zone(value);
    if NaiveDate::parse_from_str(bare, "%Y-%m-%d").is_ok() {
        return true;
    }
    if bare.len() == 7 && NaiveDate::parse_from_str(&format!("{}-01", bare), "%Y-%m-%d").is_ok() {
        return true;
    }
    bare.len() == 4 && bare.chars().all(|c| c.is_ascii_digit())
}

/// Require `value` to be a DDMS date; `name` is used in the error.
pub fn validate_date(value: &str, name: &str) -> Result<()> {
    if is_ddms_date(value) {
        Ok(())
    } else {
        Err(DdmsError::invalid(format!(
            "The {} value ({}) is not in a valid date format.",
            name, value
        )))
    }
}

/// Dates plus the two extended temporal values.
pub fn validate_extended_date(value: &str, name: &str) -> Result<()> {
    if value == NOT_APPLICABLE || value == UNKNOWN {
        return Ok(());
    }
    validate_date(value, name)
}
