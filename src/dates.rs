//! Calendar date helpers for ISO `YYYY-MM-DD` fields.

use chrono::NaiveDate;

/// Parses an ISO calendar date. Empty or malformed input yields `None`.
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

/// Formats an ISO date for display, e.g. `2025-03-24` becomes `Mar 24, 2025`.
///
/// Empty input stays empty; unparseable input is returned unchanged.
pub fn display_date(s: &str) -> String {
    match parse_iso_date(s) {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(
            parse_iso_date("2025-06-25"),
            NaiveDate::from_ymd_opt(2025, 6, 25)
        );
        assert_eq!(parse_iso_date(""), None);
        assert_eq!(parse_iso_date("2025-13-01"), None);
        assert_eq!(parse_iso_date("25/06/2025"), None);
    }

    #[test]
    fn test_display_date() {
        assert_eq!(display_date("2025-03-24"), "Mar 24, 2025");
        assert_eq!(display_date("2025-08-04"), "Aug 4, 2025");
        assert_eq!(display_date(""), "");
        assert_eq!(display_date("soon"), "soon");
    }
}
