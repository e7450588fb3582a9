//! Date parsing and year-month bucketing

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use std::fmt;

/// Timestamp layouts seen in platform exports
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Date-only layouts seen in platform exports
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Parse a publish date from an export cell.
///
/// Returns `None` for blanks and anything unparseable; the caller treats that
/// post as undated.
pub fn parse_post_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return Some(d);
        }
    }

    None
}

/// Calendar month bucket, displayed as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_datetime_with_seconds() {
        assert_eq!(parse_post_date("2024-03-15 18:22:01"), Some(ymd(2024, 3, 15)));
    }

    #[test]
    fn test_parse_date_only() {
        assert_eq!(parse_post_date("2024-03-15"), Some(ymd(2024, 3, 15)));
        assert_eq!(parse_post_date("15/03/2024"), Some(ymd(2024, 3, 15)));
    }

    #[test]
    fn test_parse_rfc3339() {
        assert_eq!(parse_post_date("2024-12-31T23:10:00Z"), Some(ymd(2024, 12, 31)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_post_date(""), None);
        assert_eq!(parse_post_date("yesterday"), None);
        assert_eq!(parse_post_date("2024-13-40"), None);
    }

    #[test]
    fn test_year_month_display_and_order() {
        let jan = YearMonth::from_date(ymd(2024, 1, 31));
        let feb = YearMonth::from_date(ymd(2024, 2, 1));
        assert_eq!(jan.to_string(), "2024-01");
        assert!(jan < feb);
        assert_eq!(YearMonth::from_date(ymd(2023, 12, 1)).to_string(), "2023-12");
    }
}
