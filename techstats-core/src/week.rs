//! Date token decoding and axis label formatting.
//!
//! Upstream payloads label points with one of three token shapes:
//!
//! - ISO week tokens, `YYYY-Www` (weekly aggregates)
//! - calendar dates, `YYYY-MM-DD` (optionally followed by a time part)
//! - calendar months, `YYYY-MM`
//!
//! ISO week tokens decode to the Monday of that week. Week 1 is the week
//! containing January 4th (equivalently, the year's first Thursday).

use crate::range::Range;
use chrono::{Datelike, Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static ISO_WEEK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-W(\d{1,2})$").expect("Invalid ISO week regex"));

static YEAR_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})$").expect("Invalid year-month regex"));

/// Split an ISO week token into `(year, week)`.
pub fn parse_iso_week(token: &str) -> Option<(i32, u32)> {
    let caps = ISO_WEEK.captures(token.trim())?;
    let year = caps.get(1)?.as_str().parse().ok()?;
    let week: u32 = caps.get(2)?.as_str().parse().ok()?;
    if week == 0 || week > 53 {
        return None;
    }
    Some((year, week))
}

/// Monday of ISO week `week` in ISO year `year`.
pub fn iso_week_monday(year: i32, week: u32) -> Option<NaiveDate> {
    let jan4 = NaiveDate::from_ymd_opt(year, 1, 4)?;
    let offset = i64::from(jan4.weekday().num_days_from_monday());
    let week1_monday = jan4 - Duration::days(offset);
    week1_monday.checked_add_signed(Duration::weeks(i64::from(week) - 1))
}

/// Decode any accepted date token to a calendar date.
pub fn decode_date(token: &str) -> Option<NaiveDate> {
    let token = token.trim();
    if let Some((year, week)) = parse_iso_week(token) {
        return iso_week_monday(year, week);
    }
    if let Some(caps) = YEAR_MONTH.captures(token) {
        let year = caps.get(1)?.as_str().parse().ok()?;
        let month = caps.get(2)?.as_str().parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, 1);
    }
    // Accept full timestamps by keeping the date part only.
    let date_part = token.get(..10).unwrap_or(token);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

/// Axis label for a date token at the given range.
///
/// Weekly ISO tokens render as `Nov 24 – Nov 30, 2025`, other weekly tokens as
/// `Jan 8`. Monthly labels render as `Jan 2025`. Undecodable tokens are
/// returned verbatim.
pub fn format_label(token: &str, range: Range) -> String {
    match range {
        Range::Weekly => {
            if let Some(start) = parse_iso_week(token).and_then(|(y, w)| iso_week_monday(y, w)) {
                let end = start + Duration::days(6);
                return format!(
                    "{} \u{2013} {}, {}",
                    start.format("%b %-d"),
                    end.format("%b %-d"),
                    end.year()
                );
            }
            match decode_date(token) {
                Some(date) => date.format("%b %-d").to_string(),
                None => token.to_string(),
            }
        }
        Range::Monthly => match decode_date(token) {
            Some(date) => date.format("%b %Y").to_string(),
            None => token.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    #[test]
    fn test_parse_iso_week() {
        assert_eq!(parse_iso_week("2025-W48"), Some((2025, 48)));
        assert_eq!(parse_iso_week("2025-W00"), None);
        assert_eq!(parse_iso_week("2025-48"), None);
    }

    #[test]
    fn test_week_one_contains_jan_fourth() {
        // 2026-01-04 is a Sunday, so week 1 starts on 2025-12-29.
        assert_eq!(
            iso_week_monday(2026, 1),
            NaiveDate::from_ymd_opt(2025, 12, 29)
        );
        // 2021-01-04 is a Monday, so week 1 starts on it.
        assert_eq!(iso_week_monday(2021, 1), NaiveDate::from_ymd_opt(2021, 1, 4));
    }

    #[test]
    fn test_week_48_of_2025() {
        let monday = decode_date("2025-W48").unwrap();
        assert_eq!(monday, NaiveDate::from_ymd_opt(2025, 11, 24).unwrap());
        assert_eq!(monday.weekday(), Weekday::Mon);
        let sunday = monday + Duration::days(6);
        assert_eq!(sunday.iso_week().week(), 48);
        assert_eq!(sunday.iso_week().year(), 2025);
    }

    #[test]
    fn test_weekly_label_spans_seven_days() {
        assert_eq!(
            format_label("2025-W48", Range::Weekly),
            "Nov 24 \u{2013} Nov 30, 2025"
        );
        // Year shown is the end date's year.
        assert_eq!(
            format_label("2026-W01", Range::Weekly),
            "Dec 29 \u{2013} Jan 4, 2026"
        );
    }

    #[test]
    fn test_monthly_label() {
        assert_eq!(format_label("2025-01-01", Range::Monthly), "Jan 2025");
        assert_eq!(format_label("2025-02", Range::Monthly), "Feb 2025");
        assert_eq!(format_label("2025-W48", Range::Monthly), "Nov 2025");
    }

    #[test]
    fn test_weekly_label_for_plain_dates() {
        assert_eq!(format_label("2025-01-08", Range::Weekly), "Jan 8");
        assert_eq!(format_label("2025-01-08T00:00:00Z", Range::Weekly), "Jan 8");
    }

    #[test]
    fn test_undecodable_token_passes_through() {
        assert_eq!(format_label("latest", Range::Weekly), "latest");
        assert_eq!(format_label("latest", Range::Monthly), "latest");
        assert!(decode_date("latest").is_none());
    }
}
