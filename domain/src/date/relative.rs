//! Relative and absolute date parsing
//!
//! Every relative expression resolves to the start of a day (00:00).
//! Weeks start on Sunday; months and years start on the 1st.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime};

use crate::tool::value_objects::ToolError;

const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];

/// Recognized relative phrases
pub const RELATIVE_PHRASES: &[&str] = &[
    "today",
    "tomorrow",
    "yesterday",
    "this week",
    "next week",
    "this month",
    "next month",
    "this year",
    "next year",
];

/// Parse `text` relative to `now`
///
/// Relative phrases are matched case-insensitively after trimming; anything
/// else goes through the absolute formats. Unparseable text is an
/// `INVALID_PARAMETERS` error.
pub fn parse_relative_date(text: &str, now: NaiveDateTime) -> Result<NaiveDateTime, ToolError> {
    let normalized = text.trim().to_lowercase();
    if let Some(date) = relative_day(&normalized, now.date()) {
        return Ok(date.and_time(NaiveTime::MIN));
    }
    parse_absolute(text.trim()).ok_or_else(|| {
        ToolError::invalid_parameters(format!(
            "Could not parse date '{}'. Use a date like 2024-03-15 or one of: {}",
            text.trim(),
            RELATIVE_PHRASES.join(", ")
        ))
    })
}

fn relative_day(phrase: &str, today: NaiveDate) -> Option<NaiveDate> {
    match phrase {
        "today" => Some(today),
        "tomorrow" => today.checked_add_days(Days::new(1)),
        "yesterday" => today.checked_sub_days(Days::new(1)),
        "this week" => week_start(today),
        "next week" => week_start(today)?.checked_add_days(Days::new(7)),
        "this month" => today.with_day(1),
        "next month" => today.with_day(1)?.checked_add_months(Months::new(1)),
        "this year" => NaiveDate::from_ymd_opt(today.year(), 1, 1),
        "next year" => NaiveDate::from_ymd_opt(today.year() + 1, 1, 1),
        _ => None,
    }
}

fn week_start(day: NaiveDate) -> Option<NaiveDate> {
    day.checked_sub_days(Days::new(u64::from(day.weekday().num_days_from_sunday())))
}

fn parse_absolute(text: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::value_objects::ErrorCategory;

    /// Wednesday 2024-03-13 15:30
    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 13)
            .unwrap()
            .and_hms_opt(15, 30, 0)
            .unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_time(NaiveTime::MIN)
    }

    #[test]
    fn test_relative_days() {
        assert_eq!(parse_relative_date("today", now()).unwrap(), day(2024, 3, 13));
        assert_eq!(parse_relative_date("  Tomorrow ", now()).unwrap(), day(2024, 3, 14));
        assert_eq!(parse_relative_date("YESTERDAY", now()).unwrap(), day(2024, 3, 12));
    }

    #[test]
    fn test_weeks_start_on_sunday() {
        assert_eq!(parse_relative_date("this week", now()).unwrap(), day(2024, 3, 10));
        assert_eq!(parse_relative_date("next week", now()).unwrap(), day(2024, 3, 17));

        let sunday = day(2024, 3, 10);
        assert_eq!(parse_relative_date("this week", sunday).unwrap(), sunday);
    }

    #[test]
    fn test_months_and_years() {
        assert_eq!(parse_relative_date("this month", now()).unwrap(), day(2024, 3, 1));
        assert_eq!(parse_relative_date("next month", now()).unwrap(), day(2024, 4, 1));
        assert_eq!(parse_relative_date("next month", day(2024, 12, 31)).unwrap(), day(2025, 1, 1));
        assert_eq!(parse_relative_date("this year", now()).unwrap(), day(2024, 1, 1));
        assert_eq!(parse_relative_date("next year", now()).unwrap(), day(2025, 1, 1));
    }

    #[test]
    fn test_absolute_fallback() {
        assert_eq!(parse_relative_date("2024-05-01", now()).unwrap(), day(2024, 5, 1));
        assert_eq!(parse_relative_date("05/01/2024", now()).unwrap(), day(2024, 5, 1));
        assert_eq!(parse_relative_date("March 5, 2024", now()).unwrap(), day(2024, 3, 5));
        assert_eq!(
            parse_relative_date("2024-05-01 08:15", now()).unwrap(),
            day(2024, 5, 1) + chrono::Duration::minutes(8 * 60 + 15)
        );
        assert_eq!(
            parse_relative_date("2024-05-01T08:15:00+02:00", now()).unwrap(),
            day(2024, 5, 1) + chrono::Duration::minutes(8 * 60 + 15)
        );
    }

    #[test]
    fn test_unparseable_is_invalid_parameters() {
        let err = parse_relative_date("someday", now()).unwrap_err();
        assert_eq!(err.category, ErrorCategory::InvalidParameters);
        assert!(err.message.contains("someday"));
    }
}
