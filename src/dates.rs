use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Error for a date key that cannot name a real calendar date.
///
/// Month and day fields are forgiving (missing or garbage fields fall back
/// to 1), but the year is required and the resulting date must exist.
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum DateKeyError {
    #[error("invalid date key (use YYYY-MM-DD): {0}")]
    Malformed(String),
    #[error("no such calendar date: {0}")]
    OutOfRange(String),
}

/// Parses a `"YYYY-MM-DD"` key as a local calendar date.
pub fn parse_date_key(key: &str) -> Result<NaiveDate, DateKeyError> {
    let mut fields = key.trim().splitn(3, '-');
    let year: i32 = fields
        .next()
        .and_then(|y| y.parse().ok())
        .ok_or_else(|| DateKeyError::Malformed(key.to_string()))?;
    let month: u32 = fields.next().and_then(|m| m.parse().ok()).unwrap_or(1);
    let day: u32 = fields.next().and_then(|d| d.parse().ok()).unwrap_or(1);
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| DateKeyError::OutOfRange(key.to_string()))
}

/// Inverse of [`parse_date_key`], zero-padded.
pub fn format_date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// `days` consecutive dates starting at `start`, ascending.
pub fn date_range(start: NaiveDate, days: u32) -> Vec<NaiveDate> {
    (0..days.max(1) as i64)
        .filter_map(|offset| start.checked_add_signed(Duration::days(offset)))
        .collect()
}

pub fn is_same_day(a: NaiveDate, b: NaiveDate) -> bool {
    a == b
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parse_round_trips_through_format() {
        let date = parse_date_key("2026-03-07").unwrap();
        assert_eq!(date, d(2026, 3, 7));
        assert_eq!(format_date_key(date), "2026-03-07");
    }

    #[test]
    fn parse_defaults_missing_month_and_day() {
        assert_eq!(parse_date_key("2026").unwrap(), d(2026, 1, 1));
        assert_eq!(parse_date_key("2026-05").unwrap(), d(2026, 5, 1));
        assert_eq!(parse_date_key("2026-xx-yy").unwrap(), d(2026, 1, 1));
    }

    #[test]
    fn parse_rejects_bad_year_and_impossible_dates() {
        assert!(matches!(
            parse_date_key("not-a-date"),
            Err(DateKeyError::Malformed(_))
        ));
        assert!(matches!(
            parse_date_key("2026-02-30"),
            Err(DateKeyError::OutOfRange(_))
        ));
    }

    #[test]
    fn date_range_is_contiguous_and_inclusive() {
        let days = date_range(d(2026, 2, 27), 4);
        assert_eq!(
            days,
            vec![d(2026, 2, 27), d(2026, 2, 28), d(2026, 3, 1), d(2026, 3, 2)]
        );
    }

    #[test]
    fn weekend_follows_sat_sun_convention() {
        assert!(is_weekend(d(2026, 8, 22))); // Saturday
        assert!(is_weekend(d(2026, 8, 23))); // Sunday
        assert!(!is_weekend(d(2026, 8, 24)));
    }

    #[test]
    fn same_day_ignores_nothing_but_the_date() {
        assert!(is_same_day(d(2026, 1, 1), d(2026, 1, 1)));
        assert!(!is_same_day(d(2026, 1, 1), d(2025, 1, 1)));
    }
}
