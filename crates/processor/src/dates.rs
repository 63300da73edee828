//! Calendar-day arithmetic
//!
//! All dates are civil days (`YYYY-MM-DD`) without a timezone. Parsing is
//! strict so that malformed input is rejected instead of coerced.

use chrono::{Datelike, Duration, Local, Months, NaiveDate, Weekday};
use common::Error;

/// Canonical date format
pub const DATE_FORMAT: &str = "%Y-%m-%d";

const MAX_DAY_SHIFT: i64 = 200_000_000;

/// Today's civil date in the local timezone
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Today's civil date as `YYYY-MM-DD`
pub fn today_string() -> String {
    format_date(today())
}

/// Parse a `YYYY-MM-DD` string
pub fn parse_date(s: &str) -> Result<NaiveDate, Error> {
    let bytes = s.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());

    if !well_formed {
        return Err(Error::InvalidDateFormat(s.to_string()));
    }

    NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| Error::InvalidDateFormat(s.to_string()))
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Day of week, Sunday = 0 through Saturday = 6
pub fn day_of_week(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_sunday() as u8
}

/// Shift a date by `n` days, saturating at the representable range
pub fn add_days(date: NaiveDate, n: i64) -> NaiveDate {
    // Wider than the whole NaiveDate range, small enough for Duration
    let n = n.clamp(-MAX_DAY_SHIFT, MAX_DAY_SHIFT);
    date.checked_add_signed(Duration::days(n))
        .unwrap_or(if n >= 0 { NaiveDate::MAX } else { NaiveDate::MIN })
}

/// Absolute number of calendar days between two dates
pub fn days_between(a: NaiveDate, b: NaiveDate) -> i64 {
    (a - b).num_days().abs()
}

/// First day of the week containing `date`
pub fn week_start(date: NaiveDate, first_day: Weekday) -> NaiveDate {
    let offset = (date.weekday().num_days_from_monday() + 7 - first_day.num_days_from_monday()) % 7;
    add_days(date, -(offset as i64))
}

/// Last day of the week containing `date`
pub fn week_end(date: NaiveDate, first_day: Weekday) -> NaiveDate {
    add_days(week_start(date, first_day), 6)
}

pub fn is_same_or_before(a: NaiveDate, b: NaiveDate) -> bool {
    a <= b
}

/// First day of the month containing `date`
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the month containing `date`
pub fn month_end(date: NaiveDate) -> NaiveDate {
    month_start(date)
        .checked_add_months(Months::new(1))
        .map(|next| add_days(next, -1))
        .unwrap_or(NaiveDate::MAX)
}

/// The last `count` days ending at `today`, oldest first
pub fn past_days(today: NaiveDate, count: u32) -> Vec<NaiveDate> {
    (0..count as i64)
        .rev()
        .map(|back| add_days(today, -back))
        .collect()
}
