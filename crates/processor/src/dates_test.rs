#[cfg(test)]
mod tests {
    use crate::dates::*;
    use chrono::{NaiveDate, Weekday};
    use common::Error;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    // parse_date tests
    #[test]
    fn test_parse_valid_date() {
        assert_eq!(d("2026-03-15"), NaiveDate::from_ymd_opt(2026, 3, 15).unwrap());
    }

    #[test]
    fn test_parse_leap_day() {
        assert!(parse_date("2024-02-29").is_ok());
        assert!(matches!(
            parse_date("2026-02-29"),
            Err(Error::InvalidDateFormat(_))
        ));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "",
            "2026-3-15",
            "2026/03/15",
            "15-03-2026",
            "2026-03-15T00:00:00",
            " 2026-03-15",
            "2026-13-01",
            "2026-04-31",
            "20a6-03-15",
            "+026-03-15",
        ] {
            assert!(
                matches!(parse_date(bad), Err(Error::InvalidDateFormat(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_format_round_trip() {
        assert_eq!(format_date(d("2026-01-05")), "2026-01-05");
        assert_eq!(today_string().len(), 10);
    }

    // day_of_week tests
    #[test]
    fn test_day_of_week_sunday_is_zero() {
        assert_eq!(day_of_week(d("2026-03-15")), 0); // Sunday
        assert_eq!(day_of_week(d("2026-03-16")), 1); // Monday
        assert_eq!(day_of_week(d("2026-03-21")), 6); // Saturday
    }

    // add_days / days_between tests
    #[test]
    fn test_add_days_across_month_and_year() {
        assert_eq!(add_days(d("2026-01-31"), 1), d("2026-02-01"));
        assert_eq!(add_days(d("2024-02-28"), 1), d("2024-02-29"));
        assert_eq!(add_days(d("2026-01-01"), -1), d("2025-12-31"));
    }

    #[test]
    fn test_add_days_saturates() {
        assert_eq!(add_days(d("2026-01-01"), i64::MAX), NaiveDate::MAX);
        assert_eq!(add_days(d("2026-01-01"), i64::MIN), NaiveDate::MIN);
    }

    #[test]
    fn test_days_between_is_symmetric() {
        assert_eq!(days_between(d("2026-03-01"), d("2026-03-10")), 9);
        assert_eq!(days_between(d("2026-03-10"), d("2026-03-01")), 9);
        assert_eq!(days_between(d("2026-03-10"), d("2026-03-10")), 0);
        assert_eq!(days_between(d("2024-02-01"), d("2024-03-01")), 29);
    }

    // week boundary tests
    #[test]
    fn test_week_start_monday() {
        // Wednesday 2026-03-18
        assert_eq!(week_start(d("2026-03-18"), Weekday::Mon), d("2026-03-16"));
        assert_eq!(week_end(d("2026-03-18"), Weekday::Mon), d("2026-03-22"));
        // Monday is its own week start
        assert_eq!(week_start(d("2026-03-16"), Weekday::Mon), d("2026-03-16"));
        // Sunday belongs to the week started on the previous Monday
        assert_eq!(week_start(d("2026-03-22"), Weekday::Mon), d("2026-03-16"));
    }

    #[test]
    fn test_week_start_sunday() {
        assert_eq!(week_start(d("2026-03-18"), Weekday::Sun), d("2026-03-15"));
        assert_eq!(week_end(d("2026-03-18"), Weekday::Sun), d("2026-03-21"));
        assert_eq!(week_start(d("2026-03-15"), Weekday::Sun), d("2026-03-15"));
    }

    #[test]
    fn test_week_spanning_year_end() {
        assert_eq!(week_start(d("2026-01-01"), Weekday::Mon), d("2025-12-29"));
        assert_eq!(week_end(d("2025-12-30"), Weekday::Mon), d("2026-01-04"));
    }

    #[test]
    fn test_is_same_or_before() {
        assert!(is_same_or_before(d("2026-03-01"), d("2026-03-01")));
        assert!(is_same_or_before(d("2026-02-28"), d("2026-03-01")));
        assert!(!is_same_or_before(d("2026-03-02"), d("2026-03-01")));
    }

    // month boundary tests
    #[test]
    fn test_month_bounds() {
        assert_eq!(month_start(d("2026-03-18")), d("2026-03-01"));
        assert_eq!(month_end(d("2026-03-18")), d("2026-03-31"));
        assert_eq!(month_end(d("2024-02-10")), d("2024-02-29"));
        assert_eq!(month_end(d("2026-12-05")), d("2026-12-31"));
    }

    #[test]
    fn test_past_days_oldest_first() {
        let days = past_days(d("2026-03-02"), 3);
        assert_eq!(days, vec![d("2026-02-28"), d("2026-03-01"), d("2026-03-02")]);
        assert!(past_days(d("2026-03-02"), 0).is_empty());
    }
}
