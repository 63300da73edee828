#[cfg(test)]
mod tests {
    use crate::dates::{add_days, days_between, parse_date};
    use crate::streaks::*;
    use chrono::{NaiveDate, Weekday};
    use common::models::{Completion, Frequency, Habit, HabitKind, Streak};
    use common::Error;
    use std::collections::BTreeSet;
    use uuid::Uuid;

    // 2026-03-16 is a Monday
    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn dates(list: &[&str]) -> BTreeSet<NaiveDate> {
        list.iter().map(|s| d(s)).collect()
    }

    fn none() -> BTreeSet<NaiveDate> {
        BTreeSet::new()
    }

    fn daily(done: &[&str], today: &str, rest: &[&str]) -> Streak {
        compute_streak(
            &Frequency::Daily,
            &dates(done),
            d(today),
            &dates(rest),
            Weekday::Mon,
        )
    }

    fn weekdays(days: &[u8], done: &[&str], today: &str, rest: &[&str]) -> Streak {
        compute_streak(
            &Frequency::SpecificWeekdays {
                days: days.to_vec(),
            },
            &dates(done),
            d(today),
            &dates(rest),
            Weekday::Mon,
        )
    }

    fn weekly(times: u32, done: &[&str], today: &str) -> Streak {
        compute_streak(
            &Frequency::TimesPerWeek { times },
            &dates(done),
            d(today),
            &none(),
            Weekday::Mon,
        )
    }

    // Empty and single-completion cases
    #[test]
    fn test_empty_history_is_zero_for_every_policy() {
        assert_eq!(daily(&[], "2026-03-16", &[]), Streak::new(0, 0));
        assert_eq!(weekdays(&[1, 3, 5], &[], "2026-03-16", &[]), Streak::new(0, 0));
        assert_eq!(weekly(3, &[], "2026-03-16"), Streak::new(0, 0));
    }

    #[test]
    fn test_rest_days_alone_are_zero() {
        assert_eq!(
            daily(&[], "2026-03-16", &["2026-03-15", "2026-03-16"]),
            Streak::new(0, 0)
        );
    }

    #[test]
    fn test_single_completion_today() {
        assert_eq!(daily(&["2026-03-16"], "2026-03-16", &[]), Streak::new(1, 1));
        assert_eq!(
            weekdays(&[1], &["2026-03-16"], "2026-03-16", &[]),
            Streak::new(1, 1)
        );
        assert_eq!(weekly(1, &["2026-03-16"], "2026-03-16"), Streak::new(1, 1));
    }

    // Daily policy
    #[test]
    fn test_daily_every_day_in_range() {
        let start = d("2026-02-20");
        let end = d("2026-03-05");
        let mut done = BTreeSet::new();
        let mut day = start;
        while day <= end {
            done.insert(day);
            day = add_days(day, 1);
        }
        let expected = (days_between(start, end) + 1) as u32;

        let streak = compute_streak(&Frequency::Daily, &done, end, &none(), Weekday::Mon);
        assert_eq!(streak, Streak::new(expected, expected));

        // Today not yet done: the run ending yesterday still counts
        let streak = compute_streak(
            &Frequency::Daily,
            &done,
            add_days(end, 1),
            &none(),
            Weekday::Mon,
        );
        assert_eq!(streak, Streak::new(expected, expected));

        // Two days later the run is broken but remembered
        let streak = compute_streak(
            &Frequency::Daily,
            &done,
            add_days(end, 2),
            &none(),
            Weekday::Mon,
        );
        assert_eq!(streak, Streak::new(0, expected));
    }

    #[test]
    fn test_daily_rest_day_bridges_single_gap() {
        let streak = daily(
            &["2026-03-01", "2026-03-03"],
            "2026-03-03",
            &["2026-03-02"],
        );
        assert_eq!(streak, Streak::new(2, 2));
    }

    #[test]
    fn test_daily_gap_without_rest_resets() {
        let streak = daily(&["2026-03-01", "2026-03-04"], "2026-03-04", &[]);
        assert_eq!(streak, Streak::new(1, 1));
    }

    #[test]
    fn test_daily_rest_day_not_on_the_gap_does_not_bridge() {
        let streak = daily(
            &["2026-03-01", "2026-03-03"],
            "2026-03-03",
            &["2026-02-28"],
        );
        assert_eq!(streak, Streak::new(1, 1));
    }

    #[test]
    fn test_daily_two_rest_days_bridge_current_but_not_scan() {
        // The backward walk accepts consecutive rest days; the history scan
        // bridges only a single one. longest is raised to current.
        let streak = daily(
            &["2026-03-01", "2026-03-04"],
            "2026-03-04",
            &["2026-03-02", "2026-03-03"],
        );
        assert_eq!(streak, Streak::new(2, 2));

        // Once the current run is gone, the scan alone decides
        let streak = daily(
            &["2026-03-01", "2026-03-04"],
            "2026-03-10",
            &["2026-03-02", "2026-03-03"],
        );
        assert_eq!(streak, Streak::new(0, 1));
    }

    #[test]
    fn test_daily_rest_today_keeps_yesterdays_run() {
        let streak = daily(
            &["2026-03-01", "2026-03-02"],
            "2026-03-03",
            &["2026-03-03"],
        );
        assert_eq!(streak, Streak::new(2, 2));
    }

    #[test]
    fn test_daily_rest_today_after_rest_yesterday() {
        let streak = daily(
            &["2026-03-01"],
            "2026-03-03",
            &["2026-03-02", "2026-03-03"],
        );
        assert_eq!(streak, Streak::new(1, 1));
    }

    #[test]
    fn test_daily_isolated_rest_day_contributes_nothing() {
        let streak = daily(&["2026-03-01"], "2026-03-05", &["2026-03-05"]);
        assert_eq!(streak, Streak::new(0, 1));
    }

    #[test]
    fn test_daily_longest_from_earlier_segment() {
        let streak = daily(
            &[
                "2026-02-01",
                "2026-02-02",
                "2026-02-03",
                "2026-02-04",
                "2026-03-09",
                "2026-03-10",
            ],
            "2026-03-10",
            &[],
        );
        assert_eq!(streak, Streak::new(2, 4));
    }

    #[test]
    fn test_daily_across_leap_day() {
        let streak = daily(
            &["2024-02-28", "2024-02-29", "2024-03-01"],
            "2024-03-01",
            &[],
        );
        assert_eq!(streak, Streak::new(3, 3));
    }

    // Specific weekdays policy (1 = Monday, 3 = Wednesday, 5 = Friday)
    #[test]
    fn test_weekdays_non_target_days_are_transparent() {
        let done = ["2026-03-16", "2026-03-18", "2026-03-20"];
        assert_eq!(
            weekdays(&[1, 3, 5], &done, "2026-03-20", &[]),
            Streak::new(3, 3)
        );
        // Saturday and Sunday are not targets either
        assert_eq!(
            weekdays(&[1, 3, 5], &done, "2026-03-22", &[]),
            Streak::new(3, 3)
        );
    }

    #[test]
    fn test_weekdays_pending_today_is_skipped() {
        let done = ["2026-03-16", "2026-03-18", "2026-03-20"];
        // Monday 2026-03-23 is a target day not yet done
        assert_eq!(
            weekdays(&[1, 3, 5], &done, "2026-03-23", &[]),
            Streak::new(3, 3)
        );
    }

    #[test]
    fn test_weekdays_missed_target_breaks() {
        let done = ["2026-03-16", "2026-03-18", "2026-03-20"];
        // Monday 2026-03-23 missed, Wednesday 2026-03-25 pending
        assert_eq!(
            weekdays(&[1, 3, 5], &done, "2026-03-25", &[]),
            Streak::new(0, 3)
        );
    }

    #[test]
    fn test_weekdays_rest_marker_bridges_without_counting() {
        let streak = weekdays(
            &[1, 3, 5],
            &["2026-03-16", "2026-03-20"],
            "2026-03-20",
            &["2026-03-18"],
        );
        // The forward scan does not bridge rest days, current does
        assert_eq!(streak, Streak::new(2, 2));
    }

    #[test]
    fn test_weekdays_off_day_completion_counts_once() {
        // Tuesday is not a target but was done anyway
        let streak = weekdays(
            &[1, 3, 5],
            &["2026-03-16", "2026-03-17", "2026-03-18"],
            "2026-03-20",
            &[],
        );
        assert_eq!(streak, Streak::new(2, 2));
    }

    #[test]
    fn test_weekdays_longest_over_multiple_weeks() {
        let streak = weekdays(
            &[2, 4],
            &[
                "2026-03-03",
                "2026-03-05",
                "2026-03-10",
                "2026-03-12",
                "2026-03-17",
                "2026-03-24",
            ],
            "2026-03-24",
            &[],
        );
        // Thursday 2026-03-19 was missed
        assert_eq!(streak, Streak::new(1, 5));
    }

    // Times per week policy
    #[test]
    fn test_weekly_three_times_scenario() {
        let done = [
            // Week 1: Mon, Wed, Fri
            "2026-03-16",
            "2026-03-18",
            "2026-03-20",
            // Week 2: Tue, Thu
            "2026-03-24",
            "2026-03-26",
        ];

        // Week 2 still in progress is transparent
        assert_eq!(weekly(3, &done, "2026-03-26"), Streak::new(1, 1));

        // Once week 2 is over without qualifying, the streak is broken
        assert_eq!(weekly(3, &done, "2026-03-30"), Streak::new(0, 1));
    }

    #[test]
    fn test_weekly_current_week_counts_once_qualified() {
        let done = ["2026-03-16", "2026-03-23", "2026-03-24"];
        assert_eq!(weekly(1, &done, "2026-03-24"), Streak::new(2, 2));
    }

    #[test]
    fn test_weekly_empty_week_breaks_run() {
        let done = ["2026-03-02", "2026-03-16"];
        assert_eq!(weekly(1, &done, "2026-03-16"), Streak::new(1, 1));
    }

    #[test]
    fn test_weekly_run_survives_pending_week() {
        let done = ["2026-03-02", "2026-03-09", "2026-03-16"];
        assert_eq!(weekly(1, &done, "2026-03-25"), Streak::new(3, 3));
    }

    #[test]
    fn test_weekly_respects_week_start() {
        // Sunday 2026-03-15 and Monday 2026-03-16
        let done = dates(&["2026-03-15", "2026-03-16"]);
        let freq = Frequency::TimesPerWeek { times: 2 };

        let monday_weeks = compute_streak(&freq, &done, d("2026-03-16"), &none(), Weekday::Mon);
        assert_eq!(monday_weeks, Streak::new(0, 0));

        let sunday_weeks = compute_streak(&freq, &done, d("2026-03-16"), &none(), Weekday::Sun);
        assert_eq!(sunday_weeks, Streak::new(1, 1));
    }

    #[test]
    fn test_weekly_ignores_rest_days() {
        let done = dates(&["2026-03-16"]);
        let rest = dates(&["2026-03-17", "2026-03-18"]);
        let streak = compute_streak(
            &Frequency::TimesPerWeek { times: 3 },
            &done,
            d("2026-03-30"),
            &rest,
            Weekday::Mon,
        );
        assert_eq!(streak, Streak::new(0, 0));
    }

    // Configuration errors
    #[test]
    fn test_invalid_config_defaults_to_zero() {
        let done = dates(&["2026-03-16"]);
        let today = d("2026-03-16");

        for freq in [
            Frequency::SpecificWeekdays { days: vec![] },
            Frequency::SpecificWeekdays { days: vec![9] },
            Frequency::TimesPerWeek { times: 0 },
        ] {
            assert_eq!(
                compute_streak(&freq, &done, today, &none(), Weekday::Mon),
                Streak::new(0, 0)
            );
            assert!(matches!(
                checked_streak(&freq, &done, today, &none(), Weekday::Mon),
                Err(Error::InconsistentFrequencyConfig(_))
            ));
        }
    }

    #[test]
    fn test_checked_streak_passes_valid_config() {
        let streak = checked_streak(
            &Frequency::Daily,
            &dates(&["2026-03-15", "2026-03-16"]),
            d("2026-03-16"),
            &none(),
            Weekday::Mon,
        )
        .unwrap();
        assert_eq!(streak, Streak::new(2, 2));
    }

    // done_dates
    #[test]
    fn test_done_dates_applies_quantity_target() {
        let habit = Habit {
            id: Uuid::new_v4(),
            name: "Read".to_string(),
            kind: HabitKind::Quantity,
            frequency: Frequency::Daily,
            daily_target: 20,
            unit: Some("pages".to_string()),
            created_on: d("2026-03-01"),
            archived: false,
        };
        let records = vec![
            Completion {
                habit_id: habit.id,
                date: d("2026-03-14"),
                value: 25,
                note: None,
            },
            Completion {
                habit_id: habit.id,
                date: d("2026-03-15"),
                value: 5,
                note: None,
            },
            Completion {
                habit_id: habit.id,
                date: d("2026-03-16"),
                value: 20,
                note: None,
            },
        ];

        assert_eq!(
            done_dates(&habit, &records),
            dates(&["2026-03-14", "2026-03-16"])
        );

        let boolean = Habit {
            kind: HabitKind::Boolean,
            ..habit
        };
        assert_eq!(done_dates(&boolean, &records).len(), 3);
    }

    #[test]
    fn test_longest_never_below_current() {
        let cases = [
            daily(&["2026-03-14", "2026-03-16"], "2026-03-16", &["2026-03-15"]),
            weekdays(&[1, 3], &["2026-03-16"], "2026-03-18", &["2026-03-18"]),
            weekly(2, &["2026-03-16", "2026-03-17"], "2026-03-18"),
        ];
        for streak in cases {
            assert!(streak.longest >= streak.current, "{:?}", streak);
        }
    }
}
