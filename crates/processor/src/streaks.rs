//! Streak computation
//!
//! Pure functions: given a habit's frequency, the days it was done and the
//! days it was excused (rest days), compute the current and longest streak
//! relative to a reference "today".

use chrono::{Duration, NaiveDate, Weekday};
use common::models::{Completion, Frequency, Habit, Streak};
use common::Error;
use std::collections::{BTreeMap, BTreeSet};

use crate::dates::{day_of_week, week_start};

/// Days on which the habit counts as done (quantity habits must reach their target)
pub fn done_dates(habit: &Habit, completions: &[Completion]) -> BTreeSet<NaiveDate> {
    completions
        .iter()
        .filter(|c| habit.is_done_with(c.value))
        .map(|c| c.date)
        .collect()
}

/// Compute `{current, longest}` for a frequency policy.
///
/// Invalid frequency configurations yield `{0, 0}`; use [`checked_streak`]
/// to surface them as an error instead.
pub fn compute_streak(
    frequency: &Frequency,
    completions: &BTreeSet<NaiveDate>,
    today: NaiveDate,
    rest_days: &BTreeSet<NaiveDate>,
    week_starts_on: Weekday,
) -> Streak {
    if completions.is_empty() || frequency.validate().is_err() {
        return Streak::default();
    }

    match frequency {
        Frequency::Daily => daily_streak(completions, today, rest_days),
        Frequency::SpecificWeekdays { days } => {
            specific_weekdays_streak(completions, today, rest_days, days)
        }
        Frequency::TimesPerWeek { times } => {
            weekly_streak(completions, today, *times, week_starts_on)
        }
    }
}

/// Like [`compute_streak`], but reports an inconsistent frequency config
pub fn checked_streak(
    frequency: &Frequency,
    completions: &BTreeSet<NaiveDate>,
    today: NaiveDate,
    rest_days: &BTreeSet<NaiveDate>,
    week_starts_on: Weekday,
) -> Result<Streak, Error> {
    frequency.validate()?;
    Ok(compute_streak(
        frequency,
        completions,
        today,
        rest_days,
        week_starts_on,
    ))
}

fn shift(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
}

fn daily_streak(
    done: &BTreeSet<NaiveDate>,
    today: NaiveDate,
    rest: &BTreeSet<NaiveDate>,
) -> Streak {
    let mut longest = 0u32;
    let mut run = 0u32;
    let mut previous: Option<NaiveDate> = None;

    for &date in done {
        run = match previous {
            Some(prev) => match (date - prev).num_days() {
                1 => run + 1,
                // A single excused day between two completions keeps the run alive
                2 if shift(date, -1).is_some_and(|gap| rest.contains(&gap)) => run + 1,
                _ => 1,
            },
            None => 1,
        };
        longest = longest.max(run);
        previous = Some(date);
    }

    let current = daily_current(done, today, rest);
    Streak::new(current, longest.max(current))
}

fn daily_current(done: &BTreeSet<NaiveDate>, today: NaiveDate, rest: &BTreeSet<NaiveDate>) -> u32 {
    let yesterday = shift(today, -1);

    // Today may still be pending: fall back to yesterday, or to an excused today
    let start = if done.contains(&today) {
        today
    } else if let Some(yesterday) = yesterday.filter(|y| done.contains(y)) {
        yesterday
    } else if rest.contains(&today) {
        today
    } else {
        return 0;
    };

    let mut current = u32::from(done.contains(&start));
    let mut day = shift(start, -1);
    while let Some(date) = day {
        if done.contains(&date) {
            current += 1;
        } else if !rest.contains(&date) {
            break;
        }
        day = shift(date, -1);
    }

    current
}

fn specific_weekdays_streak(
    done: &BTreeSet<NaiveDate>,
    today: NaiveDate,
    rest: &BTreeSet<NaiveDate>,
    days: &[u8],
) -> Streak {
    let is_target = |date: NaiveDate| days.contains(&day_of_week(date));

    // Nothing before the earliest marker can extend the streak
    let earliest = match (done.first(), rest.first()) {
        (Some(d), Some(r)) => *d.min(r),
        (Some(d), None) => *d,
        (None, Some(r)) => *r,
        (None, None) => return Streak::default(),
    };

    let mut current = 0u32;
    let mut cursor = Some(today);
    while let Some(date) = cursor.filter(|d| *d >= earliest) {
        if is_target(date) {
            if done.contains(&date) {
                current += 1;
            } else if !rest.contains(&date) && date != today {
                break;
            }
        }
        cursor = shift(date, -1);
    }

    let longest = longest_specific_weekdays_run(done, &is_target);
    Streak::new(current, longest.max(current))
}

/// Longest run counted forward from each completion over completed target days
fn longest_specific_weekdays_run(
    done: &BTreeSet<NaiveDate>,
    is_target: &dyn Fn(NaiveDate) -> bool,
) -> u32 {
    let mut longest = 0u32;
    // Starts inside an already-measured run can only produce a shorter run
    let mut covered_until: Option<NaiveDate> = None;

    for &start in done {
        if covered_until.is_some_and(|end| start < end) {
            continue;
        }

        let mut run = 1u32;
        let mut cursor = shift(start, 1);
        while let Some(date) = cursor {
            if is_target(date) {
                if done.contains(&date) {
                    run += 1;
                } else {
                    break;
                }
            }
            cursor = shift(date, 1);
        }

        covered_until = cursor;
        longest = longest.max(run);
    }

    longest
}

fn weekly_streak(
    done: &BTreeSet<NaiveDate>,
    today: NaiveDate,
    times: u32,
    week_starts_on: Weekday,
) -> Streak {
    let mut counts: BTreeMap<NaiveDate, u32> = BTreeMap::new();
    for &date in done {
        *counts.entry(week_start(date, week_starts_on)).or_insert(0) += 1;
    }

    let qualifies = |week: NaiveDate| counts.get(&week).copied().unwrap_or(0) >= times;

    let (first_week, last_week) = match (counts.keys().next(), counts.keys().next_back()) {
        (Some(first), Some(last)) => (*first, *last),
        _ => return Streak::default(),
    };

    // Every calendar week in range takes part, so an empty week ends a run
    let mut longest = 0u32;
    let mut run = 0u32;
    let mut cursor = Some(first_week);
    while let Some(week) = cursor.filter(|w| *w <= last_week) {
        if qualifies(week) {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
        cursor = shift(week, 7);
    }

    let current_week = week_start(today, week_starts_on);
    let mut current = 0u32;
    let mut cursor = Some(current_week);
    while let Some(week) = cursor.filter(|w| *w >= first_week) {
        if qualifies(week) {
            current += 1;
        } else if week != current_week {
            break;
        }
        cursor = shift(week, -7);
    }

    Streak::new(current, longest.max(current))
}
