//! Perfect-week and perfect-month counting
//!
//! A day is perfect when at least one habit is scheduled on it and every
//! scheduled habit was done or excused. Weeks and months count once they
//! have fully elapsed (ending on or before today) with every day perfect.

use chrono::{NaiveDate, Weekday};
use common::models::Habit;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::dates::{add_days, day_of_week, month_end, month_start, week_end, week_start};

/// A habit together with its done and excused days
#[derive(Debug, Clone)]
pub struct HabitHistory<'a> {
    pub habit: &'a Habit,
    pub done: BTreeSet<NaiveDate>,
    pub rest: BTreeSet<NaiveDate>,
}

impl HabitHistory<'_> {
    fn is_scheduled_on(&self, date: NaiveDate) -> bool {
        !self.habit.archived
            && self.habit.created_on <= date
            && self.habit.frequency.validate().is_ok()
            && self.habit.frequency.is_scheduled_on(day_of_week(date))
    }

    fn is_satisfied_on(&self, date: NaiveDate) -> bool {
        self.done.contains(&date) || self.rest.contains(&date)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PerfectPeriods {
    pub weeks: u32,
    pub months: u32,
}

pub fn is_perfect_day(histories: &[HabitHistory<'_>], date: NaiveDate) -> bool {
    let mut scheduled = histories
        .iter()
        .filter(|h| h.is_scheduled_on(date))
        .peekable();

    scheduled.peek().is_some() && scheduled.all(|h| h.is_satisfied_on(date))
}

fn days_in(from: NaiveDate, to: NaiveDate) -> impl Iterator<Item = NaiveDate> {
    std::iter::successors(Some(from), |d| d.succ_opt()).take_while(move |d| *d <= to)
}

/// Count fully elapsed perfect weeks and months up to and including `today`
pub fn count_perfect_periods(
    histories: &[HabitHistory<'_>],
    today: NaiveDate,
    week_starts_on: Weekday,
) -> PerfectPeriods {
    let first_day = match histories
        .iter()
        .filter(|h| !h.habit.archived)
        .map(|h| h.habit.created_on)
        .min()
    {
        Some(first) if first <= today => first,
        _ => return PerfectPeriods::default(),
    };

    let perfect: BTreeSet<NaiveDate> = days_in(first_day, today)
        .filter(|date| is_perfect_day(histories, *date))
        .collect();
    let all_perfect =
        |from: NaiveDate, to: NaiveDate| days_in(from, to).all(|date| perfect.contains(&date));

    let mut periods = PerfectPeriods::default();

    let mut week = week_start(first_day, week_starts_on);
    while week_end(week, week_starts_on) <= today {
        if all_perfect(week, week_end(week, week_starts_on)) {
            periods.weeks += 1;
        }
        week = add_days(week, 7);
    }

    let mut month = month_start(first_day);
    while month_end(month) <= today {
        if all_perfect(month, month_end(month)) {
            periods.months += 1;
        }
        month = add_days(month_end(month), 1);
    }

    periods
}
