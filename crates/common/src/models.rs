//! Domain models

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// A tracked habit
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Habit {
    pub id: Uuid,
    pub name: String,
    pub kind: HabitKind,
    pub frequency: Frequency,
    /// Minimum recorded value for a quantity habit to count as done
    pub daily_target: i32,
    pub unit: Option<String>,
    pub created_on: NaiveDate,
    pub archived: bool,
}

impl Habit {
    /// Whether a recorded value marks the habit as done for its day
    pub fn is_done_with(&self, value: i32) -> bool {
        match self.kind {
            HabitKind::Boolean => value > 0,
            HabitKind::Quantity => value >= self.daily_target.max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HabitKind {
    Boolean,
    Quantity,
}

impl HabitKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HabitKind::Boolean => "boolean",
            HabitKind::Quantity => "quantity",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "boolean" => Some(HabitKind::Boolean),
            "quantity" => Some(HabitKind::Quantity),
            _ => None,
        }
    }
}

/// Which days or weeks count toward a habit's streak
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frequency {
    Daily,
    /// Weekday numbers 0-6, Sunday = 0
    SpecificWeekdays { days: Vec<u8> },
    TimesPerWeek { times: u32 },
}

impl Frequency {
    /// Reject configurations no streak can be computed for
    pub fn validate(&self) -> Result<()> {
        match self {
            Frequency::Daily => Ok(()),
            Frequency::SpecificWeekdays { days } if days.is_empty() => Err(
                Error::InconsistentFrequencyConfig("specific weekdays with no days".to_string()),
            ),
            Frequency::SpecificWeekdays { days } => match days.iter().find(|d| **d > 6) {
                Some(day) => Err(Error::InconsistentFrequencyConfig(format!(
                    "weekday {} out of range 0-6",
                    day
                ))),
                None => Ok(()),
            },
            Frequency::TimesPerWeek { times } if *times < 1 => Err(
                Error::InconsistentFrequencyConfig("times per week must be at least 1".to_string()),
            ),
            Frequency::TimesPerWeek { .. } => Ok(()),
        }
    }

    /// Whether the habit shows up on a given weekday (0-6, Sunday = 0)
    pub fn is_scheduled_on(&self, weekday: u8) -> bool {
        match self {
            Frequency::Daily => true,
            Frequency::SpecificWeekdays { days } => days.contains(&weekday),
            // Weekly habits are offered every day; the count is tracked per week
            Frequency::TimesPerWeek { times } => *times >= 1,
        }
    }

    pub fn kind_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::SpecificWeekdays { .. } => "specific_weekdays",
            Frequency::TimesPerWeek { .. } => "times_per_week",
        }
    }
}

/// A recorded check-off for one habit on one day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Completion {
    pub habit_id: Uuid,
    pub date: NaiveDate,
    pub value: i32,
    #[serde(default)]
    pub note: Option<String>,
}

/// A day excused from breaking a habit's streak
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RestDay {
    pub habit_id: Uuid,
    pub date: NaiveDate,
    pub reason: Option<String>,
}

/// Computed streak lengths
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Streak {
    pub current: u32,
    pub longest: u32,
}

impl Streak {
    pub fn new(current: u32, longest: u32) -> Self {
        Self { current, longest }
    }
}

/// Persisted per-habit streak state
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreakRecord {
    pub habit_id: Uuid,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_completed_date: Option<NaiveDate>,
    /// Day the last completion XP was awarded for
    pub last_awarded_on: Option<NaiveDate>,
    /// Amount awarded on `last_awarded_on`, subtracted again on undo
    pub last_award_xp: i64,
}

impl StreakRecord {
    pub fn empty(habit_id: Uuid) -> Self {
        Self {
            habit_id,
            current_streak: 0,
            longest_streak: 0,
            last_completed_date: None,
            last_awarded_on: None,
            last_award_xp: 0,
        }
    }

    pub fn streak(&self) -> Streak {
        Streak::new(self.current_streak, self.longest_streak)
    }
}

/// The single user profile
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserProfile {
    pub total_xp: i64,
    pub weekly_completions: u32,
    /// Start of the week `weekly_completions` belongs to
    pub week_of: Option<NaiveDate>,
    pub total_completions: u32,
    pub longest_streak_ever: u32,
    /// Optimistic concurrency token, bumped on every write
    pub version: i64,
}

/// Input for creating a habit
#[derive(Debug, Clone, Deserialize)]
pub struct NewHabit {
    pub name: String,
    #[serde(default = "default_kind")]
    pub kind: HabitKind,
    #[serde(default = "default_frequency")]
    pub frequency: Frequency,
    #[serde(default = "default_daily_target")]
    pub daily_target: i32,
    #[serde(default)]
    pub unit: Option<String>,
}

/// Edits to an existing habit; absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HabitChanges {
    pub name: Option<String>,
    pub kind: Option<HabitKind>,
    pub frequency: Option<Frequency>,
    pub daily_target: Option<i32>,
    /// `null` clears the unit
    #[serde(default, deserialize_with = "explicit_null")]
    pub unit: Option<Option<String>>,
}

impl HabitChanges {
    /// Apply the edits. Returns whether the done rule or schedule changed.
    pub fn apply(&self, habit: &mut Habit) -> bool {
        let before = (habit.kind, habit.frequency.clone(), habit.daily_target);

        if let Some(name) = &self.name {
            habit.name = name.clone();
        }
        if let Some(kind) = self.kind {
            habit.kind = kind;
        }
        if let Some(frequency) = &self.frequency {
            habit.frequency = frequency.clone();
        }
        if let Some(target) = self.daily_target {
            habit.daily_target = target;
        }
        if let Some(unit) = &self.unit {
            habit.unit = unit.clone();
        }

        before != (habit.kind, habit.frequency.clone(), habit.daily_target)
    }
}

fn explicit_null<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn default_kind() -> HabitKind {
    HabitKind::Boolean
}

fn default_frequency() -> Frequency {
    Frequency::Daily
}

fn default_daily_target() -> i32 {
    1
}

/// How a commit changes a habit's award marker
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AwardChange {
    #[default]
    Keep,
    Set {
        on: NaiveDate,
        xp: i64,
    },
    Clear,
}

/// How a commit changes a habit's last completed date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateChange {
    #[default]
    Keep,
    Set(NaiveDate),
    Clear,
}

impl From<Option<NaiveDate>> for DateChange {
    /// The latest day in a history; an empty history clears the date
    fn from(date: Option<NaiveDate>) -> Self {
        match date {
            Some(date) => DateChange::Set(date),
            None => DateChange::Clear,
        }
    }
}

/// Partial write to a streak record; `None` leaves the stored value alone
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreakUpdate {
    pub current_streak: Option<u32>,
    pub longest_streak: Option<u32>,
    pub last_completed_date: DateChange,
    pub award: AwardChange,
}

impl StreakRecord {
    pub fn apply(&mut self, update: &StreakUpdate) {
        if let Some(current) = update.current_streak {
            self.current_streak = current;
        }
        if let Some(longest) = update.longest_streak {
            self.longest_streak = longest;
        }
        match update.last_completed_date {
            DateChange::Keep => {}
            DateChange::Set(date) => self.last_completed_date = Some(date),
            DateChange::Clear => self.last_completed_date = None,
        }
        match update.award {
            AwardChange::Keep => {}
            AwardChange::Set { on, xp } => {
                self.last_awarded_on = Some(on);
                self.last_award_xp = xp;
            }
            AwardChange::Clear => {
                self.last_awarded_on = None;
                self.last_award_xp = 0;
            }
        }
    }
}

/// Partial write to the user profile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub total_xp: Option<i64>,
    pub weekly_completions: Option<u32>,
    pub week_of: Option<NaiveDate>,
    pub total_completions: Option<u32>,
    pub longest_streak_ever: Option<u32>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        *self == ProfileUpdate::default()
    }
}

impl UserProfile {
    /// Apply a partial update and bump the version
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(xp) = update.total_xp {
            self.total_xp = xp;
        }
        if let Some(weekly) = update.weekly_completions {
            self.weekly_completions = weekly;
        }
        if let Some(week) = update.week_of {
            self.week_of = Some(week);
        }
        if let Some(total) = update.total_completions {
            self.total_completions = total;
        }
        if let Some(longest) = update.longest_streak_ever {
            self.longest_streak_ever = longest;
        }
        self.version += 1;
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BadgeCategory {
    Streak,
    Completions,
    HabitCount,
    Consistency,
}

/// A badge the user has unlocked
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnlockedBadge {
    pub badge_id: String,
    pub unlocked_at: DateTime<Utc>,
}

/// An unlock that has not been shown to the user yet
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BadgeNotification {
    pub badge_id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub unlocked_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn habit(kind: HabitKind, daily_target: i32) -> Habit {
        Habit {
            id: Uuid::new_v4(),
            name: "Water".to_string(),
            kind,
            frequency: Frequency::Daily,
            daily_target,
            unit: Some("glasses".to_string()),
            created_on: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            archived: false,
        }
    }

    #[test]
    fn test_boolean_habit_done_with_positive_value() {
        let h = habit(HabitKind::Boolean, 1);
        assert!(!h.is_done_with(0));
        assert!(h.is_done_with(1));
        assert!(h.is_done_with(3));
    }

    #[test]
    fn test_quantity_habit_needs_target() {
        let h = habit(HabitKind::Quantity, 8);
        assert!(!h.is_done_with(7));
        assert!(h.is_done_with(8));
        assert!(h.is_done_with(12));
    }

    #[test]
    fn test_validate_frequency() {
        assert!(Frequency::Daily.validate().is_ok());
        assert!(Frequency::SpecificWeekdays { days: vec![1, 3, 5] }
            .validate()
            .is_ok());
        assert!(matches!(
            Frequency::SpecificWeekdays { days: vec![] }.validate(),
            Err(Error::InconsistentFrequencyConfig(_))
        ));
        assert!(matches!(
            Frequency::SpecificWeekdays { days: vec![1, 7] }.validate(),
            Err(Error::InconsistentFrequencyConfig(_))
        ));
        assert!(matches!(
            Frequency::TimesPerWeek { times: 0 }.validate(),
            Err(Error::InconsistentFrequencyConfig(_))
        ));
        assert!(Frequency::TimesPerWeek { times: 3 }.validate().is_ok());
    }

    #[test]
    fn test_frequency_json_shape() {
        let json = serde_json::to_value(Frequency::SpecificWeekdays { days: vec![1, 3] }).unwrap();
        assert_eq!(json["type"], "specific_weekdays");
        assert_eq!(json["days"], serde_json::json!([1, 3]));

        let parsed: Frequency =
            serde_json::from_str(r#"{"type":"times_per_week","times":3}"#).unwrap();
        assert_eq!(parsed, Frequency::TimesPerWeek { times: 3 });
    }

    #[test]
    fn test_streak_record_apply() {
        let mut record = StreakRecord::empty(Uuid::new_v4());
        let day = NaiveDate::from_ymd_opt(2026, 3, 16).unwrap();

        record.apply(&StreakUpdate {
            current_streak: Some(4),
            longest_streak: Some(9),
            last_completed_date: DateChange::Set(day),
            award: AwardChange::Set { on: day, xp: 10 },
        });
        assert_eq!(record.streak(), Streak::new(4, 9));
        assert_eq!(record.last_awarded_on, Some(day));
        assert_eq!(record.last_award_xp, 10);

        record.apply(&StreakUpdate {
            award: AwardChange::Clear,
            ..Default::default()
        });
        assert_eq!(record.streak(), Streak::new(4, 9));
        assert_eq!(record.last_completed_date, Some(day));
        assert_eq!(record.last_awarded_on, None);
        assert_eq!(record.last_award_xp, 0);

        record.apply(&StreakUpdate {
            last_completed_date: DateChange::from(None),
            ..Default::default()
        });
        assert_eq!(record.last_completed_date, None);
    }

    #[test]
    fn test_profile_apply_bumps_version() {
        let mut profile = UserProfile::default();
        profile.apply(&ProfileUpdate {
            total_xp: Some(110),
            total_completions: Some(1),
            ..Default::default()
        });

        assert_eq!(profile.total_xp, 110);
        assert_eq!(profile.total_completions, 1);
        assert_eq!(profile.weekly_completions, 0);
        assert_eq!(profile.version, 1);
        assert!(ProfileUpdate::default().is_empty());
    }

    #[test]
    fn test_new_habit_defaults() {
        let parsed: NewHabit = serde_json::from_str(r#"{"name":"Read"}"#).unwrap();
        assert_eq!(parsed.kind, HabitKind::Boolean);
        assert_eq!(parsed.frequency, Frequency::Daily);
        assert_eq!(parsed.daily_target, 1);
        assert!(parsed.unit.is_none());
    }

    #[test]
    fn test_habit_changes_report_streak_relevant_edits() {
        let mut h = habit(HabitKind::Quantity, 8);

        let rename: HabitChanges = serde_json::from_str(r#"{"name":"Hydrate"}"#).unwrap();
        assert!(!rename.apply(&mut h));
        assert_eq!(h.name, "Hydrate");
        assert_eq!(h.unit.as_deref(), Some("glasses"));

        let retarget: HabitChanges =
            serde_json::from_str(r#"{"daily_target":10,"unit":null}"#).unwrap();
        assert!(retarget.apply(&mut h));
        assert_eq!(h.daily_target, 10);
        assert_eq!(h.unit, None);

        let reschedule: HabitChanges =
            serde_json::from_str(r#"{"frequency":{"type":"specific_weekdays","days":[1,3]}}"#)
                .unwrap();
        assert!(reschedule.apply(&mut h));
        assert_eq!(h.frequency, Frequency::SpecificWeekdays { days: vec![1, 3] });
    }

    #[test]
    fn test_completion_note_survives_json() {
        let completion = Completion {
            habit_id: Uuid::new_v4(),
            date: NaiveDate::from_ymd_opt(2026, 3, 16).unwrap(),
            value: 3,
            note: Some("before breakfast".to_string()),
        };
        let json = serde_json::to_string(&completion).unwrap();
        let parsed: Completion = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, completion);

        let without: Completion = serde_json::from_str(&format!(
            r#"{{"habit_id":"{}","date":"2026-03-16","value":1}}"#,
            Uuid::nil()
        ))
        .unwrap();
        assert_eq!(without.note, None);
    }

    #[test]
    fn test_scheduled_days() {
        let mwf = Frequency::SpecificWeekdays { days: vec![1, 3, 5] };
        assert!(mwf.is_scheduled_on(1));
        assert!(!mwf.is_scheduled_on(2));
        assert!(Frequency::Daily.is_scheduled_on(0));
        assert!(Frequency::TimesPerWeek { times: 2 }.is_scheduled_on(4));
    }
}
