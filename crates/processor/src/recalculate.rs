//! Streak recalculation from stored history

use chrono::NaiveDate;
use common::models::{
    AwardChange, DateChange, Habit, ProfileUpdate, Streak, StreakRecord, StreakUpdate,
};
use common::{Error, Result};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::handler::EventHandler;
use crate::store::{ProgressCommit, ProgressStore};
use crate::streaks::checked_streak;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecalculationStats {
    pub habits_processed: usize,
    pub records_changed: usize,
    pub invalid_configs: usize,
    pub longest_streak_ever: u32,
}

/// What rebuilding one habit's record produced
struct Refreshed {
    streak: Streak,
    changed: bool,
    invalid_config: bool,
}

impl<S: ProgressStore> EventHandler<S> {
    /// Recompute every active habit's streak record from its history.
    ///
    /// Never awards XP and never lowers a recorded longest streak.
    pub async fn recalculate_streaks(&self, today: NaiveDate) -> Result<RecalculationStats> {
        info!("Starting streak recalculation for {}", today);

        let habits = self.store.list_active_habits().await?;
        let mut stats = RecalculationStats::default();
        let mut longest_overall = 0u32;

        for habit in &habits {
            let lock = self.habit_lock(habit.id);
            let _guard = lock.lock().await;

            let refreshed = self.refresh_record(habit, today).await?;
            longest_overall = longest_overall.max(refreshed.streak.longest);
            stats.habits_processed += 1;
            if refreshed.invalid_config {
                stats.invalid_configs += 1;
            }
            if refreshed.changed {
                stats.records_changed += 1;
            }
        }

        let profile_longest = self
            .with_retries(|| self.raise_longest_streak_ever(longest_overall))
            .await?;
        stats.longest_streak_ever = profile_longest;

        info!(
            "Recalculation complete: {} habits, {} records changed, {} invalid configs",
            stats.habits_processed, stats.records_changed, stats.invalid_configs
        );
        Ok(stats)
    }

    /// Rebuild one habit's record after its schedule or target was edited
    pub async fn on_habit_updated(&self, habit_id: Uuid, today: NaiveDate) -> Result<Streak> {
        let lock = self.habit_lock(habit_id);
        let _guard = lock.lock().await;

        let habit = self
            .store
            .get_habit(habit_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("habit {}", habit_id)))?;

        let refreshed = self.refresh_record(&habit, today).await?;
        self.with_retries(|| self.raise_longest_streak_ever(refreshed.streak.longest))
            .await?;

        info!(
            "Habit {} edited, streak now {}/{}",
            habit_id, refreshed.streak.current, refreshed.streak.longest
        );
        Ok(refreshed.streak)
    }

    /// Caller holds the habit's lock
    async fn refresh_record(&self, habit: &Habit, today: NaiveDate) -> Result<Refreshed> {
        let done = self.store.list_completion_dates(habit).await?;
        let rest = self.store.list_rest_days(habit.id).await?;

        let mut invalid_config = false;
        let computed = match checked_streak(
            &habit.frequency,
            &done,
            today,
            &rest,
            self.settings.week_starts_on,
        ) {
            Ok(streak) => streak,
            Err(e) => {
                warn!("Habit {} ({}): {}", habit.name, habit.id, e);
                invalid_config = true;
                Default::default()
            }
        };

        let record = self
            .store
            .read_streak_record(habit.id)
            .await?
            .unwrap_or_else(|| StreakRecord::empty(habit.id));
        let streak = Streak::new(computed.current, computed.longest.max(record.longest_streak));
        let last_completed = done.last().copied();

        let changed = record.streak() != streak || record.last_completed_date != last_completed;
        if changed {
            self.store
                .commit(ProgressCommit {
                    streak: Some((
                        habit.id,
                        StreakUpdate {
                            current_streak: Some(streak.current),
                            longest_streak: Some(streak.longest),
                            last_completed_date: DateChange::from(last_completed),
                            award: AwardChange::Keep,
                        },
                    )),
                    profile: ProfileUpdate::default(),
                    expected_profile_version: 0,
                    unlocks: Vec::new(),
                })
                .await?;
        }

        Ok(Refreshed {
            streak,
            changed,
            invalid_config,
        })
    }

    async fn raise_longest_streak_ever(&self, candidate: u32) -> Result<u32> {
        let profile = self.store.read_user_profile().await?;
        if candidate <= profile.longest_streak_ever {
            return Ok(profile.longest_streak_ever);
        }

        self.store
            .commit(ProgressCommit {
                streak: None,
                profile: ProfileUpdate {
                    longest_streak_ever: Some(candidate),
                    ..Default::default()
                },
                expected_profile_version: profile.version,
                unlocks: Vec::new(),
            })
            .await?;

        info!("Longest streak ever raised to {}", candidate);
        Ok(candidate)
    }
}
