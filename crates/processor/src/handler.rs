//! Gamification orchestrator
//!
//! Turns habit events into streak, XP and badge updates. Each event reads
//! what it needs, computes the new state with the pure calculators and
//! writes everything through one store commit. Badge unlocks are announced
//! on a channel only after that commit succeeded.

use chrono::{DateTime, NaiveDate, Utc};
use common::config::EngineSettings;
use common::models::{
    AwardChange, DateChange, ProfileUpdate, Streak, StreakRecord, StreakUpdate, UnlockedBadge,
    UserProfile,
};
use common::{Error, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::achievements::{self, AchievementContext};
use crate::consistency::{count_perfect_periods, HabitHistory, PerfectPeriods};
use crate::dates::{today, week_start};
use crate::scores::{did_level_up, level_for_xp, xp_for_completion, BADGE_UNLOCK_XP};
use crate::store::{ProgressCommit, ProgressStore};
use crate::streaks::checked_streak;

/// Emitted once per badge, after the unlock is persisted
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BadgeUnlocked {
    pub badge_id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub unlocked_at: DateTime<Utc>,
}

impl BadgeUnlocked {
    fn new(badge_id: &str, unlocked_at: DateTime<Utc>) -> Self {
        match achievements::find_badge(badge_id) {
            Some(badge) => Self {
                badge_id: badge.id.to_string(),
                name: badge.name.to_string(),
                description: badge.description.to_string(),
                icon: badge.icon.to_string(),
                unlocked_at,
            },
            None => Self {
                badge_id: badge_id.to_string(),
                name: badge_id.to_string(),
                description: String::new(),
                icon: String::new(),
                unlocked_at,
            },
        }
    }
}

/// Result of processing a completion
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub habit_id: Uuid,
    pub streak: Streak,
    /// Completion XP, 0 when today is not done or was already awarded
    pub xp_awarded: i64,
    /// XP from badges unlocked by this event
    pub badge_xp: i64,
    pub total_xp: i64,
    pub level: u32,
    pub leveled_up: bool,
    pub unlocked: Vec<BadgeUnlocked>,
    /// Set when the habit's frequency config is unusable; the streak is then `{0, 0}`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_error: Option<String>,
}

/// Result of undoing a completion
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UndoOutcome {
    pub habit_id: Uuid,
    pub streak: Streak,
    pub xp_deducted: i64,
    pub total_xp: i64,
    pub level: u32,
}

/// One async mutex per habit id
#[derive(Default)]
struct HabitLocks {
    locks: Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>,
}

impl HabitLocks {
    fn get(&self, habit_id: Uuid) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.entry(habit_id).or_default().clone()
    }
}

/// Handles habit events against a progress store
pub struct EventHandler<S> {
    pub(crate) store: S,
    pub(crate) settings: EngineSettings,
    locks: HabitLocks,
    unlocks: mpsc::UnboundedSender<BadgeUnlocked>,
}

impl<S: ProgressStore> EventHandler<S> {
    /// Create a handler and the receiving end of its badge unlock events
    pub fn new(
        store: S,
        settings: EngineSettings,
    ) -> (Self, mpsc::UnboundedReceiver<BadgeUnlocked>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handler = Self {
            store,
            settings,
            locks: HabitLocks::default(),
            unlocks: tx,
        };
        (handler, rx)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub(crate) fn habit_lock(&self, habit_id: Uuid) -> Arc<AsyncMutex<()>> {
        self.locks.get(habit_id)
    }

    /// Process a completion recorded for today
    pub async fn on_habit_completed(&self, habit_id: Uuid) -> Result<CompletionOutcome> {
        self.on_habit_completed_on(habit_id, today()).await
    }

    /// Process a completion with an explicit reference day
    pub async fn on_habit_completed_on(
        &self,
        habit_id: Uuid,
        today: NaiveDate,
    ) -> Result<CompletionOutcome> {
        let lock = self.habit_lock(habit_id);
        let _guard = lock.lock().await;

        let outcome = self
            .with_retries(move || self.complete_once(habit_id, today))
            .await?;

        for event in &outcome.unlocked {
            info!("🏆 Badge unlocked: {} ({})", event.name, event.badge_id);
            if self.unlocks.send(event.clone()).is_err() {
                warn!(
                    "Badge unlock receiver dropped, {} not delivered",
                    event.badge_id
                );
            }
        }
        if outcome.leveled_up {
            info!("⬆️ Reached level {}", outcome.level);
        }

        Ok(outcome)
    }

    /// Reverse today's completion award
    pub async fn on_habit_completion_undone(&self, habit_id: Uuid) -> Result<UndoOutcome> {
        self.on_habit_completion_undone_on(habit_id, today()).await
    }

    pub async fn on_habit_completion_undone_on(
        &self,
        habit_id: Uuid,
        today: NaiveDate,
    ) -> Result<UndoOutcome> {
        let lock = self.habit_lock(habit_id);
        let _guard = lock.lock().await;

        self.with_retries(move || self.undo_once(habit_id, today))
            .await
    }

    /// Stored streak for display, `{0, 0}` when nothing was recorded yet
    pub async fn get_display_streak(&self, habit_id: Uuid) -> Result<Streak> {
        Ok(self
            .store
            .read_streak_record(habit_id)
            .await?
            .map(|record| record.streak())
            .unwrap_or_default())
    }

    /// Run `attempt` again after profile write conflicts, backing off each time
    pub(crate) async fn with_retries<T, F, Fut>(&self, mut attempt: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut retries = 0u32;
        let mut backoff = self.settings.retry_backoff;

        loop {
            match attempt().await {
                Err(e) if e.is_retryable() && retries < self.settings.max_commit_retries => {
                    retries += 1;
                    warn!(
                        "{}; retry {}/{} in {:?}",
                        e, retries, self.settings.max_commit_retries, backoff
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                }
                result => return result,
            }
        }
    }

    async fn complete_once(&self, habit_id: Uuid, today: NaiveDate) -> Result<CompletionOutcome> {
        let habit = self
            .store
            .get_habit(habit_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("habit {}", habit_id)))?;

        let done = self.store.list_completion_dates(&habit).await?;
        let rest = self.store.list_rest_days(habit_id).await?;

        let (computed, frequency_error) = match checked_streak(
            &habit.frequency,
            &done,
            today,
            &rest,
            self.settings.week_starts_on,
        ) {
            Ok(streak) => (streak, None),
            Err(e) => {
                warn!("Habit {}: {}", habit_id, e);
                (Streak::default(), Some(e.to_string()))
            }
        };

        let record = self
            .store
            .read_streak_record(habit_id)
            .await?
            .unwrap_or_else(|| StreakRecord::empty(habit_id));
        let streak = Streak::new(
            computed.current,
            computed.longest.max(record.longest_streak),
        );

        let awarded_today = record.last_awarded_on == Some(today);
        let xp_awarded = if done.contains(&today) && !awarded_today {
            xp_for_completion(streak.current)
        } else {
            0
        };
        if awarded_today && done.contains(&today) {
            debug!("Habit {} already awarded for {}", habit_id, today);
        }

        let profile = self.store.read_user_profile().await?;
        let mut next = profile.clone();

        if xp_awarded > 0 {
            let week = week_start(today, self.settings.week_starts_on);
            next.total_xp += xp_awarded;
            next.total_completions = next.total_completions.saturating_add(1);
            next.weekly_completions = if profile.week_of == Some(week) {
                profile.weekly_completions.saturating_add(1)
            } else {
                1
            };
            next.week_of = Some(week);
        }
        next.longest_streak_ever = profile.longest_streak_ever.max(streak.longest);

        let perfect = self.perfect_periods(today).await?;
        let ctx = AchievementContext {
            longest_streak_ever: next.longest_streak_ever,
            total_completions: next.total_completions,
            habit_count: self.store.count_active_habits().await?,
            perfect_weeks: perfect.weeks,
            perfect_months: perfect.months,
            unlocked: self.store.list_unlocked_badge_ids().await?,
        };

        let unlocked_at = Utc::now();
        let unlocked: Vec<BadgeUnlocked> = achievements::evaluate(&ctx)
            .into_iter()
            .map(|id| BadgeUnlocked::new(id, unlocked_at))
            .collect();
        let badge_xp = BADGE_UNLOCK_XP * unlocked.len() as i64;
        next.total_xp += badge_xp;

        let commit = ProgressCommit {
            streak: Some((
                habit_id,
                StreakUpdate {
                    current_streak: Some(streak.current),
                    longest_streak: Some(streak.longest),
                    last_completed_date: DateChange::from(done.last().copied()),
                    award: if xp_awarded > 0 {
                        AwardChange::Set {
                            on: today,
                            xp: xp_awarded,
                        }
                    } else {
                        AwardChange::Keep
                    },
                },
            )),
            profile: profile_diff(&profile, &next),
            expected_profile_version: profile.version,
            unlocks: unlocked
                .iter()
                .map(|b| UnlockedBadge {
                    badge_id: b.badge_id.clone(),
                    unlocked_at: b.unlocked_at,
                })
                .collect(),
        };
        self.store.commit(commit).await?;

        debug!(
            "Habit {} completed: streak {}/{}, +{} XP, +{} badge XP",
            habit_id, streak.current, streak.longest, xp_awarded, badge_xp
        );

        let level = level_for_xp(next.total_xp);
        Ok(CompletionOutcome {
            habit_id,
            streak,
            xp_awarded,
            badge_xp,
            total_xp: next.total_xp,
            level,
            leveled_up: did_level_up(profile.total_xp, next.total_xp),
            unlocked,
            frequency_error,
        })
    }

    async fn undo_once(&self, habit_id: Uuid, today: NaiveDate) -> Result<UndoOutcome> {
        let habit = self
            .store
            .get_habit(habit_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("habit {}", habit_id)))?;
        let record = self
            .store
            .read_streak_record(habit_id)
            .await?
            .unwrap_or_else(|| StreakRecord::empty(habit_id));
        let profile = self.store.read_user_profile().await?;

        if record.last_awarded_on != Some(today) {
            debug!("Habit {}: nothing awarded for {}, undo is a no-op", habit_id, today);
            return Ok(UndoOutcome {
                habit_id,
                streak: record.streak(),
                xp_deducted: 0,
                total_xp: profile.total_xp,
                level: level_for_xp(profile.total_xp),
            });
        }

        // The longest streak never shrinks; only the current run is refreshed
        let done = self.store.list_completion_dates(&habit).await?;
        let rest = self.store.list_rest_days(habit_id).await?;
        let current = checked_streak(
            &habit.frequency,
            &done,
            today,
            &rest,
            self.settings.week_starts_on,
        )
        .map(|s| s.current)
        .unwrap_or(0);
        let streak = Streak::new(current, record.longest_streak.max(current));

        let mut next = profile.clone();
        next.total_xp = (profile.total_xp - record.last_award_xp).max(0);
        let xp_deducted = profile.total_xp - next.total_xp;
        next.total_completions = profile.total_completions.saturating_sub(1);
        if profile.week_of == Some(week_start(today, self.settings.week_starts_on)) {
            next.weekly_completions = profile.weekly_completions.saturating_sub(1);
        }

        self.store
            .commit(ProgressCommit {
                streak: Some((
                    habit_id,
                    StreakUpdate {
                        current_streak: Some(streak.current),
                        longest_streak: Some(streak.longest),
                        last_completed_date: DateChange::from(done.last().copied()),
                        award: AwardChange::Clear,
                    },
                )),
                profile: profile_diff(&profile, &next),
                expected_profile_version: profile.version,
                unlocks: Vec::new(),
            })
            .await?;

        info!("Undid completion of habit {} on {}: -{} XP", habit_id, today, xp_deducted);

        Ok(UndoOutcome {
            habit_id,
            streak,
            xp_deducted,
            total_xp: next.total_xp,
            level: level_for_xp(next.total_xp),
        })
    }

    /// Perfect weeks and months across all active habits
    pub(crate) async fn perfect_periods(&self, today: NaiveDate) -> Result<PerfectPeriods> {
        let habits = self.store.list_active_habits().await?;

        let mut histories = Vec::with_capacity(habits.len());
        for habit in &habits {
            histories.push(HabitHistory {
                habit,
                done: self.store.list_completion_dates(habit).await?,
                rest: self.store.list_rest_days(habit.id).await?,
            });
        }

        Ok(count_perfect_periods(
            &histories,
            today,
            self.settings.week_starts_on,
        ))
    }
}

/// Fields of `next` that differ from `current`
pub(crate) fn profile_diff(current: &UserProfile, next: &UserProfile) -> ProfileUpdate {
    fn changed<T: PartialEq + Copy>(old: T, new: T) -> Option<T> {
        (old != new).then_some(new)
    }

    ProfileUpdate {
        total_xp: changed(current.total_xp, next.total_xp),
        weekly_completions: changed(current.weekly_completions, next.weekly_completions),
        week_of: if current.week_of != next.week_of {
            next.week_of
        } else {
            None
        },
        total_completions: changed(current.total_completions, next.total_completions),
        longest_streak_ever: changed(current.longest_streak_ever, next.longest_streak_ever),
    }
}
