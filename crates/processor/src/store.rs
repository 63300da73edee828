//! Storage boundary for the gamification orchestrator
//!
//! Reads are individual calls; every write belonging to one event goes
//! through a single [`ProgressStore::commit`] so it is applied all-or-nothing.

use chrono::NaiveDate;
use common::models::{
    Completion, Habit, ProfileUpdate, StreakRecord, StreakUpdate, UnlockedBadge, UserProfile,
};
use common::{Error, Result};
use sqlx::PgPool;
use std::collections::BTreeSet;
use std::future::Future;
use tracing::debug;
use uuid::Uuid;

use crate::streaks::done_dates;

/// Everything one event writes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressCommit {
    /// Streak record write for one habit
    pub streak: Option<(Uuid, StreakUpdate)>,
    /// Skipped entirely (including the version check) when empty
    pub profile: ProfileUpdate,
    pub expected_profile_version: i64,
    pub unlocks: Vec<UnlockedBadge>,
}

/// Persistence used by the orchestrator
pub trait ProgressStore: Send + Sync {
    fn get_habit(&self, id: Uuid) -> impl Future<Output = Result<Option<Habit>>> + Send;

    fn list_active_habits(&self) -> impl Future<Output = Result<Vec<Habit>>> + Send;

    fn list_completions(
        &self,
        habit_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Completion>>> + Send;

    /// Days the habit counts as done
    fn list_completion_dates(
        &self,
        habit: &Habit,
    ) -> impl Future<Output = Result<BTreeSet<NaiveDate>>> + Send {
        async move {
            let completions = self.list_completions(habit.id).await?;
            Ok(done_dates(habit, &completions))
        }
    }

    fn list_rest_days(
        &self,
        habit_id: Uuid,
    ) -> impl Future<Output = Result<BTreeSet<NaiveDate>>> + Send;

    fn read_user_profile(&self) -> impl Future<Output = Result<UserProfile>> + Send;

    fn read_streak_record(
        &self,
        habit_id: Uuid,
    ) -> impl Future<Output = Result<Option<StreakRecord>>> + Send;

    fn list_unlocked_badge_ids(&self) -> impl Future<Output = Result<BTreeSet<String>>> + Send;

    fn count_active_habits(&self) -> impl Future<Output = Result<u32>> + Send;

    /// Apply a commit atomically.
    ///
    /// Fails with [`Error::ProfileWriteConflict`] and writes nothing when the
    /// profile version moved since it was read.
    fn commit(&self, commit: ProgressCommit) -> impl Future<Output = Result<()>> + Send;
}

fn db_err(e: sqlx::Error) -> Error {
    Error::Database(e.to_string())
}

/// Postgres-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl ProgressStore for PgStore {
    async fn get_habit(&self, id: Uuid) -> Result<Option<Habit>> {
        db::habits::get(&self.pool, id).await.map_err(db_err)
    }

    async fn list_active_habits(&self) -> Result<Vec<Habit>> {
        db::habits::list_active(&self.pool).await.map_err(db_err)
    }

    async fn list_completions(&self, habit_id: Uuid) -> Result<Vec<Completion>> {
        db::completions::list_for_habit(&self.pool, habit_id)
            .await
            .map_err(db_err)
    }

    async fn list_rest_days(&self, habit_id: Uuid) -> Result<BTreeSet<NaiveDate>> {
        let days = db::rest_days::list_for_habit(&self.pool, habit_id)
            .await
            .map_err(db_err)?;
        Ok(days.into_iter().map(|d| d.date).collect())
    }

    async fn read_user_profile(&self) -> Result<UserProfile> {
        db::profile::read(&self.pool).await.map_err(db_err)
    }

    async fn read_streak_record(&self, habit_id: Uuid) -> Result<Option<StreakRecord>> {
        db::streaks::get(&self.pool, habit_id).await.map_err(db_err)
    }

    async fn list_unlocked_badge_ids(&self) -> Result<BTreeSet<String>> {
        let unlocked = db::badges::list_unlocked(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(unlocked.into_iter().map(|b| b.badge_id).collect())
    }

    async fn count_active_habits(&self) -> Result<u32> {
        let count = db::habits::count_active(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(u32::try_from(count).unwrap_or(u32::MAX))
    }

    async fn commit(&self, commit: ProgressCommit) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;

        if let Some((habit_id, update)) = &commit.streak {
            db::streaks::write(&mut *tx, *habit_id, update)
                .await
                .map_err(db_err)?;
        }

        if !commit.profile.is_empty() {
            let written =
                db::profile::write(&mut *tx, &commit.profile, commit.expected_profile_version)
                    .await
                    .map_err(db_err)?;
            if !written {
                // Dropping the transaction rolls back the streak write
                return Err(Error::ProfileWriteConflict {
                    expected_version: commit.expected_profile_version,
                });
            }
        }

        for badge in &commit.unlocks {
            db::badges::unlock(&mut *tx, &badge.badge_id, badge.unlocked_at)
                .await
                .map_err(db_err)?;
        }

        tx.commit().await.map_err(db_err)?;
        debug!(
            "Committed progress (streak: {}, profile: {}, {} unlocks)",
            commit.streak.is_some(),
            !commit.profile.is_empty(),
            commit.unlocks.len()
        );
        Ok(())
    }
}

#[cfg(test)]
pub(crate) use memory::MemoryStore;
