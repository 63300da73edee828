//! Streak record queries

use common::models::{AwardChange, DateChange, StreakRecord, StreakUpdate};
use sqlx::{PgExecutor, Row};
use uuid::Uuid;

use crate::{from_db_count, to_db_count};

pub async fn get<'e, E: PgExecutor<'e>>(
    executor: E,
    habit_id: Uuid,
) -> Result<Option<StreakRecord>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT habit_id, current_streak, longest_streak, last_completed_date,
               last_awarded_on, last_award_xp
        FROM streak_records
        WHERE habit_id = $1
        "#,
    )
    .bind(habit_id)
    .fetch_optional(executor)
    .await?;

    let Some(r) = row else {
        return Ok(None);
    };

    Ok(Some(StreakRecord {
        habit_id: r.try_get("habit_id")?,
        current_streak: from_db_count(r.try_get("current_streak")?),
        longest_streak: from_db_count(r.try_get("longest_streak")?),
        last_completed_date: r.try_get("last_completed_date")?,
        last_awarded_on: r.try_get("last_awarded_on")?,
        last_award_xp: r.try_get("last_award_xp")?,
    }))
}

/// Apply a partial update, creating the record if it does not exist yet
pub async fn write<'e, E: PgExecutor<'e>>(
    executor: E,
    habit_id: Uuid,
    update: &StreakUpdate,
) -> Result<(), sqlx::Error> {
    let (award_mode, awarded_on, award_xp) = match update.award {
        AwardChange::Keep => ("keep", None, None),
        AwardChange::Set { on, xp } => ("set", Some(on), Some(xp)),
        AwardChange::Clear => ("clear", None, None),
    };
    let (set_last_completed, last_completed) = match update.last_completed_date {
        DateChange::Keep => (false, None),
        DateChange::Set(date) => (true, Some(date)),
        DateChange::Clear => (true, None),
    };

    sqlx::query(
        r#"
        INSERT INTO streak_records (habit_id, current_streak, longest_streak,
                                    last_completed_date, last_awarded_on, last_award_xp)
        VALUES ($1, COALESCE($2, 0), COALESCE($3, 0), $4, $6, COALESCE($7, 0))
        ON CONFLICT (habit_id) DO UPDATE
        SET current_streak = COALESCE($2, streak_records.current_streak),
            longest_streak = COALESCE($3, streak_records.longest_streak),
            last_completed_date = CASE WHEN $8
                                       THEN $4 ELSE streak_records.last_completed_date END,
            last_awarded_on = CASE WHEN $5 = 'keep'
                                   THEN streak_records.last_awarded_on ELSE $6 END,
            last_award_xp = CASE WHEN $5 = 'keep'
                                 THEN streak_records.last_award_xp ELSE COALESCE($7, 0) END
        "#,
    )
    .bind(habit_id)
    .bind(update.current_streak.map(to_db_count))
    .bind(update.longest_streak.map(to_db_count))
    .bind(last_completed)
    .bind(award_mode)
    .bind(awarded_on)
    .bind(award_xp)
    .bind(set_last_completed)
    .execute(executor)
    .await?;

    Ok(())
}
