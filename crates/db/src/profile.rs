//! User profile queries
//!
//! There is a single profile row (id = 1), seeded by the migration. Writes
//! are guarded by its version column.

use common::models::{ProfileUpdate, UserProfile};
use sqlx::{PgExecutor, Row};

use crate::{from_db_count, to_db_count};

pub async fn read<'e, E: PgExecutor<'e>>(executor: E) -> Result<UserProfile, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT total_xp, weekly_completions, week_of, total_completions,
               longest_streak_ever, version
        FROM user_profile
        WHERE id = 1
        "#,
    )
    .fetch_optional(executor)
    .await?;

    let Some(r) = row else {
        return Ok(UserProfile::default());
    };

    Ok(UserProfile {
        total_xp: r.try_get("total_xp")?,
        weekly_completions: from_db_count(r.try_get("weekly_completions")?),
        week_of: r.try_get("week_of")?,
        total_completions: from_db_count(r.try_get("total_completions")?),
        longest_streak_ever: from_db_count(r.try_get("longest_streak_ever")?),
        version: r.try_get("version")?,
    })
}

/// Apply a partial update if the stored version still matches.
///
/// Returns false when another writer got there first.
pub async fn write<'e, E: PgExecutor<'e>>(
    executor: E,
    update: &ProfileUpdate,
    expected_version: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE user_profile
        SET total_xp = COALESCE($1, total_xp),
            weekly_completions = COALESCE($2, weekly_completions),
            week_of = COALESCE($3, week_of),
            total_completions = COALESCE($4, total_completions),
            longest_streak_ever = COALESCE($5, longest_streak_ever),
            version = version + 1
        WHERE id = 1 AND version = $6
        "#,
    )
    .bind(update.total_xp)
    .bind(update.weekly_completions.map(to_db_count))
    .bind(update.week_of)
    .bind(update.total_completions.map(to_db_count))
    .bind(update.longest_streak_ever.map(to_db_count))
    .bind(expected_version)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() == 1)
}
