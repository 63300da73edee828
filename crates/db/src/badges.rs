//! Badge unlock and notification queries

use chrono::{DateTime, Utc};
use common::models::UnlockedBadge;
use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, Row};

fn unlocked_from_row(row: &PgRow) -> Result<UnlockedBadge, sqlx::Error> {
    Ok(UnlockedBadge {
        badge_id: row.try_get("id")?,
        unlocked_at: row.try_get("unlocked_at")?,
    })
}

/// Unlock a badge. Returns false if it was already unlocked.
pub async fn unlock<'e, E: PgExecutor<'e>>(
    executor: E,
    badge_id: &str,
    unlocked_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO badges (id, unlocked_at) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING",
    )
    .bind(badge_id)
    .bind(unlocked_at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// All unlocked badges, in unlock order
pub async fn list_unlocked<'e, E: PgExecutor<'e>>(
    executor: E,
) -> Result<Vec<UnlockedBadge>, sqlx::Error> {
    let rows = sqlx::query("SELECT id, unlocked_at FROM badges ORDER BY unlocked_at, id")
        .fetch_all(executor)
        .await?;

    rows.iter().map(unlocked_from_row).collect()
}

/// Unlocks not yet shown to the user
pub async fn list_pending<'e, E: PgExecutor<'e>>(
    executor: E,
) -> Result<Vec<UnlockedBadge>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT id, unlocked_at FROM badges WHERE notified_at IS NULL ORDER BY unlocked_at, id",
    )
    .fetch_all(executor)
    .await?;

    rows.iter().map(unlocked_from_row).collect()
}

/// Mark a pending notification as delivered. Returns false if there was none.
pub async fn mark_notified<'e, E: PgExecutor<'e>>(
    executor: E,
    badge_id: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE badges SET notified_at = NOW() WHERE id = $1 AND notified_at IS NULL",
    )
    .bind(badge_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}
