//! Rest-day queries

use chrono::NaiveDate;
use common::models::RestDay;
use sqlx::{PgExecutor, Row};
use uuid::Uuid;

/// Mark a day as rest. Marking again replaces the reason.
pub async fn skip<'e, E: PgExecutor<'e>>(
    executor: E,
    habit_id: Uuid,
    date: NaiveDate,
    reason: Option<&str>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO rest_days (habit_id, date, reason) VALUES ($1, $2, $3)
        ON CONFLICT (habit_id, date) DO UPDATE SET reason = EXCLUDED.reason
        "#,
    )
    .bind(habit_id)
    .bind(date)
    .bind(reason.map(str::trim).filter(|r| !r.is_empty()))
    .execute(executor)
    .await?;

    Ok(())
}

/// Unmark a rest day. Returns false when the day was not marked.
pub async fn unskip<'e, E: PgExecutor<'e>>(
    executor: E,
    habit_id: Uuid,
    date: NaiveDate,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM rest_days WHERE habit_id = $1 AND date = $2")
        .bind(habit_id)
        .bind(date)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn list_for_habit<'e, E: PgExecutor<'e>>(
    executor: E,
    habit_id: Uuid,
) -> Result<Vec<RestDay>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT habit_id, date, reason FROM rest_days WHERE habit_id = $1 ORDER BY date",
    )
    .bind(habit_id)
    .fetch_all(executor)
    .await?;

    rows.iter()
        .map(|r| {
            Ok(RestDay {
                habit_id: r.try_get("habit_id")?,
                date: r.try_get("date")?,
                reason: r.try_get("reason")?,
            })
        })
        .collect()
}
