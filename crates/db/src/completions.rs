//! Completion queries

use chrono::NaiveDate;
use common::models::Completion;
use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, Row};
use uuid::Uuid;

const COMPLETION_COLUMNS: &str = "habit_id, date, value, note";

/// Blank notes are stored as no note
pub fn normalize_note(note: Option<&str>) -> Option<&str> {
    note.map(str::trim).filter(|n| !n.is_empty())
}

fn completion_from_row(row: &PgRow) -> Result<Completion, sqlx::Error> {
    Ok(Completion {
        habit_id: row.try_get("habit_id")?,
        date: row.try_get("date")?,
        value: row.try_get("value")?,
        note: row.try_get("note")?,
    })
}

/// Record a completion, replacing the value already recorded for that day.
///
/// An existing note is kept unless a new one is given.
pub async fn record<'e, E: PgExecutor<'e>>(
    executor: E,
    habit_id: Uuid,
    date: NaiveDate,
    value: i32,
    note: Option<&str>,
) -> Result<Completion, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"
        INSERT INTO completions (habit_id, date, value, note)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (habit_id, date) DO UPDATE
        SET value = EXCLUDED.value,
            note = COALESCE(EXCLUDED.note, completions.note)
        RETURNING {}
        "#,
        COMPLETION_COLUMNS
    ))
    .bind(habit_id)
    .bind(date)
    .bind(value)
    .bind(normalize_note(note))
    .fetch_one(executor)
    .await?;

    completion_from_row(&row)
}

/// Replace or clear a day's note. Returns false when there is no completion.
pub async fn update_note<'e, E: PgExecutor<'e>>(
    executor: E,
    habit_id: Uuid,
    date: NaiveDate,
    note: Option<&str>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE completions SET note = $3 WHERE habit_id = $1 AND date = $2")
        .bind(habit_id)
        .bind(date)
        .bind(normalize_note(note))
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Remove a day's completion. Returns false when there was none.
pub async fn remove<'e, E: PgExecutor<'e>>(
    executor: E,
    habit_id: Uuid,
    date: NaiveDate,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM completions WHERE habit_id = $1 AND date = $2")
        .bind(habit_id)
        .bind(date)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// All completions of a habit, oldest first
pub async fn list_for_habit<'e, E: PgExecutor<'e>>(
    executor: E,
    habit_id: Uuid,
) -> Result<Vec<Completion>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM completions WHERE habit_id = $1 ORDER BY date",
        COMPLETION_COLUMNS
    ))
    .bind(habit_id)
    .fetch_all(executor)
    .await?;

    rows.iter().map(completion_from_row).collect()
}

/// A habit's completions between two optional bounds (inclusive), newest first
pub async fn list_in_range<'e, E: PgExecutor<'e>>(
    executor: E,
    habit_id: Uuid,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Result<Vec<Completion>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"
        SELECT {}
        FROM completions
        WHERE habit_id = $1
          AND ($2::date IS NULL OR date >= $2)
          AND ($3::date IS NULL OR date <= $3)
        ORDER BY date DESC
        "#,
        COMPLETION_COLUMNS
    ))
    .bind(habit_id)
    .bind(start)
    .bind(end)
    .fetch_all(executor)
    .await?;

    rows.iter().map(completion_from_row).collect()
}

/// Completion records per day across all habits, for calendar views
pub async fn count_by_date<'e, E: PgExecutor<'e>>(
    executor: E,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<(NaiveDate, i64)>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT date, COUNT(*) AS count
        FROM completions
        WHERE date >= $1 AND date <= $2
        GROUP BY date
        ORDER BY date
        "#,
    )
    .bind(start)
    .bind(end)
    .fetch_all(executor)
    .await?;

    rows.iter()
        .map(|r| Ok((r.try_get("date")?, r.try_get("count")?)))
        .collect()
}
