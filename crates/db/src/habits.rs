//! Habit queries

use chrono::NaiveDate;
use common::models::{Frequency, Habit, HabitKind, NewHabit};
use sqlx::postgres::PgRow;
use sqlx::{PgExecutor, Row};
use uuid::Uuid;

const HABIT_COLUMNS: &str = "id, name, kind, frequency, specific_days, times_per_week, \
                             daily_target, unit, created_on, archived";

/// Rebuild a frequency from its column encoding.
///
/// Out-of-range stored values are kept out of range so that validation
/// reports them instead of silently fixing them.
pub fn frequency_from_columns(
    frequency: &str,
    specific_days: &[i32],
    times_per_week: i32,
) -> Option<Frequency> {
    match frequency {
        "daily" => Some(Frequency::Daily),
        "specific_weekdays" => Some(Frequency::SpecificWeekdays {
            days: specific_days
                .iter()
                .map(|d| u8::try_from(*d).unwrap_or(u8::MAX))
                .collect(),
        }),
        "times_per_week" => Some(Frequency::TimesPerWeek {
            times: u32::try_from(times_per_week).unwrap_or(0),
        }),
        _ => None,
    }
}

/// Column encoding of a frequency: `(frequency, specific_days, times_per_week)`
pub fn frequency_columns(frequency: &Frequency) -> (&'static str, Vec<i32>, i32) {
    match frequency {
        Frequency::Daily => (frequency.kind_str(), Vec::new(), 0),
        Frequency::SpecificWeekdays { days } => (
            frequency.kind_str(),
            days.iter().map(|d| i32::from(*d)).collect(),
            0,
        ),
        Frequency::TimesPerWeek { times } => (
            frequency.kind_str(),
            Vec::new(),
            i32::try_from(*times).unwrap_or(i32::MAX),
        ),
    }
}

fn decode_error(message: String) -> sqlx::Error {
    sqlx::Error::Decode(message.into())
}

fn habit_from_row(row: &PgRow) -> Result<Habit, sqlx::Error> {
    let kind: String = row.try_get("kind")?;
    let frequency: String = row.try_get("frequency")?;
    let specific_days: Vec<i32> = row.try_get("specific_days")?;
    let times_per_week: i32 = row.try_get("times_per_week")?;

    Ok(Habit {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        kind: HabitKind::parse(&kind)
            .ok_or_else(|| decode_error(format!("unknown habit kind '{}'", kind)))?,
        frequency: frequency_from_columns(&frequency, &specific_days, times_per_week)
            .ok_or_else(|| decode_error(format!("unknown frequency '{}'", frequency)))?,
        daily_target: row.try_get("daily_target")?,
        unit: row.try_get("unit")?,
        created_on: row.try_get("created_on")?,
        archived: row.try_get("archived")?,
    })
}

/// Insert a new habit
pub async fn create<'e, E: PgExecutor<'e>>(
    executor: E,
    habit: &NewHabit,
    created_on: NaiveDate,
) -> Result<Habit, sqlx::Error> {
    let (frequency, specific_days, times_per_week) = frequency_columns(&habit.frequency);

    let row = sqlx::query(&format!(
        r#"
        INSERT INTO habits (id, name, kind, frequency, specific_days, times_per_week,
                            daily_target, unit, created_on, archived)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, FALSE)
        RETURNING {}
        "#,
        HABIT_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&habit.name)
    .bind(habit.kind.as_str())
    .bind(frequency)
    .bind(specific_days)
    .bind(times_per_week)
    .bind(habit.daily_target)
    .bind(habit.unit.as_deref())
    .bind(created_on)
    .fetch_one(executor)
    .await?;

    habit_from_row(&row)
}

/// Get habit by ID, archived or not
pub async fn get<'e, E: PgExecutor<'e>>(
    executor: E,
    id: Uuid,
) -> Result<Option<Habit>, sqlx::Error> {
    let row = sqlx::query(&format!("SELECT {} FROM habits WHERE id = $1", HABIT_COLUMNS))
        .bind(id)
        .fetch_optional(executor)
        .await?;

    row.as_ref().map(habit_from_row).transpose()
}

/// All habits that are not archived, oldest first
pub async fn list_active<'e, E: PgExecutor<'e>>(executor: E) -> Result<Vec<Habit>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM habits WHERE NOT archived ORDER BY created_on, name",
        HABIT_COLUMNS
    ))
    .fetch_all(executor)
    .await?;

    rows.iter().map(habit_from_row).collect()
}

pub async fn count_active<'e, E: PgExecutor<'e>>(executor: E) -> Result<i64, sqlx::Error> {
    let row = sqlx::query("SELECT COUNT(*) AS count FROM habits WHERE NOT archived")
        .fetch_one(executor)
        .await?;

    row.try_get("count")
}

/// Archive a habit. Returns false when no such habit exists.
pub async fn archive<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE habits SET archived = TRUE WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Overwrite a habit's editable fields. Returns false when no such habit exists.
pub async fn update<'e, E: PgExecutor<'e>>(
    executor: E,
    habit: &Habit,
) -> Result<bool, sqlx::Error> {
    let (frequency, specific_days, times_per_week) = frequency_columns(&habit.frequency);

    let result = sqlx::query(
        r#"
        UPDATE habits
        SET name = $2, kind = $3, frequency = $4, specific_days = $5,
            times_per_week = $6, daily_target = $7, unit = $8
        WHERE id = $1
        "#,
    )
    .bind(habit.id)
    .bind(&habit.name)
    .bind(habit.kind.as_str())
    .bind(frequency)
    .bind(specific_days)
    .bind(times_per_week)
    .bind(habit.daily_target)
    .bind(habit.unit.as_deref())
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete a habit with its completions, rest days and streak record.
/// Returns false when no such habit exists.
pub async fn delete<'e, E: PgExecutor<'e>>(executor: E, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM habits WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_columns_roundtrip_shapes() {
        let mwf = Frequency::SpecificWeekdays {
            days: vec![1, 3, 5],
        };
        let (name, days, times) = frequency_columns(&mwf);
        assert_eq!(name, "specific_weekdays");
        assert_eq!(days, vec![1, 3, 5]);
        assert_eq!(times, 0);
        assert_eq!(frequency_from_columns(name, &days, times), Some(mwf));

        let (name, days, times) = frequency_columns(&Frequency::TimesPerWeek { times: 3 });
        assert_eq!((name, days.is_empty(), times), ("times_per_week", true, 3));
    }

    #[test]
    fn test_invalid_stored_values_stay_invalid() {
        let frequency = frequency_from_columns("specific_weekdays", &[1, -2], 0).unwrap();
        assert!(frequency.validate().is_err());

        let frequency = frequency_from_columns("times_per_week", &[], -1).unwrap();
        assert_eq!(frequency, Frequency::TimesPerWeek { times: 0 });
        assert!(frequency.validate().is_err());

        assert_eq!(frequency_from_columns("monthly", &[], 0), None);
    }
}
