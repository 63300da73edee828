//! Habit routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use common::models::{Frequency, Habit, HabitChanges, NewHabit, RestDay, Streak};
use processor::dates::{parse_date, today};
use processor::{CompletionOutcome, UndoOutcome};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, DbResultExt, OptionExt};
use crate::state::AppState;

/// A habit with its stored streak
#[derive(Serialize)]
pub struct HabitWithStreak {
    #[serde(flatten)]
    pub habit: Habit,
    pub streak: Streak,
}

#[derive(Debug, Default, Deserialize)]
pub struct CompleteRequest {
    pub value: Option<i32>,
    pub note: Option<String>,
}

/// What a completion request ended up doing
#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CompleteResponse {
    Completed(CompletionOutcome),
    /// A value of 0 clears the day instead
    Removed(UndoOutcome),
}

#[derive(Debug, Default, Deserialize)]
pub struct SkipRequest {
    pub reason: Option<String>,
}

async fn active_habit(state: &AppState, id: Uuid) -> ApiResult<Habit> {
    db::habits::get(&state.pool, id)
        .await
        .db_err()?
        .filter(|h| !h.archived)
        .not_found(format!("Habit {} not found", id))
}

fn validate_fields(name: &str, daily_target: i32, frequency: &Frequency) -> ApiResult<()> {
    if name.trim().is_empty() {
        return Err(ApiError::BadRequest("Habit name is required".to_string()));
    }
    if daily_target < 1 {
        return Err(ApiError::BadRequest(
            "daily_target must be at least 1".to_string(),
        ));
    }
    frequency.validate()?;
    Ok(())
}

/// Value to record for a completion request; `None` means clear the day
fn requested_value(value: Option<i32>) -> ApiResult<Option<i32>> {
    match value {
        None => Ok(Some(1)),
        Some(v) if v < 0 => Err(ApiError::BadRequest(
            "value must not be negative".to_string(),
        )),
        Some(0) => Ok(None),
        Some(v) => Ok(Some(v)),
    }
}

/// List active habits
pub async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<HabitWithStreak>>> {
    let habits = db::habits::list_active(&state.pool).await.db_err()?;

    let mut result = Vec::with_capacity(habits.len());
    for habit in habits {
        let streak = state.event_handler.get_display_streak(habit.id).await?;
        result.push(HabitWithStreak { habit, streak });
    }

    Ok(Json(result))
}

/// Create a habit
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(new_habit): Json<NewHabit>,
) -> ApiResult<(StatusCode, Json<Habit>)> {
    validate_fields(&new_habit.name, new_habit.daily_target, &new_habit.frequency)?;

    let habit = db::habits::create(&state.pool, &new_habit, today())
        .await
        .db_err()?;
    info!("Created habit {} ({})", habit.name, habit.id);

    Ok((StatusCode::CREATED, Json(habit)))
}

/// Edit a habit. Schedule or target changes rebuild its streak record.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(changes): Json<HabitChanges>,
) -> ApiResult<Json<HabitWithStreak>> {
    let mut habit = active_habit(&state, id).await?;
    let reschedule = changes.apply(&mut habit);
    validate_fields(&habit.name, habit.daily_target, &habit.frequency)?;

    if !db::habits::update(&state.pool, &habit).await.db_err()? {
        return Err(ApiError::NotFound(format!("Habit {} not found", id)));
    }
    info!("Updated habit {} ({})", habit.name, id);

    let streak = if reschedule {
        state.event_handler.on_habit_updated(id, today()).await?
    } else {
        state.event_handler.get_display_streak(id).await?
    };

    Ok(Json(HabitWithStreak { habit, streak }))
}

/// Archive a habit
pub async fn archive(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let archived = db::habits::archive(&state.pool, id).await.db_err()?;
    if !archived {
        return Err(ApiError::NotFound(format!("Habit {} not found", id)));
    }

    info!("Archived habit {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Delete a habit and its history. XP and badges already earned stay.
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    let deleted = db::habits::delete(&state.pool, id).await.db_err()?;
    if !deleted {
        return Err(ApiError::NotFound(format!("Habit {} not found", id)));
    }

    info!("Deleted habit {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// Record today's completion and run the gamification pipeline
pub async fn complete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    body: Option<Json<CompleteRequest>>,
) -> ApiResult<Json<CompleteResponse>> {
    active_habit(&state, id).await?;

    let request = body.map(|Json(b)| b).unwrap_or_default();
    let day = today();
    let Some(value) = requested_value(request.value)? else {
        let outcome = remove_and_undo(&state, id).await?;
        return Ok(Json(CompleteResponse::Removed(outcome)));
    };

    db::completions::record(&state.pool, id, day, value, request.note.as_deref())
        .await
        .db_err()?;

    let outcome = state.event_handler.on_habit_completed_on(id, day).await?;
    Ok(Json(CompleteResponse::Completed(outcome)))
}

/// Remove today's completion and take back what it awarded
pub async fn undo(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UndoOutcome>> {
    active_habit(&state, id).await?;
    Ok(Json(remove_and_undo(&state, id).await?))
}

async fn remove_and_undo(state: &AppState, id: Uuid) -> ApiResult<UndoOutcome> {
    let day = today();
    db::completions::remove(&state.pool, id, day)
        .await
        .db_err()?;

    Ok(state
        .event_handler
        .on_habit_completion_undone_on(id, day)
        .await?)
}

/// Rest days of a habit, oldest first
pub async fn rest_days(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<RestDay>>> {
    active_habit(&state, id).await?;

    let days = db::rest_days::list_for_habit(&state.pool, id)
        .await
        .db_err()?;
    Ok(Json(days))
}

/// Mark a rest day
pub async fn skip(
    State(state): State<Arc<AppState>>,
    Path((id, date)): Path<(Uuid, String)>,
    body: Option<Json<SkipRequest>>,
) -> ApiResult<StatusCode> {
    let date = parse_date(&date)?;
    active_habit(&state, id).await?;

    let reason = body.and_then(|Json(b)| b.reason);
    db::rest_days::skip(&state.pool, id, date, reason.as_deref())
        .await
        .db_err()?;
    Ok(StatusCode::NO_CONTENT)
}

/// Unmark a rest day
pub async fn unskip(
    State(state): State<Arc<AppState>>,
    Path((id, date)): Path<(Uuid, String)>,
) -> ApiResult<StatusCode> {
    let date = parse_date(&date)?;

    let removed = db::rest_days::unskip(&state.pool, id, date)
        .await
        .db_err()?;
    if !removed {
        return Err(ApiError::NotFound(format!(
            "No rest day on {} for habit {}",
            date, id
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Stored streak for a habit
pub async fn streak(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Streak>> {
    db::habits::get(&state.pool, id)
        .await
        .db_err()?
        .not_found(format!("Habit {} not found", id))?;

    let streak = state.event_handler.get_display_streak(id).await?;
    Ok(Json(streak))
}
