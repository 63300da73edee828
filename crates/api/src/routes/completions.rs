//! Completion history routes

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use common::models::Completion;
use processor::dates::parse_date;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult, DbResultExt};
use crate::state::AppState;

/// Longest range the per-day counts cover in one request
const MAX_COUNT_RANGE_DAYS: i64 = 366;

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NoteRequest {
    pub note: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct DayCount {
    pub date: NaiveDate,
    pub count: i64,
}

fn parse_bound(value: Option<&str>) -> ApiResult<Option<NaiveDate>> {
    Ok(value.map(parse_date).transpose()?)
}

/// Both bounds of a per-day count request, in order and not too far apart
fn count_range(query: &RangeQuery) -> ApiResult<(NaiveDate, NaiveDate)> {
    let (Some(start), Some(end)) = (
        parse_bound(query.start.as_deref())?,
        parse_bound(query.end.as_deref())?,
    ) else {
        return Err(ApiError::BadRequest(
            "start and end are required".to_string(),
        ));
    };

    let span = (end - start).num_days();
    if span < 0 {
        return Err(ApiError::BadRequest("start is after end".to_string()));
    }
    if span >= MAX_COUNT_RANGE_DAYS {
        return Err(ApiError::BadRequest(format!(
            "range spans more than {} days",
            MAX_COUNT_RANGE_DAYS
        )));
    }

    Ok((start, end))
}

/// A habit's completions, newest first, optionally bounded by `start`/`end`
pub async fn history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<Vec<Completion>>> {
    let start = parse_bound(query.start.as_deref())?;
    let end = parse_bound(query.end.as_deref())?;

    let completions = db::completions::list_in_range(&state.pool, id, start, end)
        .await
        .db_err()?;
    Ok(Json(completions))
}

/// Completions per day across all habits
pub async fn counts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RangeQuery>,
) -> ApiResult<Json<Vec<DayCount>>> {
    let (start, end) = count_range(&query)?;

    let counts = db::completions::count_by_date(&state.pool, start, end)
        .await
        .db_err()?
        .into_iter()
        .map(|(date, count)| DayCount { date, count })
        .collect();
    Ok(Json(counts))
}

/// Replace or clear the note on a day's completion
pub async fn note(
    State(state): State<Arc<AppState>>,
    Path((id, date)): Path<(Uuid, String)>,
    Json(request): Json<NoteRequest>,
) -> ApiResult<StatusCode> {
    let date = parse_date(&date)?;

    let updated = db::completions::update_note(&state.pool, id, date, request.note.as_deref())
        .await
        .db_err()?;
    if !updated {
        return Err(ApiError::NotFound(format!(
            "No completion on {} for habit {}",
            date, id
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: Option<&str>, end: Option<&str>) -> RangeQuery {
        RangeQuery {
            start: start.map(str::to_string),
            end: end.map(str::to_string),
        }
    }

    #[test]
    fn test_count_range_accepts_ordered_bounds() {
        let (start, end) = count_range(&range(Some("2026-03-01"), Some("2026-03-31"))).unwrap();
        assert_eq!(start, parse_date("2026-03-01").unwrap());
        assert_eq!(end, parse_date("2026-03-31").unwrap());

        assert!(count_range(&range(Some("2026-03-16"), Some("2026-03-16"))).is_ok());
    }

    #[test]
    fn test_count_range_rejects_bad_bounds() {
        for query in [
            range(None, Some("2026-03-31")),
            range(Some("2026-03-31"), Some("2026-03-01")),
            range(Some("2025-01-01"), Some("2026-03-01")),
            range(Some("2026-3-1"), Some("2026-03-31")),
        ] {
            assert!(matches!(count_range(&query), Err(ApiError::BadRequest(_))));
        }
    }

    #[test]
    fn test_note_request_accepts_null() {
        let cleared: NoteRequest = serde_json::from_str(r#"{"note":null}"#).unwrap();
        assert_eq!(cleared.note, None);

        let set: NoteRequest = serde_json::from_str(r#"{"note":"easy run"}"#).unwrap();
        assert_eq!(set.note.as_deref(), Some("easy run"));
    }
}
