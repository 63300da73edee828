//! Streak recalculation routes

use axum::{extract::State, Json};
use processor::dates::today;
use processor::RecalculationStats;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Serialize)]
pub struct RecalcResponse {
    pub status: String,
    #[serde(flatten)]
    pub stats: RecalculationStats,
}

pub async fn trigger(State(state): State<Arc<AppState>>) -> ApiResult<Json<RecalcResponse>> {
    info!("Recalculation triggered via API");

    let stats = state.event_handler.recalculate_streaks(today()).await?;

    Ok(Json(RecalcResponse {
        status: "complete".to_string(),
        stats,
    }))
}
