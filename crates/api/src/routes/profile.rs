//! Profile routes

use axum::{extract::State, Json};
use chrono::NaiveDate;
use processor::dates::{today, week_start};
use processor::scores::{xp_progress, XpProgress};
use processor::ProgressStore;
use serde::Serialize;
use std::sync::Arc;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Serialize)]
pub struct ProfileResponse {
    pub total_xp: i64,
    pub level: u32,
    pub xp_progress: XpProgress,
    /// Completions in the current week
    pub weekly_completions: u32,
    pub week_of: NaiveDate,
    pub total_completions: u32,
    pub longest_streak_ever: u32,
}

pub async fn get(State(state): State<Arc<AppState>>) -> ApiResult<Json<ProfileResponse>> {
    let profile = state.event_handler.store().read_user_profile().await?;

    let current_week = week_start(today(), state.config.engine.week_starts_on);
    let weekly_completions = if profile.week_of == Some(current_week) {
        profile.weekly_completions
    } else {
        0
    };
    let progress = xp_progress(profile.total_xp);

    Ok(Json(ProfileResponse {
        total_xp: profile.total_xp,
        level: progress.level,
        xp_progress: progress,
        weekly_completions,
        week_of: current_week,
        total_completions: profile.total_completions,
        longest_streak_ever: profile.longest_streak_ever,
    }))
}
