//! Badge routes

use axum::{extract::State, Json};
use processor::achievements::{badge_statuses, BadgeStatus};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{ApiResult, DbResultExt};
use crate::state::AppState;

#[derive(Serialize)]
pub struct BadgeCatalog {
    pub total: usize,
    pub unlocked: usize,
    pub badges: Vec<BadgeStatus>,
}

/// All badges with their unlock state
pub async fn list(State(state): State<Arc<AppState>>) -> ApiResult<Json<BadgeCatalog>> {
    let unlocked: BTreeMap<_, _> = db::badges::list_unlocked(&state.pool)
        .await
        .db_err()?
        .into_iter()
        .map(|b| (b.badge_id, b.unlocked_at))
        .collect();

    let badges = badge_statuses(&unlocked);

    Ok(Json(BadgeCatalog {
        total: badges.len(),
        unlocked: badges.iter().filter(|b| b.unlocked_at.is_some()).count(),
        badges,
    }))
}
