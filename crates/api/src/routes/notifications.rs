//! Badge unlock notification routes
//!
//! Unlocks stay pending until acknowledged, so a client that was offline
//! when a badge unlocked still gets to show it.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use common::models::BadgeNotification;
use processor::achievements::find_badge;
use std::sync::Arc;
use tracing::warn;

use crate::error::{ApiError, ApiResult, DbResultExt};
use crate::state::AppState;

/// Pending notifications, oldest first
pub async fn pending(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<BadgeNotification>>> {
    let pending = db::badges::list_pending(&state.pool).await.db_err()?;

    let notifications = pending
        .into_iter()
        .filter_map(|unlock| match find_badge(&unlock.badge_id) {
            Some(badge) => Some(BadgeNotification {
                badge_id: unlock.badge_id,
                name: badge.name.to_string(),
                description: badge.description.to_string(),
                icon: badge.icon.to_string(),
                unlocked_at: unlock.unlocked_at,
            }),
            None => {
                warn!("Skipping notification for unknown badge {}", unlock.badge_id);
                None
            }
        })
        .collect();

    Ok(Json(notifications))
}

/// Mark one notification as shown
pub async fn ack(
    State(state): State<Arc<AppState>>,
    Path(badge_id): Path<String>,
) -> ApiResult<StatusCode> {
    let marked = db::badges::mark_notified(&state.pool, &badge_id)
        .await
        .db_err()?;
    if !marked {
        return Err(ApiError::NotFound(format!(
            "No pending notification for badge {}",
            badge_id
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}
