//! Notification endpoints

use axum::{Extension, Json, extract::State};

use crate::{
    error::{ApiError, ApiResult},
    middleware::AuthUser,
    models::{MarkReadRequest, MarkedRead, NotificationList},
    state::AppState,
};

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<NotificationList>> {
    Ok(Json(state.game.notifications_for(user.id).await?))
}

/// Mark the given notifications, or all of them, as read
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: Option<Json<MarkReadRequest>>,
) -> ApiResult<Json<MarkedRead>> {
    let payload = payload.map(|Json(payload)| payload).unwrap_or_default();

    if payload.ids.as_ref().is_some_and(|ids| ids.is_empty()) {
        return Err(ApiError::BadRequest(
            "ids must not be empty; omit it to mark everything read".to_string(),
        ));
    }

    let updated = state
        .game
        .mark_notifications_read(user.id, payload.ids.as_deref())
        .await?;
    Ok(Json(MarkedRead { updated }))
}
