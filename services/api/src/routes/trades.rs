//! Trade request endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use chrono::Utc;
use economy::TradeRequest;
use uuid::Uuid;

use crate::{
    error::ApiResult, middleware::AuthUser, models::TradeResponseRequest, state::AppState,
};

/// Requests the caller sent or received
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<TradeRequest>>> {
    Ok(Json(state.game.trades_for(user.id, Utc::now()).await?))
}

pub async fn respond(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TradeResponseRequest>,
) -> ApiResult<Json<TradeRequest>> {
    let trade = state
        .game
        .respond_trade(user.id, id, payload.decision, Utc::now())
        .await?;
    Ok(Json(trade))
}
