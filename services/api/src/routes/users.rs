//! Player listings and the leaderboard

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use economy::{Player, leaderboard::Standing};
use uuid::Uuid;

use crate::{
    error::ApiResult,
    models::{LeaderboardQuery, PlayerProfile},
    state::AppState,
};

pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Vec<Player>>> {
    Ok(Json(state.game.players().await?))
}

/// One player with the effects currently running on them
pub async fn profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<PlayerProfile>> {
    Ok(Json(state.game.profile(id, Utc::now()).await?))
}

pub async fn leaderboard(
    State(state): State<AppState>,
    Query(query): Query<LeaderboardQuery>,
) -> ApiResult<Json<Vec<Standing>>> {
    Ok(Json(state.game.leaderboard(query.limit).await?))
}
