//! Focus session endpoints

use axum::{Extension, Json, extract::State};
use chrono::Utc;
use economy::{Player, Settlement, SocialRate};

use crate::{
    error::ApiResult,
    middleware::AuthUser,
    models::{CurrentRate, FocusStarted},
    state::AppState,
};

pub async fn social_rate(State(state): State<AppState>) -> ApiResult<Json<SocialRate>> {
    Ok(Json(state.game.social_rate().await?))
}

/// Players focusing right now
pub async fn active(State(state): State<AppState>) -> ApiResult<Json<Vec<Player>>> {
    Ok(Json(state.game.focusing_players().await?))
}

pub async fn start(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<FocusStarted>> {
    Ok(Json(state.game.start_focus(user.id, Utc::now()).await?))
}

pub async fn end(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Settlement>> {
    Ok(Json(state.game.end_focus(user.id, Utc::now()).await?))
}

pub async fn current_rate(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<CurrentRate>> {
    Ok(Json(state.game.current_rate(user.id, Utc::now()).await?))
}
