//! API service routes

use axum::{
    Json, Router, middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use crate::{middleware::auth_middleware, state::AppState};

mod focus;
mod notifications;
mod shop;
mod tasks;
mod trades;
mod users;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    let protected_routes = Router::new()
        .route("/api/focus/start", post(focus::start))
        .route("/api/focus/end", post(focus::end))
        .route("/api/focus/rate", get(focus::current_rate))
        .route("/api/shop/purchase", post(shop::purchase))
        .route("/api/trades", get(trades::list))
        .route("/api/trades/:id/respond", post(trades::respond))
        .route("/api/tasks", get(tasks::list).post(tasks::create))
        .route("/api/tasks/:id/complete", post(tasks::complete))
        .route("/api/notifications", get(notifications::list))
        .route("/api/notifications/read", post(notifications::mark_read))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/api/focus/social-rate", get(focus::social_rate))
        .route("/api/focus/active", get(focus::active))
        .route("/api/shop/items", get(shop::items))
        .route("/api/shop/purchases", get(shop::recent_purchases))
        .route("/api/leaderboard", get(users::leaderboard))
        .route("/api/users", get(users::list))
        .route("/api/users/:id", get(users::profile))
        .merge(protected_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "api-service"
    }))
}
