//! Task endpoints

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;
use economy::{Task, TaskCompletion};
use uuid::Uuid;

use crate::{error::ApiResult, middleware::AuthUser, models::NewTaskRequest, state::AppState};

pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<Json<Vec<Task>>> {
    Ok(Json(state.game.tasks_for(user.id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<NewTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = state.game.create_task(user.id, &payload, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn complete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<TaskCompletion>> {
    Ok(Json(state.game.complete_task(user.id, id, Utc::now()).await?))
}
