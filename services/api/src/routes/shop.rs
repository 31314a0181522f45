//! Shop endpoints

use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;
use economy::catalog;
use tracing::info;

use crate::{
    error::ApiResult,
    middleware::AuthUser,
    models::{PurchaseFeedItem, PurchaseReceipt, PurchaseRequest, ShopItems},
    state::AppState,
};

/// Passes that can be bought right now
pub async fn items() -> Json<ShopItems> {
    Json(ShopItems {
        items: catalog::catalog(),
    })
}

pub async fn purchase(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<PurchaseRequest>,
) -> ApiResult<(StatusCode, Json<PurchaseReceipt>)> {
    info!(
        "{} is buying {} (target: {:?})",
        user.username, payload.item_id, payload.target_user_id
    );

    let receipt = state.game.purchase(user.id, &payload, Utc::now()).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// Activity feed of the latest purchases
pub async fn recent_purchases(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PurchaseFeedItem>>> {
    Ok(Json(state.game.recent_purchases().await?))
}
