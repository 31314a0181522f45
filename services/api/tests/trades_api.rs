//! Trade requests against a real database

mod support;

use axum::http::StatusCode;
use serde_json::json;
use sqlx::PgPool;
use support::{body_json, build_test_app, create_player, get_auth, post_json_auth, token_for};
use uuid::Uuid;

async fn multiplier_of(pool: &PgPool, user_id: Uuid) -> f64 {
    sqlx::query_scalar("SELECT credit_rate_multiplier FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

/// Ada (multiplier 2.0) proposes a trade to Bob (1.0); returns the trade id
async fn propose(pool: &PgPool) -> (Uuid, Uuid, Uuid) {
    let ada = create_player(pool, "ada", 50.0).await;
    let bob = create_player(pool, "bob", 0.0).await;
    sqlx::query("UPDATE users SET credit_rate_multiplier = 2.0 WHERE id = $1")
        .bind(ada)
        .execute(pool)
        .await
        .unwrap();

    let response = post_json_auth(
        build_test_app(pool.clone()),
        "/api/shop/purchase",
        &token_for(ada, "ada"),
        json!({ "item_id": "trade_pass", "target_user_id": bob }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["requires_consent"], true);
    let trade_id = body["trade_request_id"].as_str().unwrap().parse().unwrap();
    (ada, bob, trade_id)
}

#[sqlx::test(migrations = "../../libs/common/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_accepting_swaps_multipliers(pool: PgPool) {
    let (ada, bob, trade_id) = propose(&pool).await;

    // Nothing changes until the target answers
    assert_eq!(multiplier_of(&pool, ada).await, 2.0);

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/trades/{}/respond", trade_id),
        &token_for(bob, "bob"),
        json!({ "decision": "accept" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "accepted");

    assert_eq!(multiplier_of(&pool, ada).await, 1.0);
    assert_eq!(multiplier_of(&pool, bob).await, 2.0);

    let notices = body_json(
        get_auth(build_test_app(pool), "/api/notifications", &token_for(ada, "ada")).await,
    )
    .await;
    assert_eq!(notices["notifications"][0]["notification_type"], "trade_accepted");
}

#[sqlx::test(migrations = "../../libs/common/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_rejecting_keeps_multipliers_and_is_final(pool: PgPool) {
    let (ada, bob, trade_id) = propose(&pool).await;
    let uri = format!("/api/trades/{}/respond", trade_id);
    let token = token_for(bob, "bob");

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &uri,
        &token,
        json!({ "decision": "reject" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(multiplier_of(&pool, ada).await, 2.0);

    let again = post_json_auth(
        build_test_app(pool.clone()),
        &uri,
        &token,
        json!({ "decision": "accept" }),
    )
    .await;
    assert_eq!(again.status(), StatusCode::CONFLICT);
    assert_eq!(multiplier_of(&pool, bob).await, 1.0);
}

#[sqlx::test(migrations = "../../libs/common/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_only_the_target_may_answer(pool: PgPool) {
    let (ada, _bob, trade_id) = propose(&pool).await;

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/trades/{}/respond", trade_id),
        &token_for(ada, "ada"),
        json!({ "decision": "accept" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let listed = body_json(
        get_auth(build_test_app(pool), "/api/trades", &token_for(ada, "ada")).await,
    )
    .await;
    assert_eq!(listed[0]["status"], "pending");
}

#[sqlx::test(migrations = "../../libs/common/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_stale_request_expires_when_answered(pool: PgPool) {
    let (ada, bob, trade_id) = propose(&pool).await;
    sqlx::query("UPDATE trade_requests SET expires_at = NOW() - INTERVAL '1 minute' WHERE id = $1")
        .bind(trade_id)
        .execute(&pool)
        .await
        .unwrap();

    let response = post_json_auth(
        build_test_app(pool.clone()),
        &format!("/api/trades/{}/respond", trade_id),
        &token_for(bob, "bob"),
        json!({ "decision": "accept" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "expired");
    assert_eq!(multiplier_of(&pool, ada).await, 2.0);
}

#[sqlx::test(migrations = "../../libs/common/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_listing_expires_requests_past_their_deadline(pool: PgPool) {
    let (ada, bob, trade_id) = propose(&pool).await;
    sqlx::query("UPDATE trade_requests SET expires_at = NOW() - INTERVAL '1 hour' WHERE id = $1")
        .bind(trade_id)
        .execute(&pool)
        .await
        .unwrap();

    let trades = body_json(
        get_auth(build_test_app(pool.clone()), "/api/trades", &token_for(bob, "bob")).await,
    )
    .await;
    assert_eq!(trades.as_array().unwrap().len(), 1);
    assert_eq!(trades[0]["status"], "expired");

    let status: String = sqlx::query_scalar("SELECT status FROM trade_requests WHERE id = $1")
        .bind(trade_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(status, "expired");

    let notices = body_json(
        get_auth(build_test_app(pool.clone()), "/api/notifications", &token_for(ada, "ada")).await,
    )
    .await;
    let expired = notices["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|n| n["notification_type"] == "trade_expired")
        .count();
    assert_eq!(expired, 1);

    // A second read finds nothing left to expire
    get_auth(build_test_app(pool.clone()), "/api/trades", &token_for(ada, "ada")).await;
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM notifications WHERE user_id = $1 AND kind = 'trade_expired'",
    )
    .bind(ada)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1);
    assert_eq!(multiplier_of(&pool, ada).await, 2.0);
}

#[sqlx::test(migrations = "../../libs/common/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_unknown_trade_is_not_found(pool: PgPool) {
    let bob = create_player(&pool, "bob", 0.0).await;

    let response = post_json_auth(
        build_test_app(pool),
        &format!("/api/trades/{}/respond", Uuid::new_v4()),
        &token_for(bob, "bob"),
        json!({ "decision": "reject" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
