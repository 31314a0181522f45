//! Leaderboard and player listings against a real database

mod support;

use axum::http::StatusCode;
use sqlx::PgPool;
use support::{body_json, build_test_app, create_player, get};

#[sqlx::test(migrations = "../../libs/common/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_ranks_by_credits_with_shared_ranks(pool: PgPool) {
    create_player(&pool, "cy", 50.0).await;
    create_player(&pool, "bob", 90.0).await;
    create_player(&pool, "ada", 90.0).await;
    create_player(&pool, "dee", 10.0).await;

    let response = get(build_test_app(pool), "/api/leaderboard?limit=3").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["username"], "ada");
    assert_eq!(rows[0]["rank"], 1);
    assert_eq!(rows[1]["username"], "bob");
    assert_eq!(rows[1]["rank"], 1);
    assert_eq!(rows[2]["username"], "cy");
    assert_eq!(rows[2]["rank"], 3);
}

#[sqlx::test(migrations = "../../libs/common/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_users_listing_and_unknown_profile(pool: PgPool) {
    create_player(&pool, "ada", 0.0).await;

    let users = body_json(get(build_test_app(pool.clone()), "/api/users").await).await;
    assert_eq!(users.as_array().unwrap().len(), 1);
    assert!(users[0].get("password_hash").is_none());

    let response = get(
        build_test_app(pool),
        &format!("/api/users/{}", uuid::Uuid::new_v4()),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], "USER_NOT_FOUND");
}
