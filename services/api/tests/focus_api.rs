//! Focus sessions against a real database
//!
//! Run with `cargo test -- --ignored` and `DATABASE_URL` pointing at a
//! Postgres instance the tests may create databases in.

mod support;

use axum::http::StatusCode;
use sqlx::PgPool;
use support::{
    approx_eq, body_json, build_test_app, create_player, credits_of, focusing_since, get,
    get_auth, post_auth, token_for,
};

#[sqlx::test(migrations = "../../libs/common/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_start_then_end_immediately_earns_nothing(pool: PgPool) {
    let ada = create_player(&pool, "ada", 0.0).await;
    let token = token_for(ada, "ada");

    let response = post_auth(build_test_app(pool.clone()), "/api/focus/start", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["social"]["active_users_count"], 1);

    let response = post_auth(build_test_app(pool.clone()), "/api/focus/end", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["credits_earned"], 0.0);
    assert_eq!(body["duration_minutes"], 0);

    let history: (bool, i64) = sqlx::query_as(
        "SELECT is_active, duration_minutes FROM focus_sessions WHERE user_id = $1",
    )
    .bind(ada)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(history, (false, 0));
}

#[sqlx::test(migrations = "../../libs/common/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_second_start_conflicts(pool: PgPool) {
    let ada = create_player(&pool, "ada", 0.0).await;
    let token = token_for(ada, "ada");

    let first = post_auth(build_test_app(pool.clone()), "/api/focus/start", &token).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = post_auth(build_test_app(pool.clone()), "/api/focus/start", &token).await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(second).await["code"], "SESSION_ALREADY_ACTIVE");
}

#[sqlx::test(migrations = "../../libs/common/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_end_without_session_conflicts(pool: PgPool) {
    let ada = create_player(&pool, "ada", 0.0).await;

    let response = post_auth(build_test_app(pool), "/api/focus/end", &token_for(ada, "ada")).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "NO_ACTIVE_SESSION");
}

#[sqlx::test(migrations = "../../libs/common/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_hour_with_a_companion_pays_double(pool: PgPool) {
    let ada = create_player(&pool, "ada", 0.0).await;
    let bob = create_player(&pool, "bob", 0.0).await;
    focusing_since(&pool, ada, 60).await;
    focusing_since(&pool, bob, 5).await;

    let response = post_auth(build_test_app(pool.clone()), "/api/focus/end", &token_for(ada, "ada")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["duration_minutes"], 60);
    assert_eq!(body["effective_rate"], 2.0);
    assert!(approx_eq(body["credits_earned"].as_f64().unwrap(), 20.0));
    assert!(approx_eq(credits_of(&pool, ada).await, 20.0));

    let social = body_json(get(build_test_app(pool), "/api/focus/social-rate").await).await;
    assert_eq!(social["active_users_count"], 1);
    assert_eq!(social["social_multiplier"], 1.0);
}

#[sqlx::test(migrations = "../../libs/common/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_rate_reports_the_social_multiplier(pool: PgPool) {
    let ada = create_player(&pool, "ada", 0.0).await;
    for (index, name) in ["bob", "cy", "dee"].iter().enumerate() {
        let id = create_player(&pool, name, 0.0).await;
        focusing_since(&pool, id, index as i64).await;
    }

    let response = get_auth(build_test_app(pool.clone()), "/api/focus/rate", &token_for(ada, "ada")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["active_users_count"], 3);
    assert_eq!(body["social_multiplier"], 3.0);
    assert_eq!(body["effective_rate"], 3.0);
    assert_eq!(body["credits_per_hour"], 30.0);
    assert_eq!(body["is_focusing"], false);

    let active = body_json(get(build_test_app(pool), "/api/focus/active").await).await;
    assert_eq!(active.as_array().unwrap().len(), 3);
}

#[sqlx::test(migrations = "../../libs/common/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_stuck_flag_is_recovered_on_start(pool: PgPool) {
    let ada = create_player(&pool, "ada", 0.0).await;
    sqlx::query("UPDATE users SET is_focusing = TRUE WHERE id = $1")
        .bind(ada)
        .execute(&pool)
        .await
        .unwrap();

    let response = post_auth(build_test_app(pool), "/api/focus/start", &token_for(ada, "ada")).await;
    assert_eq!(response.status(), StatusCode::OK);
}
