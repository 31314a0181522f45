//! Authentication service routes

use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use common::token::TokenType;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    AppState,
    middleware::auth_middleware,
    models::{LoginCredentials, NewUser, UpdateUser, User},
    repositories::user::{hash_password, is_unique_violation},
    validation::{validate_bio, validate_password, validate_username},
};

/// Tokens issued at registration and login, together with the user
#[derive(Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Request carrying a refresh token
#[derive(Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Response for token refresh
#[derive(Serialize)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/auth/profile", put(update_profile))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh_token))
        .route("/auth/logout", post(logout))
        .merge(protected)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "auth-service"
    }))
}

fn internal(context: &'static str) -> impl FnOnce(anyhow::Error) -> AuthError {
    move |e| {
        error!("{}: {}", context, e);
        AuthError::InternalServerError
    }
}

/// Issue a token pair for `user` and record the refresh token as its session
async fn issue_tokens(state: &AppState, user: User) -> Result<AuthResponse, AuthError> {
    let access_token = state
        .jwt_service
        .generate_access_token(&user)
        .map_err(internal("Failed to generate access token"))?;

    let refresh_token = state
        .jwt_service
        .generate_refresh_token(&user)
        .map_err(internal("Failed to generate refresh token"))?;

    state
        .session_manager
        .store(user.id, &refresh_token)
        .await
        .map_err(internal("Failed to store session in Redis"))?;

    Ok(AuthResponse {
        user,
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: state.jwt_service.access_token_expiry(),
    })
}

/// User registration endpoint
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> Result<impl IntoResponse, AuthError> {
    let username = payload.username.trim();
    validate_username(username).map_err(AuthError::Validation)?;
    validate_password(&payload.password).map_err(AuthError::Validation)?;

    info!("Registration attempt for user: {}", username);

    let user = state
        .user_repository
        .create(username, &payload.password)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::UsernameTaken
            } else {
                error!("Failed to create user: {}", e);
                AuthError::InternalServerError
            }
        })?;

    let response = issue_tokens(&state, user).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginCredentials>,
) -> Result<impl IntoResponse, AuthError> {
    let username = payload.username.trim();
    info!("Login attempt for user: {}", username);

    if !state.rate_limiter.is_allowed(username).await {
        return Err(AuthError::TooManyAttempts);
    }

    let user = state
        .user_repository
        .find_by_username(username)
        .await
        .map_err(internal("Failed to look up user"))?;

    let verified = match &user {
        Some(user) => state
            .user_repository
            .verify_password(user, &payload.password)
            .map_err(internal("Failed to verify password"))?,
        None => false,
    };

    let user = match user {
        Some(user) if verified => user,
        _ => {
            state.rate_limiter.record_failure(username).await;
            warn!("Failed login for user: {}", username);
            return Err(AuthError::InvalidCredentials);
        }
    };

    state.rate_limiter.reset(username).await;

    let response = issue_tokens(&state, user).await?;
    Ok((StatusCode::OK, Json(response)))
}

/// Refresh token endpoint
pub async fn refresh_token(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    info!("Token refresh request");

    let claims = state
        .jwt_service
        .validate_token(&payload.refresh_token, TokenType::Refresh)
        .map_err(|_| AuthError::Unauthorized)?;

    let is_blacklisted = state
        .jwt_service
        .is_token_blacklisted(&state.redis_pool, &payload.refresh_token)
        .await
        .map_err(internal("Failed to check if token is blacklisted"))?;

    let is_current = state
        .session_manager
        .is_current(claims.sub, &payload.refresh_token)
        .await
        .map_err(internal("Failed to read session from Redis"))?;

    if is_blacklisted || !is_current {
        return Err(AuthError::Unauthorized);
    }

    let user = state
        .user_repository
        .find_by_id(claims.sub)
        .await
        .map_err(internal("Failed to look up user"))?
        .ok_or(AuthError::Unauthorized)?;

    let access_token = state
        .jwt_service
        .generate_access_token(&user)
        .map_err(internal("Failed to generate access token"))?;

    let new_refresh_token = state
        .jwt_service
        .rotate_refresh_token(&state.redis_pool, &user, &payload.refresh_token)
        .await
        .map_err(internal("Failed to rotate refresh token"))?;

    state
        .session_manager
        .store(user.id, &new_refresh_token)
        .await
        .map_err(internal("Failed to update session in Redis"))?;

    Ok((
        StatusCode::OK,
        Json(RefreshTokenResponse {
            access_token,
            refresh_token: new_refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: state.jwt_service.access_token_expiry(),
        }),
    ))
}

/// Logout endpoint
pub async fn logout(
    State(state): State<AppState>,
    Json(payload): Json<RefreshTokenRequest>,
) -> Result<impl IntoResponse, AuthError> {
    let claims = state
        .jwt_service
        .validate_token(&payload.refresh_token, TokenType::Refresh)
        .map_err(|_| AuthError::Unauthorized)?;

    info!("Logout request for user: {}", claims.sub);

    let expiry = state
        .jwt_service
        .remaining_lifetime(&claims)
        .map_err(internal("Failed to get current time"))?;

    state
        .jwt_service
        .blacklist_token(&state.redis_pool, &payload.refresh_token, expiry)
        .await
        .map_err(internal("Failed to blacklist token"))?;

    state
        .session_manager
        .delete(claims.sub)
        .await
        .map_err(internal("Failed to remove session from Redis"))?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({"message": "Logged out successfully"})),
    ))
}

/// Profile update endpoint
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user_id): Extension<Uuid>,
    Json(payload): Json<UpdateUser>,
) -> Result<impl IntoResponse, AuthError> {
    let username = payload.username.as_deref().map(str::trim);
    if let Some(username) = username {
        validate_username(username).map_err(AuthError::Validation)?;
    }
    if let Some(bio) = payload.bio.as_deref() {
        validate_bio(bio).map_err(AuthError::Validation)?;
    }
    if let Some(password) = payload.new_password.as_deref() {
        validate_password(password).map_err(AuthError::Validation)?;
    }

    let user = state
        .user_repository
        .find_by_id(user_id)
        .await
        .map_err(internal("Failed to look up user"))?
        .ok_or(AuthError::Unauthorized)?;

    let password_hash = match payload.new_password.as_deref() {
        Some(new_password) => {
            let current = payload
                .current_password
                .as_deref()
                .ok_or_else(|| {
                    AuthError::Validation("Current password is required".to_string())
                })?;
            let verified = state
                .user_repository
                .verify_password(&user, current)
                .map_err(internal("Failed to verify password"))?;
            if !verified {
                return Err(AuthError::InvalidCredentials);
            }
            Some(hash_password(new_password).map_err(internal("Failed to hash password"))?)
        }
        None => None,
    };

    let updated = state
        .user_repository
        .update_profile(
            user_id,
            username,
            payload.bio.as_deref(),
            password_hash.as_deref(),
        )
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AuthError::UsernameTaken
            } else {
                error!("Failed to update profile: {}", e);
                AuthError::InternalServerError
            }
        })?
        .ok_or(AuthError::Unauthorized)?;

    info!("Profile updated for user: {}", user_id);

    Ok((StatusCode::OK, Json(updated)))
}

/// Custom error type for authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),

    #[error("Username already taken")]
    UsernameTaken,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Too many failed login attempts, try again later")]
    TooManyAttempts,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal server error")]
    InternalServerError,
}

impl AuthError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AuthError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AuthError::UsernameTaken => (StatusCode::CONFLICT, "USERNAME_TAKEN"),
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            AuthError::TooManyAttempts => (StatusCode::TOO_MANY_REQUESTS, "TOO_MANY_ATTEMPTS"),
            AuthError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AuthError::InternalServerError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = Json(serde_json::json!({
            "error": self.to_string(),
            "code": code,
        }));

        (status, body).into_response()
    }
}
