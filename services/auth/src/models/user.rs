//! User model and related functionality

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Row, postgres::PgRow};
use uuid::Uuid;

/// User entity, including the public game statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub bio: Option<String>,
    pub credits: f64,
    pub total_focus_time: i64,
    pub level: i32,
    pub credit_rate_multiplier: f64,
    pub completed_tasks: i32,
    pub is_focusing: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub(crate) const COLUMNS: &'static str = "id, username, password_hash, bio, credits, \
        total_focus_time, level, credit_rate_multiplier, completed_tasks, is_focusing, \
        created_at, updated_at";

    pub(crate) fn from_row(row: &PgRow) -> Self {
        Self {
            id: row.get("id"),
            username: row.get("username"),
            password_hash: row.get("password_hash"),
            bio: row.get("bio"),
            credits: row.get("credits"),
            total_focus_time: row.get("total_focus_time"),
            level: row.get("level"),
            credit_rate_multiplier: row.get("credit_rate_multiplier"),
            completed_tasks: row.get("completed_tasks"),
            is_focusing: row.get("is_focusing"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }
}

/// Registration payload
#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

/// Profile update payload
///
/// Changing the password requires `current_password`.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub bio: Option<String>,
    pub new_password: Option<String>,
    pub current_password: Option<String>,
}

/// User login credentials
#[derive(Debug, Clone, Deserialize)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}
