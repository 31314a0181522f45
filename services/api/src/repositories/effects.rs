//! Temporary effect rows

use chrono::{DateTime, Utc};
use economy::TemporaryEffect;
use sqlx::{PgConnection, Row, postgres::PgRow};
use uuid::Uuid;

use super::parse_column;

fn from_row(row: &PgRow) -> Result<TemporaryEffect, sqlx::Error> {
    Ok(TemporaryEffect {
        id: row.get("id"),
        user_id: row.get("user_id"),
        kind: parse_column(row.get("kind"), "kind")?,
        magnitude: row.get("magnitude"),
        applied_by: row.get("applied_by"),
        created_at: row.get("created_at"),
        expires_at: row.get("expires_at"),
    })
}

pub struct EffectRepo;

impl EffectRepo {
    pub async fn insert(
        conn: &mut PgConnection,
        effect: &TemporaryEffect,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO temporary_effects (id, user_id, kind, magnitude, applied_by, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(effect.id)
        .bind(effect.user_id)
        .bind(effect.kind.as_str())
        .bind(effect.magnitude)
        .bind(effect.applied_by)
        .bind(effect.created_at)
        .bind(effect.expires_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Effects of `user_ids` still running at `now`
    pub async fn active_for_users(
        conn: &mut PgConnection,
        user_ids: &[Uuid],
        now: DateTime<Utc>,
    ) -> Result<Vec<TemporaryEffect>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, kind, magnitude, applied_by, created_at, expires_at
            FROM temporary_effects
            WHERE user_id = ANY($1) AND expires_at > $2
            ORDER BY expires_at
            "#,
        )
        .bind(user_ids)
        .bind(now)
        .fetch_all(&mut *conn)
        .await?;

        rows.iter().map(from_row).collect()
    }

    /// Physically remove effects that ran out before `now`
    pub async fn delete_expired(
        conn: &mut PgConnection,
        now: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM temporary_effects WHERE expires_at <= $1")
            .bind(now)
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }
}
