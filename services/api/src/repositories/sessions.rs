//! Focus session history rows

use chrono::{DateTime, Utc};
use economy::Settlement;
use sqlx::PgConnection;
use uuid::Uuid;

pub struct FocusSessionRepo;

impl FocusSessionRepo {
    /// Record the start of a session
    pub async fn open(
        conn: &mut PgConnection,
        user_id: Uuid,
        start_time: DateTime<Utc>,
    ) -> Result<Uuid, sqlx::Error> {
        let id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO focus_sessions (id, user_id, start_time, is_active) VALUES ($1, $2, $3, TRUE)",
        )
        .bind(id)
        .bind(user_id)
        .bind(start_time)
        .execute(&mut *conn)
        .await?;

        Ok(id)
    }

    /// Fill in the active row of `user_id` from a settlement
    ///
    /// Returns whether a row was found.
    pub async fn close(
        conn: &mut PgConnection,
        user_id: Uuid,
        settlement: &Settlement,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE focus_sessions
            SET end_time = $2,
                duration_minutes = $3,
                credits_earned = $4,
                effective_rate = $5,
                is_active = FALSE
            WHERE user_id = $1 AND is_active
            "#,
        )
        .bind(user_id)
        .bind(settlement.ended_at)
        .bind(settlement.duration_minutes)
        .bind(settlement.credits_earned)
        .bind(settlement.effective_rate)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Close a leftover active row of `user_id` with no payout
    pub async fn close_dangling(
        conn: &mut PgConnection,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE focus_sessions
            SET end_time = $2, duration_minutes = 0, credits_earned = 0, is_active = FALSE
            WHERE user_id = $1 AND is_active
            "#,
        )
        .bind(user_id)
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }

    /// Close active rows whose user is no longer focusing
    pub async fn close_orphans(
        conn: &mut PgConnection,
        now: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE focus_sessions s
            SET end_time = $1, duration_minutes = 0, credits_earned = 0, is_active = FALSE
            FROM users u
            WHERE s.user_id = u.id AND s.is_active AND NOT u.is_focusing
            "#,
        )
        .bind(now)
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected())
    }
}
