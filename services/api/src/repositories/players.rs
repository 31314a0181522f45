//! Player rows: the game columns of `users`

use economy::Player;
use sqlx::{PgConnection, Row, postgres::PgRow};
use uuid::Uuid;

const COLUMNS: &str = "id, username, credits, total_focus_time, level, \
    credit_rate_multiplier, completed_tasks, is_focusing, current_session_start";

fn from_row(row: &PgRow) -> Player {
    Player {
        id: row.get("id"),
        username: row.get("username"),
        credits: row.get("credits"),
        total_focus_time: row.get("total_focus_time"),
        level: row.get("level"),
        credit_rate_multiplier: row.get("credit_rate_multiplier"),
        completed_tasks: row.get("completed_tasks"),
        is_focusing: row.get("is_focusing"),
        current_session_start: row.get("current_session_start"),
    }
}

pub struct PlayerRepo;

impl PlayerRepo {
    pub async fn find(conn: &mut PgConnection, id: Uuid) -> Result<Option<Player>, sqlx::Error> {
        let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = $1", COLUMNS))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(row.as_ref().map(from_row))
    }

    /// Load a player and hold its row lock until the transaction ends
    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Player>, sqlx::Error> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE id = $1 FOR UPDATE",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(row.as_ref().map(from_row))
    }

    /// Lock several players at once, always in ascending id order
    ///
    /// Missing ids are simply absent from the result.
    pub async fn lock_many(
        conn: &mut PgConnection,
        ids: &[Uuid],
    ) -> Result<Vec<Player>, sqlx::Error> {
        let mut ids = ids.to_vec();
        ids.sort();
        ids.dedup();

        let rows = sqlx::query(&format!(
            "SELECT {} FROM users WHERE id = ANY($1) ORDER BY id FOR UPDATE",
            COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.iter().map(from_row).collect())
    }

    /// Write back every game column of `player`
    pub async fn save(conn: &mut PgConnection, player: &Player) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET credits = $2,
                total_focus_time = $3,
                level = $4,
                credit_rate_multiplier = $5,
                completed_tasks = $6,
                is_focusing = $7,
                current_session_start = $8,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(player.id)
        .bind(player.credits)
        .bind(player.total_focus_time)
        .bind(player.level)
        .bind(player.credit_rate_multiplier)
        .bind(player.completed_tasks)
        .bind(player.is_focusing)
        .bind(player.current_session_start)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Number of users focusing right now
    pub async fn count_focusing(conn: &mut PgConnection) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM users WHERE is_focusing")
            .fetch_one(&mut *conn)
            .await?;

        Ok(row.get("count"))
    }

    pub async fn list_focusing(conn: &mut PgConnection) -> Result<Vec<Player>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users WHERE is_focusing ORDER BY current_session_start NULLS LAST, username",
            COLUMNS
        ))
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.iter().map(from_row).collect())
    }

    pub async fn list_all(conn: &mut PgConnection) -> Result<Vec<Player>, sqlx::Error> {
        let rows = sqlx::query(&format!("SELECT {} FROM users ORDER BY username", COLUMNS))
            .fetch_all(&mut *conn)
            .await?;

        Ok(rows.iter().map(from_row).collect())
    }

    /// Candidates for the leaderboard, richest first
    ///
    /// Final ordering and rank numbers are left to `economy::leaderboard`.
    pub async fn top_by_credits(
        conn: &mut PgConnection,
        limit: usize,
    ) -> Result<Vec<Player>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users ORDER BY credits DESC, level DESC, username ASC LIMIT $1",
            COLUMNS
        ))
        .bind(limit as i64)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows.iter().map(from_row).collect())
    }
}
