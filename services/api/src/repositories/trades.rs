//! Trade request rows

use chrono::{DateTime, Utc};
use economy::TradeRequest;
use sqlx::{PgConnection, Row, postgres::PgRow};
use uuid::Uuid;

use super::parse_column;

const COLUMNS: &str =
    "id, purchase_id, proposer_id, target_id, status, created_at, expires_at, resolved_at";

fn from_row(row: &PgRow) -> Result<TradeRequest, sqlx::Error> {
    Ok(TradeRequest {
        id: row.get("id"),
        purchase_id: row.get("purchase_id"),
        proposer_id: row.get("proposer_id"),
        target_id: row.get("target_id"),
        status: parse_column(row.get("status"), "status")?,
        created_at: row.get("created_at"),
        expires_at: row.get("expires_at"),
        resolved_at: row.get("resolved_at"),
    })
}

pub struct TradeRepo;

impl TradeRepo {
    pub async fn insert(conn: &mut PgConnection, trade: &TradeRequest) -> Result<(), sqlx::Error> {
        sqlx::query(&format!(
            "INSERT INTO trade_requests ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            COLUMNS
        ))
        .bind(trade.id)
        .bind(trade.purchase_id)
        .bind(trade.proposer_id)
        .bind(trade.target_id)
        .bind(trade.status.as_str())
        .bind(trade.created_at)
        .bind(trade.expires_at)
        .bind(trade.resolved_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<TradeRequest>, sqlx::Error> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM trade_requests WHERE id = $1 FOR UPDATE",
            COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

        row.as_ref().map(from_row).transpose()
    }

    /// Requests sent or received by `user_id`, newest first
    pub async fn list_for_user(
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<Vec<TradeRequest>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM trade_requests WHERE proposer_id = $1 OR target_id = $1 \
             ORDER BY created_at DESC",
            COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;

        rows.iter().map(from_row).collect()
    }

    /// Persist the status and resolution time
    pub async fn save(conn: &mut PgConnection, trade: &TradeRequest) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE trade_requests SET status = $2, resolved_at = $3 WHERE id = $1")
            .bind(trade.id)
            .bind(trade.status.as_str())
            .bind(trade.resolved_at)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Lock pending requests past their deadline
    ///
    /// Rows already locked by a responder are skipped; the responder
    /// expires them itself.
    pub async fn stale_for_update(
        conn: &mut PgConnection,
        now: DateTime<Utc>,
    ) -> Result<Vec<TradeRequest>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM trade_requests WHERE status = 'pending' AND expires_at <= $1 \
             FOR UPDATE SKIP LOCKED",
            COLUMNS
        ))
        .bind(now)
        .fetch_all(&mut *conn)
        .await?;

        rows.iter().map(from_row).collect()
    }

    /// Lock the stale pending requests `user_id` sent or received
    pub async fn stale_for_user_for_update(
        conn: &mut PgConnection,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<TradeRequest>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM trade_requests \
             WHERE (proposer_id = $1 OR target_id = $1) AND status = 'pending' AND expires_at <= $2 \
             ORDER BY id FOR UPDATE SKIP LOCKED",
            COLUMNS
        ))
        .bind(user_id)
        .bind(now)
        .fetch_all(&mut *conn)
        .await?;

        rows.iter().map(from_row).collect()
    }
}
