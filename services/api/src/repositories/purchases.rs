//! Purchase log

use economy::PurchaseRecord;
use sqlx::{PgConnection, Row};

use crate::models::PurchaseFeedItem;

pub struct PurchaseRepo;

impl PurchaseRepo {
    pub async fn insert(
        conn: &mut PgConnection,
        record: &PurchaseRecord,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO purchases (id, user_id, pass_id, target_user_id, price, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id)
        .bind(record.user_id)
        .bind(&record.pass_id)
        .bind(record.target_user_id)
        .bind(record.price)
        .bind(record.created_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Latest purchases with buyer and target names, newest first
    pub async fn recent(
        conn: &mut PgConnection,
        limit: i64,
    ) -> Result<Vec<PurchaseFeedItem>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT p.id, p.user_id, b.username AS buyer_username, p.pass_id,
                   p.target_user_id, t.username AS target_username, p.price, p.created_at
            FROM purchases p
            JOIN users b ON b.id = p.user_id
            LEFT JOIN users t ON t.id = p.target_user_id
            ORDER BY p.created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&mut *conn)
        .await?;

        Ok(rows
            .iter()
            .map(|row| PurchaseFeedItem {
                id: row.get("id"),
                buyer_id: row.get("user_id"),
                buyer_username: row.get("buyer_username"),
                item_id: row.get("pass_id"),
                target_user_id: row.get("target_user_id"),
                target_username: row.get("target_username"),
                price: row.get("price"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}
