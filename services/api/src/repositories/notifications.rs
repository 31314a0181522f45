//! Notification rows

use economy::Notification;
use sqlx::{PgConnection, Row, postgres::PgRow};
use uuid::Uuid;

use super::parse_column;

const COLUMNS: &str = "id, user_id, kind, message, from_user_id, is_read, created_at";

/// Notifications returned per listing
pub const PAGE_SIZE: i64 = 50;

fn from_row(row: &PgRow) -> Result<Notification, sqlx::Error> {
    Ok(Notification {
        id: row.get("id"),
        user_id: row.get("user_id"),
        kind: parse_column(row.get("kind"), "kind")?,
        message: row.get("message"),
        from_user_id: row.get("from_user_id"),
        is_read: row.get("is_read"),
        created_at: row.get("created_at"),
    })
}

pub struct NotificationRepo;

impl NotificationRepo {
    pub async fn insert_many(
        conn: &mut PgConnection,
        notifications: &[Notification],
    ) -> Result<(), sqlx::Error> {
        for notification in notifications {
            sqlx::query(&format!(
                "INSERT INTO notifications ({}) VALUES ($1, $2, $3, $4, $5, $6, $7)",
                COLUMNS
            ))
            .bind(notification.id)
            .bind(notification.user_id)
            .bind(notification.kind.as_str())
            .bind(&notification.message)
            .bind(notification.from_user_id)
            .bind(notification.is_read)
            .bind(notification.created_at)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }

    /// Most recent notifications of `user_id`
    pub async fn list_for_user(
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM notifications WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
            COLUMNS
        ))
        .bind(user_id)
        .bind(PAGE_SIZE)
        .fetch_all(&mut *conn)
        .await?;

        rows.iter().map(from_row).collect()
    }

    /// Mark notifications read; `None` marks all of them
    ///
    /// Ids belonging to other users are ignored.
    pub async fn mark_read(
        conn: &mut PgConnection,
        user_id: Uuid,
        ids: Option<&[Uuid]>,
    ) -> Result<u64, sqlx::Error> {
        let result = match ids {
            Some(ids) => {
                sqlx::query(
                    "UPDATE notifications SET is_read = TRUE \
                     WHERE user_id = $1 AND id = ANY($2) AND NOT is_read",
                )
                .bind(user_id)
                .bind(ids)
                .execute(&mut *conn)
                .await?
            }
            None => {
                sqlx::query(
                    "UPDATE notifications SET is_read = TRUE WHERE user_id = $1 AND NOT is_read",
                )
                .bind(user_id)
                .execute(&mut *conn)
                .await?
            }
        };

        Ok(result.rows_affected())
    }
}
