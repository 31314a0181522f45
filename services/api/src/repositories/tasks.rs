//! Task rows

use economy::Task;
use sqlx::{PgConnection, Row, postgres::PgRow};
use uuid::Uuid;

use super::parse_column;

const COLUMNS: &str =
    "id, user_id, title, description, kind, reward, is_completed, created_at, completed_at";

fn from_row(row: &PgRow) -> Result<Task, sqlx::Error> {
    Ok(Task {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        description: row.get("description"),
        kind: parse_column(row.get("kind"), "kind")?,
        reward: row.get("reward"),
        is_completed: row.get("is_completed"),
        created_at: row.get("created_at"),
        completed_at: row.get("completed_at"),
    })
}

pub struct TaskRepo;

impl TaskRepo {
    pub async fn insert(conn: &mut PgConnection, task: &Task) -> Result<(), sqlx::Error> {
        sqlx::query(&format!(
            "INSERT INTO tasks ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            COLUMNS
        ))
        .bind(task.id)
        .bind(task.user_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.kind.as_str())
        .bind(task.reward)
        .bind(task.is_completed)
        .bind(task.created_at)
        .bind(task.completed_at)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    pub async fn find_for_update(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> Result<Option<Task>, sqlx::Error> {
        let row = sqlx::query(&format!("SELECT {} FROM tasks WHERE id = $1 FOR UPDATE", COLUMNS))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        row.as_ref().map(from_row).transpose()
    }

    /// Open tasks only, newest first
    pub async fn list_open_for_user(
        conn: &mut PgConnection,
        user_id: Uuid,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM tasks WHERE user_id = $1 AND NOT is_completed ORDER BY created_at DESC",
            COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&mut *conn)
        .await?;

        rows.iter().map(from_row).collect()
    }

    pub async fn save(conn: &mut PgConnection, task: &Task) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE tasks SET is_completed = $2, completed_at = $3 WHERE id = $1")
            .bind(task.id)
            .bind(task.is_completed)
            .bind(task.completed_at)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}
