use sqlx::PgPool;
use uuid::Uuid;

use crate::tasks::repo_types::Task;

pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<Task>> {
    let rows = sqlx::query_as::<_, Task>(
        r#"
        SELECT id, user_id, text, created_at
        FROM tasks
        WHERE user_id = $1
        ORDER BY created_at ASC
        LIMIT $2 OFFSET $3
        "#,
    )
    .bind(user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn create(db: &PgPool, user_id: Uuid, text: &str) -> anyhow::Result<Task> {
    let task = sqlx::query_as::<_, Task>(
        r#"
        INSERT INTO tasks (user_id, text)
        VALUES ($1, $2)
        RETURNING id, user_id, text, created_at
        "#,
    )
    .bind(user_id)
    .bind(text)
    .fetch_one(db)
    .await?;
    Ok(task)
}

/// Delete a task if it belongs to `user_id`. Returns whether a row was removed.
pub async fn delete(db: &PgPool, user_id: Uuid, task_id: Uuid) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM tasks
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(task_id)
    .bind(user_id)
    .execute(db)
    .await?;
    Ok(result.rows_affected() > 0)
}
