use sqlx::SqliteExecutor;

use crate::db::models::{Task, UpcomingTask};
use crate::db::map_write_error;
use crate::error::{AppError, AppResult};

// ============================================================================
// Task Repository
// ============================================================================

pub struct TaskRepository;

impl TaskRepository {
    pub async fn create<'e, E>(exec: E, task: &Task) -> AppResult<Task>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (
                id, event_id, title, description, assigned_to, due_date,
                status, priority, reminder_sent, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&task.id)
        .bind(&task.event_id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.assigned_to)
        .bind(task.due_date.map(|d| d.timestamp_millis()))
        .bind(task.status)
        .bind(task.priority)
        .bind(task.reminder_sent)
        .bind(task.created_at.timestamp_millis())
        .fetch_one(exec)
        .await
        .map_err(|e| map_write_error(e, "task"))
    }

    /// Find a task whose event belongs to `owner_id`.
    pub async fn find_for_owner<'e, E>(
        exec: E,
        id: &str,
        owner_id: &str,
    ) -> AppResult<Option<Task>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT t.* FROM tasks t
            INNER JOIN events e ON e.id = t.event_id
            WHERE t.id = ? AND e.owner_id = ?
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(exec)
        .await
        .map_err(AppError::Database)
    }

    /// Tasks of an event, soonest due first; undated tasks last.
    pub async fn list_for_event<'e, E>(exec: E, event_id: &str) -> AppResult<Vec<Task>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT * FROM tasks
            WHERE event_id = ?
            ORDER BY due_date IS NULL, due_date, created_at
            "#,
        )
        .bind(event_id)
        .fetch_all(exec)
        .await
        .map_err(AppError::Database)
    }

    pub async fn update<'e, E>(exec: E, task: &Task) -> AppResult<Task>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = ?, description = ?, assigned_to = ?, due_date = ?,
                status = ?, priority = ?, reminder_sent = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.assigned_to)
        .bind(task.due_date.map(|d| d.timestamp_millis()))
        .bind(task.status)
        .bind(task.priority)
        .bind(task.reminder_sent)
        .bind(&task.id)
        .fetch_optional(exec)
        .await
        .map_err(|e| map_write_error(e, "task"))?
        .ok_or_else(|| AppError::NotFound("Task not found".to_string()))
    }

    pub async fn delete<'e, E>(exec: E, id: &str) -> AppResult<bool>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(id)
            .execute(exec)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }

    /// Open tasks of the owner's events due at or before `until_ms` whose
    /// reminder has not gone out yet.
    pub async fn upcoming_for_owner<'e, E>(
        exec: E,
        owner_id: &str,
        until_ms: i64,
    ) -> AppResult<Vec<UpcomingTask>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, UpcomingTask>(
            r#"
            SELECT t.*, e.title AS event_title, e.starts_at AS event_start_date
            FROM tasks t
            INNER JOIN events e ON e.id = t.event_id
            WHERE e.owner_id = ?
              AND t.status <> 'completed'
              AND t.due_date IS NOT NULL
              AND t.due_date <= ?
              AND t.reminder_sent = 0
            ORDER BY t.due_date
            "#,
        )
        .bind(owner_id)
        .bind(until_ms)
        .fetch_all(exec)
        .await
        .map_err(AppError::Database)
    }
}
