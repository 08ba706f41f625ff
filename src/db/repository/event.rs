use sqlx::SqliteExecutor;

use crate::db::models::{Event, EventFields};
use crate::db::map_write_error;
use crate::error::{AppError, AppResult};
use crate::scheduling::BookedEvent;

// ============================================================================
// Event Repository
// ============================================================================

pub struct EventRepository;

impl EventRepository {
    pub async fn create<'e, E>(
        exec: E,
        id: &str,
        owner_id: &str,
        fields: &EventFields,
        created_at: i64,
    ) -> AppResult<Event>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (
                id, owner_id, title, description, event_type,
                starts_at, ends_at, venue_id, status, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.event_type)
        .bind(fields.window.start_ms())
        .bind(fields.window.end_ms())
        .bind(&fields.venue_id)
        .bind(fields.status)
        .bind(created_at)
        .fetch_one(exec)
        .await
        .map_err(|e| map_write_error(e, "event"))
    }

    /// Find an event only if it belongs to `owner_id`.
    pub async fn find_for_owner<'e, E>(
        exec: E,
        id: &str,
        owner_id: &str,
    ) -> AppResult<Option<Event>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .fetch_optional(exec)
            .await
            .map_err(AppError::Database)
    }

    /// All events of an owner, latest start first.
    pub async fn list_for_owner<'e, E>(exec: E, owner_id: &str) -> AppResult<Vec<Event>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Event>(
            "SELECT * FROM events WHERE owner_id = ? ORDER BY starts_at DESC",
        )
        .bind(owner_id)
        .fetch_all(exec)
        .await
        .map_err(AppError::Database)
    }

    /// Replace an owned event's fields. Returns `None` when no owned row matched.
    pub async fn update<'e, E>(
        exec: E,
        id: &str,
        owner_id: &str,
        fields: &EventFields,
    ) -> AppResult<Option<Event>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Event>(
            r#"
            UPDATE events
            SET title = ?, description = ?, event_type = ?,
                starts_at = ?, ends_at = ?, venue_id = ?, status = ?
            WHERE id = ? AND owner_id = ?
            RETURNING *
            "#,
        )
        .bind(&fields.title)
        .bind(&fields.description)
        .bind(&fields.event_type)
        .bind(fields.window.start_ms())
        .bind(fields.window.end_ms())
        .bind(&fields.venue_id)
        .bind(fields.status)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(exec)
        .await
        .map_err(|e| map_write_error(e, "event"))
    }

    /// Delete an owned event; guests, tasks and assignments cascade.
    pub async fn delete<'e, E>(exec: E, id: &str, owner_id: &str) -> AppResult<bool>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM events WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(exec)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }

    /// Every event holding `venue_id`, across all owners, in storage order.
    pub async fn venue_bookings<'e, E>(
        exec: E,
        venue_id: &str,
        exclude_event_id: Option<&str>,
    ) -> AppResult<Vec<BookedEvent>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, BookedEvent>(
            r#"
            SELECT id, title, starts_at, ends_at
            FROM events
            WHERE venue_id = ?
              AND (? IS NULL OR id <> ?)
            ORDER BY rowid
            "#,
        )
        .bind(venue_id)
        .bind(exclude_event_id)
        .bind(exclude_event_id)
        .fetch_all(exec)
        .await
        .map_err(AppError::Database)
    }
}
