use sqlx::SqliteExecutor;

use crate::db::models::{Assignment, AssignmentStatus};
use crate::db::map_write_error;
use crate::error::{AppError, AppResult};
use crate::scheduling::BookedEvent;

// ============================================================================
// Assignment Repository (event_vendors)
// ============================================================================

pub struct AssignmentRepository;

impl AssignmentRepository {
    pub async fn create<'e, E>(
        exec: E,
        id: &str,
        event_id: &str,
        vendor_id: &str,
        status: AssignmentStatus,
        created_at: i64,
    ) -> AppResult<Assignment>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Assignment>(
            r#"
            INSERT INTO event_vendors (id, event_id, vendor_id, status, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(event_id)
        .bind(vendor_id)
        .bind(status)
        .bind(created_at)
        .fetch_one(exec)
        .await
        .map_err(|e| map_write_error(e, "assignment"))
    }

    pub async fn find_by_event_and_vendor<'e, E>(
        exec: E,
        event_id: &str,
        vendor_id: &str,
    ) -> AppResult<Option<Assignment>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Assignment>(
            "SELECT * FROM event_vendors WHERE event_id = ? AND vendor_id = ?",
        )
        .bind(event_id)
        .bind(vendor_id)
        .fetch_optional(exec)
        .await
        .map_err(AppError::Database)
    }

    /// Find an assignment whose event belongs to `owner_id`.
    pub async fn find_for_owner<'e, E>(
        exec: E,
        id: &str,
        owner_id: &str,
    ) -> AppResult<Option<Assignment>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Assignment>(
            r#"
            SELECT ev.* FROM event_vendors ev
            INNER JOIN events e ON e.id = ev.event_id
            WHERE ev.id = ? AND e.owner_id = ?
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(exec)
        .await
        .map_err(AppError::Database)
    }

    pub async fn update_status<'e, E>(
        exec: E,
        id: &str,
        status: AssignmentStatus,
    ) -> AppResult<Assignment>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Assignment>(
            "UPDATE event_vendors SET status = ? WHERE id = ? RETURNING *",
        )
        .bind(status)
        .bind(id)
        .fetch_one(exec)
        .await
        .map_err(|e| map_write_error(e, "assignment"))
    }

    /// Delete an assignment whose event belongs to `owner_id`.
    pub async fn delete<'e, E>(exec: E, id: &str, owner_id: &str) -> AppResult<bool>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM event_vendors
            WHERE id = ?
              AND event_id IN (SELECT id FROM events WHERE owner_id = ?)
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .execute(exec)
        .await
        .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }

    /// Events `vendor_id` is assigned to, across all owners, in storage order,
    /// skipping exactly the assignment row `exclude_assignment_id`.
    pub async fn vendor_bookings<'e, E>(
        exec: E,
        vendor_id: &str,
        exclude_assignment_id: Option<&str>,
    ) -> AppResult<Vec<BookedEvent>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, BookedEvent>(
            r#"
            SELECT e.id, e.title, e.starts_at, e.ends_at
            FROM events e
            INNER JOIN event_vendors ev ON e.id = ev.event_id
            WHERE ev.vendor_id = ?
              AND (? IS NULL OR ev.id <> ?)
            ORDER BY ev.rowid
            "#,
        )
        .bind(vendor_id)
        .bind(exclude_assignment_id)
        .bind(exclude_assignment_id)
        .fetch_all(exec)
        .await
        .map_err(AppError::Database)
    }
}
