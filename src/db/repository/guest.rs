use sqlx::SqliteExecutor;

use crate::db::models::{Guest, RsvpCount};
use crate::db::map_write_error;
use crate::error::{AppError, AppResult};

// ============================================================================
// Guest Repository
// ============================================================================

pub struct GuestRepository;

impl GuestRepository {
    pub async fn create<'e, E>(exec: E, guest: &Guest) -> AppResult<Guest>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Guest>(
            r#"
            INSERT INTO guests (
                id, event_id, name, email, phone,
                rsvp_status, dietary_restrictions, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&guest.id)
        .bind(&guest.event_id)
        .bind(&guest.name)
        .bind(&guest.email)
        .bind(&guest.phone)
        .bind(guest.rsvp_status)
        .bind(&guest.dietary_restrictions)
        .bind(guest.created_at.timestamp_millis())
        .fetch_one(exec)
        .await
        .map_err(|e| map_write_error(e, "guest"))
    }

    /// Find a guest whose event belongs to `owner_id`.
    pub async fn find_for_owner<'e, E>(
        exec: E,
        id: &str,
        owner_id: &str,
    ) -> AppResult<Option<Guest>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Guest>(
            r#"
            SELECT g.* FROM guests g
            INNER JOIN events e ON e.id = g.event_id
            WHERE g.id = ? AND e.owner_id = ?
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(exec)
        .await
        .map_err(AppError::Database)
    }

    pub async fn list_for_event<'e, E>(exec: E, event_id: &str) -> AppResult<Vec<Guest>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Guest>("SELECT * FROM guests WHERE event_id = ? ORDER BY name")
            .bind(event_id)
            .fetch_all(exec)
            .await
            .map_err(AppError::Database)
    }

    /// Guests of an event that have a non-blank email address.
    pub async fn list_reachable<'e, E>(exec: E, event_id: &str) -> AppResult<Vec<Guest>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Guest>(
            r#"
            SELECT * FROM guests
            WHERE event_id = ?
              AND email IS NOT NULL
              AND TRIM(email) <> ''
            ORDER BY name
            "#,
        )
        .bind(event_id)
        .fetch_all(exec)
        .await
        .map_err(AppError::Database)
    }

    /// Write back every mutable column of `guest`.
    pub async fn update<'e, E>(exec: E, guest: &Guest) -> AppResult<Guest>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Guest>(
            r#"
            UPDATE guests
            SET name = ?, email = ?, phone = ?, rsvp_status = ?, dietary_restrictions = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&guest.name)
        .bind(&guest.email)
        .bind(&guest.phone)
        .bind(guest.rsvp_status)
        .bind(&guest.dietary_restrictions)
        .bind(&guest.id)
        .fetch_optional(exec)
        .await
        .map_err(|e| map_write_error(e, "guest"))?
        .ok_or_else(|| AppError::NotFound("Guest not found".to_string()))
    }

    pub async fn delete<'e, E>(exec: E, id: &str) -> AppResult<bool>
    where
        E: SqliteExecutor<'e>,
    {
        let result = sqlx::query("DELETE FROM guests WHERE id = ?")
            .bind(id)
            .execute(exec)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected() > 0)
    }

    /// Guest counts per RSVP status for one event. Statuses with no guests are absent.
    pub async fn rsvp_counts<'e, E>(exec: E, event_id: &str) -> AppResult<Vec<RsvpCount>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, RsvpCount>(
            r#"
            SELECT rsvp_status, COUNT(*) AS count
            FROM guests
            WHERE event_id = ?
            GROUP BY rsvp_status
            ORDER BY rsvp_status
            "#,
        )
        .bind(event_id)
        .fetch_all(exec)
        .await
        .map_err(AppError::Database)
    }
}
