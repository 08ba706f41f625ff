use sqlx::SqliteExecutor;

use crate::db::models::{AvailabilityStatus, Venue};
use crate::db::map_write_error;
use crate::error::{AppError, AppResult};
use crate::scheduling::TimeWindow;

// ============================================================================
// Venue Repository
// ============================================================================

pub struct VenueRepository;

impl VenueRepository {
    #[allow(clippy::too_many_arguments)]
    pub async fn create<'e, E>(
        exec: E,
        id: &str,
        name: &str,
        address: &str,
        capacity: i64,
        price_per_day: f64,
        amenities: Option<&str>,
        availability_status: AvailabilityStatus,
        created_at: i64,
    ) -> AppResult<Venue>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Venue>(
            r#"
            INSERT INTO venues (
                id, name, address, capacity, price_per_day,
                amenities, availability_status, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(address)
        .bind(capacity)
        .bind(price_per_day)
        .bind(amenities)
        .bind(availability_status)
        .bind(created_at)
        .fetch_one(exec)
        .await
        .map_err(|e| map_write_error(e, "venue"))
    }

    pub async fn find_by_id<'e, E>(exec: E, id: &str) -> AppResult<Option<Venue>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Venue>("SELECT * FROM venues WHERE id = ?")
            .bind(id)
            .fetch_optional(exec)
            .await
            .map_err(AppError::Database)
    }

    pub async fn list_all<'e, E>(exec: E) -> AppResult<Vec<Venue>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Venue>("SELECT * FROM venues ORDER BY name")
            .fetch_all(exec)
            .await
            .map_err(AppError::Database)
    }

    /// Venues flagged available with no booking overlapping `window`.
    ///
    /// The predicate is the closed-interval overlap rule used by the booking guards.
    pub async fn list_available<'e, E>(exec: E, window: &TimeWindow) -> AppResult<Vec<Venue>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Venue>(
            r#"
            SELECT v.* FROM venues v
            WHERE v.availability_status = 'available'
              AND NOT EXISTS (
                  SELECT 1 FROM events e
                  WHERE e.venue_id = v.id
                    AND e.starts_at <= ?
                    AND e.ends_at >= ?
              )
            ORDER BY v.name
            "#,
        )
        .bind(window.end_ms())
        .bind(window.start_ms())
        .fetch_all(exec)
        .await
        .map_err(AppError::Database)
    }
}
