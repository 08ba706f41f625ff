use sqlx::SqliteExecutor;

use crate::error::{AppError, AppResult};

// ============================================================================
// Booking Lock Repository
// ============================================================================

/// Lock key for a venue's bookings.
pub fn venue_key(venue_id: &str) -> String {
    format!("venue:{}", venue_id)
}

/// Lock key for a vendor's assignments.
pub fn vendor_key(vendor_id: &str) -> String {
    format!("vendor:{}", vendor_id)
}

/// Lock key for an event being edited without a venue.
pub fn event_key(event_id: &str) -> String {
    format!("event:{}", event_id)
}

/// Lock key for a guest whose RSVP is being changed.
pub fn guest_key(guest_id: &str) -> String {
    format!("guest:{}", guest_id)
}

pub struct LockRepository;

impl LockRepository {
    /// Bump the lock row for `resource_key` inside the caller's transaction.
    ///
    /// Must be the first statement of the transaction: the write takes the
    /// database write lock (waiting on the busy timeout) before any booking is
    /// read, so check and write happen against the latest committed state and
    /// concurrent bookings of the same resource run one after another.
    pub async fn claim<'e, E>(exec: E, resource_key: &str) -> AppResult<()>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query(
            r#"
            INSERT INTO booking_locks (resource_key, generation)
            VALUES (?, 1)
            ON CONFLICT(resource_key) DO UPDATE SET generation = generation + 1
            "#,
        )
        .bind(resource_key)
        .execute(exec)
        .await
        .map_err(AppError::Database)?;

        Ok(())
    }
}
