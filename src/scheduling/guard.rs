use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqliteConnection};

use crate::db::{window_columns, AssignmentRepository, EventRepository};
use crate::error::AppResult;
use crate::scheduling::window::{first_conflict, Booked, TimeWindow};

/// An existing event occupying a venue or vendor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookedEvent {
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub window: TimeWindow,
}

impl Booked for BookedEvent {
    fn window(&self) -> &TimeWindow {
        &self.window
    }
}

impl<'r> FromRow<'r, SqliteRow> for BookedEvent {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(BookedEvent {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            window: window_columns(row, "starts_at", "ends_at")?,
        })
    }
}

/// Kind of resource a conflict was found on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BookedResource {
    Venue,
    Vendor,
}

impl BookedResource {
    pub fn as_str(self) -> &'static str {
        match self {
            BookedResource::Venue => "venue",
            BookedResource::Vendor => "vendor",
        }
    }
}

/// First event already holding `venue_id` during `candidate`.
///
/// Events of every status and owner count. `exclude_event_id` skips the event
/// being updated so it cannot conflict with itself.
pub async fn check_venue_conflict(
    conn: &mut SqliteConnection,
    venue_id: Option<&str>,
    candidate: &TimeWindow,
    exclude_event_id: Option<&str>,
) -> AppResult<Option<BookedEvent>> {
    let Some(venue_id) = venue_id else {
        return Ok(None);
    };

    let bookings = EventRepository::venue_bookings(&mut *conn, venue_id, exclude_event_id).await?;
    let hit = first_conflict(candidate, &bookings).cloned();

    if let Some(ref event) = hit {
        tracing::debug!(
            "Venue {} is taken by event {} for [{}, {}]",
            venue_id,
            event.id,
            event.window.start(),
            event.window.end()
        );
    }

    Ok(hit)
}

/// First event `vendor_id` is already assigned to during `candidate`.
///
/// `exclude_assignment_id` skips exactly that assignment row; other assignments
/// of the vendor still count.
pub async fn check_vendor_conflict(
    conn: &mut SqliteConnection,
    vendor_id: &str,
    candidate: &TimeWindow,
    exclude_assignment_id: Option<&str>,
) -> AppResult<Option<BookedEvent>> {
    let bookings =
        AssignmentRepository::vendor_bookings(&mut *conn, vendor_id, exclude_assignment_id).await?;
    let hit = first_conflict(candidate, &bookings).cloned();

    if let Some(ref event) = hit {
        tracing::debug!(
            "Vendor {} is taken by event {} for [{}, {}]",
            vendor_id,
            event.id,
            event.window.start(),
            event.window.end()
        );
    }

    Ok(hit)
}
