use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use crate::db::{timestamp_column, window_columns};
use crate::scheduling::TimeWindow;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum EventStatus {
    #[default]
    Planning,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Planning => "planning",
            EventStatus::Confirmed => "confirmed",
            EventStatus::InProgress => "in-progress",
            EventStatus::Completed => "completed",
            EventStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub id: String,
    pub owner_id: String,
    pub title: String,
    pub description: Option<String>,
    pub event_type: String,
    #[serde(flatten)]
    pub window: TimeWindow,
    pub venue_id: Option<String>,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for Event {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Event {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            event_type: row.try_get("event_type")?,
            window: window_columns(row, "starts_at", "ends_at")?,
            venue_id: row.try_get("venue_id")?,
            status: row.try_get("status")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }
}

/// Event payload as submitted by a client, before validation.
///
/// Used for both create and full-replacement update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventDraft {
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub event_type: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub venue_id: Option<String>,
    pub status: Option<EventStatus>,
}

/// Validated event fields ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct EventFields {
    pub title: String,
    pub description: Option<String>,
    pub event_type: String,
    pub window: TimeWindow,
    pub venue_id: Option<String>,
    pub status: EventStatus,
}
