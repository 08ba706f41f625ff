use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use crate::db::{timestamp_column, Vendor};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AssignmentStatus {
    #[default]
    Pending,
    Confirmed,
}

/// A vendor booked for an event (row of `event_vendors`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub id: String,
    pub event_id: String,
    pub vendor_id: String,
    pub status: AssignmentStatus,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for Assignment {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Assignment {
            id: row.try_get("id")?,
            event_id: row.try_get("event_id")?,
            vendor_id: row.try_get("vendor_id")?,
            status: row.try_get("status")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }
}

/// Vendor as listed for a particular event, with its assignment row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssignedVendor {
    #[serde(flatten)]
    pub vendor: Vendor,
    pub assignment_id: String,
    pub assignment_status: AssignmentStatus,
}

impl<'r> FromRow<'r, SqliteRow> for AssignedVendor {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(AssignedVendor {
            vendor: Vendor::from_row(row)?,
            assignment_id: row.try_get("assignment_id")?,
            assignment_status: row.try_get("assignment_status")?,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssignmentDraft {
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub vendor_id: String,
    pub status: Option<AssignmentStatus>,
}
