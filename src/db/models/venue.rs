use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use crate::db::timestamp_column;

/// Advisory flag only; double-booking is prevented by window overlap, not by this.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    #[default]
    Available,
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Venue {
    pub id: String,
    pub name: String,
    pub address: String,
    pub capacity: i64,
    pub price_per_day: f64,
    pub amenities: Option<String>,
    pub availability_status: AvailabilityStatus,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for Venue {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Venue {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            address: row.try_get("address")?,
            capacity: row.try_get("capacity")?,
            price_per_day: row.try_get("price_per_day")?,
            amenities: row.try_get("amenities")?,
            availability_status: row.try_get("availability_status")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VenueDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    pub capacity: Option<i64>,
    pub price_per_day: Option<f64>,
    pub amenities: Option<String>,
    pub availability_status: Option<AvailabilityStatus>,
}
