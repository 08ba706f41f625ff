use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use crate::db::timestamp_column;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vendor {
    pub id: String,
    pub name: String,
    /// Category, e.g. 'catering', 'florist'.
    pub vendor_type: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub service_description: Option<String>,
    pub price_range: Option<String>,
    pub rating: f64,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for Vendor {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Vendor {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            vendor_type: row.try_get("vendor_type")?,
            contact_email: row.try_get("contact_email")?,
            contact_phone: row.try_get("contact_phone")?,
            service_description: row.try_get("service_description")?,
            price_range: row.try_get("price_range")?,
            rating: row.try_get("rating")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VendorDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub vendor_type: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub service_description: Option<String>,
    pub price_range: Option<String>,
    pub rating: Option<f64>,
}
