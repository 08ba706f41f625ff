use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use crate::db::timestamp_column;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum RsvpStatus {
    #[default]
    Pending,
    Confirmed,
    Declined,
}

impl RsvpStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RsvpStatus::Pending => "pending",
            RsvpStatus::Confirmed => "confirmed",
            RsvpStatus::Declined => "declined",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Guest {
    pub id: String,
    pub event_id: String,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub rsvp_status: RsvpStatus,
    pub dietary_restrictions: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Guest {
    /// Email address if it is set and not blank.
    pub fn deliverable_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}

impl<'r> FromRow<'r, SqliteRow> for Guest {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Guest {
            id: row.try_get("id")?,
            event_id: row.try_get("event_id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            rsvp_status: row.try_get("rsvp_status")?,
            dietary_restrictions: row.try_get("dietary_restrictions")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuestDraft {
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub rsvp_status: Option<RsvpStatus>,
    pub dietary_restrictions: Option<String>,
}

/// Partial guest update; `None` keeps the stored value.
///
/// The optional contact fields distinguish an absent key (keep) from an
/// explicit `null` (clear).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuestChanges {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub email: Option<Option<String>>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub phone: Option<Option<String>>,
    pub rsvp_status: Option<RsvpStatus>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub dietary_restrictions: Option<Option<String>>,
}

/// A key that is present in the payload, possibly `null`.
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RsvpCount {
    pub rsvp_status: RsvpStatus,
    pub count: i64,
}

impl<'r> FromRow<'r, SqliteRow> for RsvpCount {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(RsvpCount {
            rsvp_status: row.try_get("rsvp_status")?,
            count: row.try_get("count")?,
        })
    }
}
