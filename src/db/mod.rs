pub mod models;
pub mod repository;

pub use models::*;
pub use repository::*;

use chrono::{DateTime, TimeZone, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::scheduling::TimeWindow;

/// Current time as stored in the database (unix milliseconds).
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub(crate) fn decode_error(column: &str, message: impl Into<String>) -> sqlx::Error {
    sqlx::Error::ColumnDecode {
        index: column.to_string(),
        source: Box::<dyn std::error::Error + Send + Sync>::from(message.into()),
    }
}

pub(crate) fn timestamp_column(row: &SqliteRow, column: &str) -> Result<DateTime<Utc>, sqlx::Error> {
    let ms: i64 = row.try_get(column)?;
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| decode_error(column, format!("timestamp out of range: {}", ms)))
}

pub(crate) fn optional_timestamp_column(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
    let ms: Option<i64> = row.try_get(column)?;
    match ms {
        Some(ms) => Utc
            .timestamp_millis_opt(ms)
            .single()
            .map(Some)
            .ok_or_else(|| decode_error(column, format!("timestamp out of range: {}", ms))),
        None => Ok(None),
    }
}

pub(crate) fn window_columns(
    row: &SqliteRow,
    start: &str,
    end: &str,
) -> Result<TimeWindow, sqlx::Error> {
    let start_ms: i64 = row.try_get(start)?;
    let end_ms: i64 = row.try_get(end)?;
    TimeWindow::from_millis(start_ms, end_ms)
        .ok_or_else(|| decode_error(start, format!("invalid window [{}, {}]", start_ms, end_ms)))
}

/// Map a write failure, turning the storage-level overlap triggers and
/// uniqueness violations into conflicts.
pub(crate) fn map_write_error(err: sqlx::Error, what: &str) -> crate::error::AppError {
    use crate::error::AppError;

    if let sqlx::Error::Database(ref db_err) = err {
        let message = db_err.message();
        if message.contains("venue_conflict") {
            return AppError::Conflict(
                "This venue is already booked for the selected time range".to_string(),
            );
        }
        if message.contains("vendor_conflict") {
            return AppError::Conflict(
                "This vendor is already booked for another event in the selected time range"
                    .to_string(),
            );
        }
        if db_err.is_unique_violation() {
            return AppError::Conflict(format!("{} already exists", what));
        }
        if db_err.is_foreign_key_violation() {
            return AppError::NotFound(format!("Referenced record for {} not found", what));
        }
    }
    AppError::Database(err)
}
