use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use crate::db::{optional_timestamp_column, timestamp_column};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "kebab-case")]
#[sqlx(rename_all = "kebab-case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Task {
    pub id: String,
    pub event_id: String,
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub reminder_sent: bool,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for Task {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Task {
            id: row.try_get("id")?,
            event_id: row.try_get("event_id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            assigned_to: row.try_get("assigned_to")?,
            due_date: optional_timestamp_column(row, "due_date")?,
            status: row.try_get("status")?,
            priority: row.try_get("priority")?,
            reminder_sent: row.try_get("reminder_sent")?,
            created_at: timestamp_column(row, "created_at")?,
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskDraft {
    #[serde(default)]
    pub event_id: String,
    #[serde(default)]
    pub title: String,
    pub description: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

/// Partial task update; `None` keeps the stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub assigned_to: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub reminder_sent: Option<bool>,
}

/// Open task due soon, joined with its event for reminder listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UpcomingTask {
    #[serde(flatten)]
    pub task: Task,
    pub event_title: String,
    pub event_start_date: DateTime<Utc>,
}

impl<'r> FromRow<'r, SqliteRow> for UpcomingTask {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(UpcomingTask {
            task: Task::from_row(row)?,
            event_title: row.try_get("event_title")?,
            event_start_date: timestamp_column(row, "event_start_date")?,
        })
    }
}
