use chrono::{Duration, Utc};
use sqlx::SqlitePool;

use crate::db::{
    now_millis, EventRepository, Task, TaskChanges, TaskDraft, TaskRepository, UpcomingTask,
};
use crate::error::{AppError, AppResult};

const DEFAULT_REMINDER_DAYS: i64 = 7;
const MAX_REMINDER_DAYS: i64 = 3650;

/// Planning checklist per event.
pub struct TaskService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> TaskService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    async fn ensure_owned_event(&self, owner_id: &str, event_id: &str) -> AppResult<()> {
        EventRepository::find_for_owner(self.pool, event_id, owner_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
    }

    pub async fn list_for_event(&self, owner_id: &str, event_id: &str) -> AppResult<Vec<Task>> {
        self.ensure_owned_event(owner_id, event_id).await?;
        TaskRepository::list_for_event(self.pool, event_id).await
    }

    pub async fn get(&self, owner_id: &str, task_id: &str) -> AppResult<Task> {
        TaskRepository::find_for_owner(self.pool, task_id, owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".to_string()))
    }

    pub async fn create(&self, owner_id: &str, draft: TaskDraft) -> AppResult<Task> {
        let event_id = draft.event_id.trim();
        if event_id.is_empty() {
            return Err(AppError::Validation("Event ID is required".to_string()));
        }
        let title = draft.title.trim();
        if title.is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }

        self.ensure_owned_event(owner_id, event_id).await?;

        let task = Task {
            id: uuid::Uuid::new_v4().to_string(),
            event_id: event_id.to_string(),
            title: title.to_string(),
            description: draft.description,
            assigned_to: draft.assigned_to,
            due_date: draft.due_date,
            status: draft.status.unwrap_or_default(),
            priority: draft.priority.unwrap_or_default(),
            reminder_sent: false,
            created_at: Utc::now(),
        };

        TaskRepository::create(self.pool, &task).await
    }

    /// Apply a partial update; `None` fields keep their stored value.
    pub async fn update(&self, owner_id: &str, task_id: &str, changes: TaskChanges) -> AppResult<Task> {
        let mut task = self.get(owner_id, task_id).await?;

        if let Some(title) = changes.title {
            let title = title.trim();
            if title.is_empty() {
                return Err(AppError::Validation("Title is required".to_string()));
            }
            task.title = title.to_string();
        }
        if let Some(description) = changes.description {
            task.description = Some(description);
        }
        if let Some(assigned_to) = changes.assigned_to {
            task.assigned_to = Some(assigned_to);
        }
        if let Some(due_date) = changes.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(status) = changes.status {
            task.status = status;
        }
        if let Some(priority) = changes.priority {
            task.priority = priority;
        }
        if let Some(reminder_sent) = changes.reminder_sent {
            task.reminder_sent = reminder_sent;
        }

        TaskRepository::update(self.pool, &task).await
    }

    pub async fn delete(&self, owner_id: &str, task_id: &str) -> AppResult<()> {
        self.get(owner_id, task_id).await?;
        TaskRepository::delete(self.pool, task_id).await?;
        Ok(())
    }

    /// Open tasks across the owner's events due within `days` (default 7) that
    /// have not been reminded yet, overdue ones included. `days` is capped at
    /// ten years.
    pub async fn upcoming(&self, owner_id: &str, days: Option<i64>) -> AppResult<Vec<UpcomingTask>> {
        let days = days.filter(|d| *d > 0).unwrap_or(DEFAULT_REMINDER_DAYS);
        if days > MAX_REMINDER_DAYS {
            return Err(AppError::Validation(format!(
                "Days must be between 1 and {}",
                MAX_REMINDER_DAYS
            )));
        }
        let until = now_millis() + Duration::days(days).num_milliseconds();
        TaskRepository::upcoming_for_owner(self.pool, owner_id, until).await
    }
}
