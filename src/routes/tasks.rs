use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::db::{Task, TaskChanges, TaskDraft, UpcomingTask};
use crate::error::AppResult;
use crate::routes::auth::AuthUser;
use crate::services::tasks::TaskService;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_task))
        .route("/event/:event_id", get(list_tasks))
        .route("/reminders/upcoming", get(upcoming_tasks))
        .route("/:id", get(get_task).put(update_task).delete(delete_task))
}

#[derive(Debug, Deserialize)]
pub struct UpcomingQuery {
    pub days: Option<i64>,
}

async fn list_tasks(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Path(event_id): Path<String>,
) -> AppResult<Json<Vec<Task>>> {
    Ok(Json(
        TaskService::new(&state.db)
            .list_for_event(&owner, &event_id)
            .await?,
    ))
}

async fn upcoming_tasks(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Query(query): Query<UpcomingQuery>,
) -> AppResult<Json<Vec<UpcomingTask>>> {
    Ok(Json(
        TaskService::new(&state.db)
            .upcoming(&owner, query.days)
            .await?,
    ))
}

async fn get_task(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Task>> {
    Ok(Json(TaskService::new(&state.db).get(&owner, &id).await?))
}

async fn create_task(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Json(draft): Json<TaskDraft>,
) -> AppResult<(StatusCode, Json<Task>)> {
    let task = TaskService::new(&state.db).create(&owner, draft).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
    Json(changes): Json<TaskChanges>,
) -> AppResult<Json<Task>> {
    Ok(Json(
        TaskService::new(&state.db)
            .update(&owner, &id, changes)
            .await?,
    ))
}

async fn delete_task(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    TaskService::new(&state.db).delete(&owner, &id).await?;
    Ok(Json(
        serde_json::json!({ "message": "Task deleted successfully" }),
    ))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use chrono::{Duration, Utc};
    use serde_json::json;

    use crate::test_support::{call, test_app};

    #[tokio::test]
    async fn upcoming_lists_open_tasks_due_soon() {
        let (app, _) = test_app().await;
        let start = Utc::now() + Duration::days(20);
        let (_, event) = call(
            &app,
            Method::POST,
            "/api/events",
            Some("owner-a"),
            Some(json!({
                "title": "Retreat",
                "event_type": "corporate",
                "start_date": start,
                "end_date": start + Duration::days(2),
            })),
        )
        .await;

        for (title, due_in) in [("Book bus", 2), ("Print badges", 15)] {
            let (status, _) = call(
                &app,
                Method::POST,
                "/api/tasks",
                Some("owner-a"),
                Some(json!({
                    "event_id": event["id"],
                    "title": title,
                    "due_date": Utc::now() + Duration::days(due_in),
                })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = call(
            &app,
            Method::GET,
            "/api/tasks/reminders/upcoming?days=7",
            Some("owner-a"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let upcoming = body.as_array().unwrap();
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0]["title"], "Book bus");
        assert_eq!(upcoming[0]["event_title"], "Retreat");

        let (_, other) = call(
            &app,
            Method::GET,
            "/api/tasks/reminders/upcoming",
            Some("owner-b"),
            None,
        )
        .await;
        assert_eq!(other, json!([]));
    }

    #[tokio::test]
    async fn huge_days_is_unprocessable() {
        let (app, _) = test_app().await;
        let (status, body) = call(
            &app,
            Method::GET,
            "/api/tasks/reminders/upcoming?days=200000000000000",
            Some("owner-a"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
