use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::db::{Event, EventDraft};
use crate::error::AppResult;
use crate::routes::auth::AuthUser;
use crate::services::events::EventService;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route(
            "/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
}

async fn list_events(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
) -> AppResult<Json<Vec<Event>>> {
    Ok(Json(EventService::new(&state.db).list(&owner).await?))
}

async fn get_event(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Event>> {
    Ok(Json(EventService::new(&state.db).get(&owner, &id).await?))
}

async fn create_event(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Json(draft): Json<EventDraft>,
) -> AppResult<(StatusCode, Json<Event>)> {
    let event = EventService::new(&state.db).create(&owner, draft).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

async fn update_event(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
    Json(draft): Json<EventDraft>,
) -> AppResult<Json<Event>> {
    Ok(Json(
        EventService::new(&state.db).update(&owner, &id, draft).await?,
    ))
}

async fn delete_event(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    EventService::new(&state.db).delete(&owner, &id).await?;
    Ok(Json(
        serde_json::json!({ "message": "Event deleted successfully" }),
    ))
}
