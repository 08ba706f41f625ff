use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::db::{Guest, GuestChanges, GuestDraft, RsvpCount};
use crate::error::AppResult;
use crate::routes::auth::AuthUser;
use crate::services::guests::{GuestService, InvitationReport, InvitationRequest};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_guest))
        .route("/event/:event_id", get(list_guests))
        .route("/event/:event_id/stats", get(rsvp_stats))
        .route("/send-emails/:event_id", post(send_invitations))
        .route(
            "/:id",
            get(get_guest).put(update_guest).delete(delete_guest),
        )
}

async fn list_guests(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Path(event_id): Path<String>,
) -> AppResult<Json<Vec<Guest>>> {
    let service = GuestService::new(&state.db, &state.hooks);
    Ok(Json(service.list_for_event(&owner, &event_id).await?))
}

async fn rsvp_stats(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Path(event_id): Path<String>,
) -> AppResult<Json<Vec<RsvpCount>>> {
    let service = GuestService::new(&state.db, &state.hooks);
    Ok(Json(service.rsvp_stats(&owner, &event_id).await?))
}

async fn get_guest(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Guest>> {
    let service = GuestService::new(&state.db, &state.hooks);
    Ok(Json(service.get(&owner, &id).await?))
}

async fn create_guest(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Json(draft): Json<GuestDraft>,
) -> AppResult<(StatusCode, Json<Guest>)> {
    let service = GuestService::new(&state.db, &state.hooks);
    let guest = service.create(&owner, draft).await?;
    Ok((StatusCode::CREATED, Json(guest)))
}

async fn update_guest(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
    Json(changes): Json<GuestChanges>,
) -> AppResult<Json<Guest>> {
    let service = GuestService::new(&state.db, &state.hooks);
    Ok(Json(service.update(&owner, &id, changes).await?))
}

async fn delete_guest(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    GuestService::new(&state.db, &state.hooks)
        .delete(&owner, &id)
        .await?;
    Ok(Json(
        serde_json::json!({ "message": "Guest deleted successfully" }),
    ))
}

async fn send_invitations(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Path(event_id): Path<String>,
    request: Option<Json<InvitationRequest>>,
) -> AppResult<Json<InvitationReport>> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    let report = GuestService::new(&state.db, &state.hooks)
        .send_invitations(&owner, &event_id, request, state.mailer.as_ref())
        .await?;
    Ok(Json(report))
}
