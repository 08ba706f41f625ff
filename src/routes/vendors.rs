use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;

use crate::db::{AssignedVendor, Assignment, AssignmentDraft, AssignmentStatus, Vendor, VendorDraft};
use crate::error::AppResult;
use crate::routes::auth::AuthUser;
use crate::services::assignments::AssignmentService;
use crate::services::catalog::CatalogService;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_vendors).post(create_vendor))
        .route("/event/:event_id", get(vendors_for_event))
        .route("/assign", post(assign_vendor))
        .route(
            "/assign/:assignment_id",
            put(update_assignment).delete(remove_assignment),
        )
        .route("/:id", get(get_vendor))
}

#[derive(Debug, Deserialize)]
pub struct VendorQuery {
    #[serde(rename = "type")]
    pub vendor_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignmentUpdate {
    pub status: AssignmentStatus,
}

async fn list_vendors(
    State(state): State<Arc<AppState>>,
    AuthUser(_owner): AuthUser,
    Query(query): Query<VendorQuery>,
) -> AppResult<Json<Vec<Vendor>>> {
    Ok(Json(
        CatalogService::new(&state.db)
            .list_vendors(query.vendor_type.as_deref())
            .await?,
    ))
}

async fn get_vendor(
    State(state): State<Arc<AppState>>,
    AuthUser(_owner): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Vendor>> {
    Ok(Json(CatalogService::new(&state.db).get_vendor(&id).await?))
}

async fn create_vendor(
    State(state): State<Arc<AppState>>,
    AuthUser(_owner): AuthUser,
    Json(draft): Json<VendorDraft>,
) -> AppResult<(StatusCode, Json<Vendor>)> {
    let vendor = CatalogService::new(&state.db).create_vendor(draft).await?;
    Ok((StatusCode::CREATED, Json(vendor)))
}

async fn vendors_for_event(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Path(event_id): Path<String>,
) -> AppResult<Json<Vec<AssignedVendor>>> {
    Ok(Json(
        CatalogService::new(&state.db)
            .vendors_for_event(&owner, &event_id)
            .await?,
    ))
}

async fn assign_vendor(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Json(draft): Json<AssignmentDraft>,
) -> AppResult<(StatusCode, Json<Assignment>)> {
    let assignment = AssignmentService::new(&state.db)
        .assign_vendor(&owner, draft)
        .await?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

async fn update_assignment(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Path(assignment_id): Path<String>,
    Json(update): Json<AssignmentUpdate>,
) -> AppResult<Json<Assignment>> {
    Ok(Json(
        AssignmentService::new(&state.db)
            .update_status(&owner, &assignment_id, update.status)
            .await?,
    ))
}

async fn remove_assignment(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Path(assignment_id): Path<String>,
) -> AppResult<Json<serde_json::Value>> {
    AssignmentService::new(&state.db)
        .remove(&owner, &assignment_id)
        .await?;
    Ok(Json(
        serde_json::json!({ "message": "Vendor removed successfully" }),
    ))
}
