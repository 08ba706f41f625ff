use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::db::{Venue, VenueDraft};
use crate::error::{AppError, AppResult};
use crate::routes::auth::AuthUser;
use crate::services::catalog::CatalogService;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_venues).post(create_venue))
        .route("/available/:start/:end", get(available_venues))
        .route("/:id", get(get_venue))
}

/// Parse an RFC 3339 instant or a bare `YYYY-MM-DD` date. A bare date covers
/// the whole day: its start when opening a range, its last millisecond when closing it.
fn parse_instant(raw: &str, closing: bool) -> AppResult<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Ok(at.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Invalid date: {}", raw)))?;
    let time = if closing {
        NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    }
    .ok_or_else(|| AppError::Validation(format!("Invalid date: {}", raw)))?;

    Ok(date.and_time(time).and_utc())
}

async fn list_venues(
    State(state): State<Arc<AppState>>,
    AuthUser(_owner): AuthUser,
) -> AppResult<Json<Vec<Venue>>> {
    Ok(Json(CatalogService::new(&state.db).list_venues().await?))
}

async fn get_venue(
    State(state): State<Arc<AppState>>,
    AuthUser(_owner): AuthUser,
    Path(id): Path<String>,
) -> AppResult<Json<Venue>> {
    Ok(Json(CatalogService::new(&state.db).get_venue(&id).await?))
}

async fn create_venue(
    State(state): State<Arc<AppState>>,
    AuthUser(owner): AuthUser,
    Json(draft): Json<VenueDraft>,
) -> AppResult<(StatusCode, Json<Venue>)> {
    let venue = CatalogService::new(&state.db).create_venue(draft).await?;
    tracing::debug!("Venue {} added by {}", venue.id, owner);
    Ok((StatusCode::CREATED, Json(venue)))
}

async fn available_venues(
    State(state): State<Arc<AppState>>,
    AuthUser(_owner): AuthUser,
    Path((start, end)): Path<(String, String)>,
) -> AppResult<Json<Vec<Venue>>> {
    let start = parse_instant(&start, false)?;
    let end = parse_instant(&end, true)?;
    Ok(Json(
        CatalogService::new(&state.db)
            .available_venues(start, end)
            .await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Method;
    use serde_json::json;

    use crate::test_support::{call, test_app, VENUE_BALLROOM};

    #[test]
    fn bare_dates_cover_whole_day() {
        let start = parse_instant("2025-06-01", false).unwrap();
        let end = parse_instant("2025-06-01", true).unwrap();
        assert_eq!(start.to_rfc3339(), "2025-06-01T00:00:00+00:00");
        assert_eq!(end.timestamp_millis() - start.timestamp_millis(), 86_399_999);
        assert!(parse_instant("June 1st", false).is_err());
    }

    #[tokio::test]
    async fn booked_venue_is_not_available() {
        let (app, _) = test_app().await;
        call(
            &app,
            Method::POST,
            "/api/events",
            Some("owner-a"),
            Some(json!({
                "title": "Gala",
                "event_type": "corporate",
                "start_date": "2025-06-01T18:00:00Z",
                "end_date": "2025-06-01T23:00:00Z",
                "venue_id": VENUE_BALLROOM,
            })),
        )
        .await;

        let (status, body) = call(
            &app,
            Method::GET,
            "/api/venues/available/2025-06-01/2025-06-01",
            Some("owner-b"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids.len(), 3);
        assert!(!ids.contains(&VENUE_BALLROOM));
    }
}
