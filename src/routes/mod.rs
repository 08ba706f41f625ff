pub mod auth;
pub mod events;
pub mod guests;
pub mod health;
pub mod tasks;
pub mod vendors;
pub mod venues;

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::AppState;

/// All API routes, mounted under `/api`.
pub fn api_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(health::health_check))
        .nest("/api/events", events::router())
        .nest("/api/venues", venues::router())
        .nest("/api/vendors", vendors::router())
        .nest("/api/guests", guests::router())
        .nest("/api/tasks", tasks::router())
        .with_state(state)
}
