//! Fixtures shared by the unit tests: migrated pools, catalog ids, tokens and
//! an in-process router.

use std::path::Path;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::{DateTime, TimeZone, Utc};
use http_body_util::BodyExt;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use tower::ServiceExt;

use crate::config::Config;
use crate::db::{Event, EventDraft, EventFields, EventRepository, EventStatus};
use crate::routes::{self, auth::Claims};
use crate::scheduling::TimeWindow;
use crate::services::hooks::PostCommitHub;
use crate::services::init;
use crate::services::mailer::{EmailMessage, MailError, Mailer};
use crate::AppState;

pub const VENUE_BALLROOM: &str = "6a0f8f4e-1c1d-4c55-9f3e-0d6b1b8c0001";
pub const VENUE_GARDEN: &str = "6a0f8f4e-1c1d-4c55-9f3e-0d6b1b8c0002";
pub const VENDOR_CATERING: &str = "3d7e2b10-5a44-4f0e-8c2d-7b9a5e1f0001";
pub const VENDOR_FLORIST: &str = "3d7e2b10-5a44-4f0e-8c2d-7b9a5e1f0005";

pub const TEST_JWT_SECRET: &str = "test-secret-do-not-use";

/// Single-connection in-memory database with migrations and the seed catalog.
pub async fn memory_pool() -> SqlitePool {
    let options: SqliteConnectOptions = "sqlite::memory:".parse().unwrap();
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options.foreign_keys(true))
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

/// File-backed WAL database, for tests that need real concurrent writers.
pub async fn file_pool(path: &Path) -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(init::connect_options(path, Duration::from_secs(5)))
        .await
        .unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

pub fn at(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).unwrap()
}

pub fn window(start_ms: i64, end_ms: i64) -> TimeWindow {
    TimeWindow::new(at(start_ms), at(end_ms)).unwrap()
}

pub fn draft(title: &str, venue_id: Option<&str>, start_ms: i64, end_ms: i64) -> EventDraft {
    EventDraft {
        title: title.to_string(),
        description: None,
        event_type: "party".to_string(),
        start_date: Some(at(start_ms)),
        end_date: Some(at(end_ms)),
        venue_id: venue_id.map(str::to_string),
        status: None,
    }
}

/// Store an event directly, bypassing the booking checks.
pub async fn insert_event(
    pool: &SqlitePool,
    owner_id: &str,
    venue_id: Option<&str>,
    window: TimeWindow,
) -> Event {
    let fields = EventFields {
        title: format!("Booking at {}", window.start_ms()),
        description: None,
        event_type: "party".to_string(),
        window,
        venue_id: venue_id.map(str::to_string),
        status: EventStatus::Planning,
    };
    let id = uuid::Uuid::new_v4().to_string();
    EventRepository::create(pool, &id, owner_id, &fields, Utc::now().timestamp_millis())
        .await
        .unwrap()
}

pub fn token_for(owner_id: &str) -> String {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: owner_id.to_string(),
        iat: now,
        exp: now + 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

pub async fn read_json(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}

/// Full API router over a fresh in-memory database.
pub async fn test_app() -> (Router, Arc<AppState>) {
    let mut config = Config::default();
    config.jwt.secret = TEST_JWT_SECRET.to_string();

    let state = Arc::new(AppState {
        db: memory_pool().await,
        config,
        hooks: PostCommitHub::new(),
        mailer: Arc::new(RecordingMailer::default()),
    });
    (routes::api_router(state.clone()), state)
}

/// Send one request through the router, authenticated as `owner` if given.
pub async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    owner: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(owner) = owner {
        request = request.header(header::AUTHORIZATION, format!("Bearer {}", token_for(owner)));
    }
    let request = match body {
        Some(json) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, read_json(response).await)
}

/// Mailer that records deliveries and can bounce one address.
#[derive(Default)]
pub struct RecordingMailer {
    fail_for: Option<String>,
    sent: Mutex<Vec<EmailMessage>>,
    attempts: AtomicUsize,
}

impl RecordingMailer {
    pub fn failing_for(address: &str) -> Self {
        Self {
            fail_for: Some(address.to_string()),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if self.fail_for.as_deref() == Some(message.to.as_str()) {
            return Err(MailError::Rejected {
                status: 550,
                body: "mailbox unavailable".to_string(),
            });
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}
