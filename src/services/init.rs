//! Start-up helpers:
//! - database connection + migrations
//! - background worker spawn helpers

use std::{path::Path, sync::Arc, time::Duration};

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use tokio::sync::broadcast;

use crate::config::Config;
use crate::services::hooks::PostCommit;
use crate::services::mailer::Mailer;
use crate::services::rsvp;

/// Redact potentially sensitive information from a database URL before logging.
///
/// Attempts to parse the URL and remove userinfo (username:password) components.
/// Falls back to removing everything before '@' or returning "(redacted)".
pub fn redact_db_url(db_url: &str) -> String {
    if let Ok(url) = url::Url::parse(db_url) {
        let scheme = url.scheme();
        let host = url.host_str().unwrap_or("");
        let port_part = url.port().map(|p| format!(":{}", p)).unwrap_or_default();
        let path = url.path();
        format!("{}://{}{}{}", scheme, host, port_part, path)
    } else {
        if let Some(at_pos) = db_url.find('@') {
            let without_creds = &db_url[at_pos + 1..];
            return format!("(redacted){}", without_creds);
        }
        "(redacted)".to_string()
    }
}

/// Connection options shared by the server and the tests.
///
/// WAL lets readers proceed while a booking holds the write lock; writers wait
/// up to `busy_timeout` for their turn.
pub fn connect_options(db_path: impl AsRef<Path>, busy_timeout: Duration) -> SqliteConnectOptions {
    SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(busy_timeout)
}

/// Initialize SQLite database connection and run migrations.
///
/// Creates the parent directory for the database file (if applicable),
/// opens a WAL-mode pool with foreign keys enforced and runs migrations.
pub async fn init_db(config: &Config) -> Result<sqlx::SqlitePool> {
    let db_url = &config.database.url;
    tracing::info!("Connecting to database: {}", redact_db_url(db_url));

    let db_path = db_url.strip_prefix("sqlite://").unwrap_or(db_url);
    let db_file_path = Path::new(db_path);

    if let Some(parent) = db_file_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                anyhow::anyhow!(
                    "Failed to create database directory {}: {}",
                    parent.display(),
                    e
                )
            })?;
            tracing::info!(
                "Database directory created or already exists: {}",
                parent.display()
            );
        }
    }

    let options = connect_options(
        db_path,
        Duration::from_secs(config.database.busy_timeout_seconds),
    );

    let pool = SqlitePoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_with(options)
        .await?;

    tracing::info!("Connected to database file: {}", db_file_path.display());

    tracing::info!("Running database migrations");
    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Deliver RSVP confirmations for notices published after guest updates.
///
/// Delivery failures are logged and dropped; the guest update they belong to
/// has already been committed.
pub async fn run_rsvp_mailer(
    mut notices: broadcast::Receiver<PostCommit>,
    mailer: Arc<dyn Mailer>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!("RSVP mailer shutting down");
                break;
            }
            received = notices.recv() => match received {
                Ok(PostCommit::RsvpChanged(notice)) => {
                    let message = rsvp::rsvp_email(&notice);
                    match mailer.send(&message).await {
                        Ok(()) => tracing::info!("RSVP confirmation sent to {}", notice.email),
                        Err(e) => tracing::warn!(
                            "Failed to send RSVP confirmation to {}: {}",
                            notice.email,
                            e
                        ),
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("RSVP mailer lagged; {} notices dropped", skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }
}

/// Spawn background workers:
/// - RSVP confirmation mailer fed by the post-commit hub
///
/// Returns the `JoinHandle`s so callers can await shutdown. Each worker listens
/// for a shutdown notification via a `tokio::sync::broadcast::Sender<()>`.
pub fn spawn_background_workers(
    state: Arc<crate::AppState>,
    shutdown: broadcast::Sender<()>,
) -> Vec<tokio::task::JoinHandle<()>> {
    let mut handles = Vec::new();

    handles.push(tokio::spawn(run_rsvp_mailer(
        state.hooks.subscribe(),
        state.mailer.clone(),
        shutdown.subscribe(),
    )));

    handles
}
