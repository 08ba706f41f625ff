use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::scheduling::{BookedEvent, BookedResource};
use crate::services::mailer::MailError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested window overlaps an existing booking of the same resource.
    #[error("{} is already booked by event {}", .resource.as_str(), .event.id)]
    BookingConflict {
        resource: BookedResource,
        event: BookedEvent,
    },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Mail delivery failed: {0}")]
    Mailer(#[from] MailError),

    #[error("Configuration error: {0}")]
    Config(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl AppError {
    pub fn venue_conflict(event: BookedEvent) -> Self {
        AppError::BookingConflict {
            resource: BookedResource::Venue,
            event,
        }
    }

    pub fn vendor_conflict(event: BookedEvent) -> Self {
        AppError::BookingConflict {
            resource: BookedResource::Vendor,
            event,
        }
    }

    fn status_and_code(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", self.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                msg.clone(),
            ),
            AppError::BookingConflict { resource, .. } => {
                let message = match resource {
                    BookedResource::Venue => {
                        "This venue is already booked for the selected time range"
                    }
                    BookedResource::Vendor => {
                        "This vendor is already booked for another event in the selected time range"
                    }
                };
                (StatusCode::CONFLICT, "BOOKING_CONFLICT", message.to_string())
            }
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Jwt(e) => {
                tracing::warn!("JWT error: {:?}", e);
                (
                    StatusCode::UNAUTHORIZED,
                    "INVALID_TOKEN",
                    "Invalid or expired token".to_string(),
                )
            }
            AppError::Mailer(e) => {
                tracing::error!("Mailer error: {}", e);
                (
                    StatusCode::BAD_GATEWAY,
                    "MAIL_DELIVERY_FAILED",
                    "Failed to hand the message to the mail relay".to_string(),
                )
            }
            AppError::Config(msg) => {
                tracing::error!("Configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIG_ERROR",
                    "Server configuration error".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            AppError::BookingConflict { resource, event } => Some(serde_json::json!({
                "resource": resource,
                "conflicting_event": event,
            })),
            _ => None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.status_and_code();

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details: self.details(),
            },
        };

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{read_json, window};

    #[tokio::test]
    async fn booking_conflict_renders_conflicting_event() {
        let err = AppError::venue_conflict(BookedEvent {
            id: "evt-1".to_string(),
            title: "Spring Gala".to_string(),
            window: window(0, 3_600_000),
        });

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let body = read_json(response).await;
        assert_eq!(body["error"]["code"], "BOOKING_CONFLICT");
        assert_eq!(body["error"]["details"]["resource"], "venue");
        let event = &body["error"]["details"]["conflicting_event"];
        assert_eq!(event["id"], "evt-1");
        assert_eq!(event["title"], "Spring Gala");
        assert_eq!(event["start_date"], "1970-01-01T00:00:00Z");
        assert_eq!(event["end_date"], "1970-01-01T01:00:00Z");
    }

    #[tokio::test]
    async fn validation_maps_to_unprocessable_without_details() {
        let response = AppError::Validation("Title is required".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = read_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "Title is required");
        assert!(body["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn database_errors_hide_internals() {
        let response = AppError::Database(sqlx::Error::RowNotFound).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = read_json(response).await;
        assert_eq!(body["error"]["message"], "A database error occurred");
    }
}
