use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::config::MailerConfig;

/// Plain-text email ready to hand to a transport.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text: String,
}

#[derive(Debug, thiserror::Error)]
pub enum MailError {
    #[error("mail relay unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("mail relay rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

/// Development transport: writes the message to the log instead of sending it.
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "Email not sent (log transport):\n{}",
            message.text
        );
        Ok(())
    }
}

#[derive(Serialize)]
struct RelayPayload<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Posts messages as JSON to an HTTP mail relay.
pub struct WebhookMailer {
    client: reqwest::Client,
    endpoint: String,
    from: String,
}

impl WebhookMailer {
    pub fn new(endpoint: String, from: String, timeout: Duration) -> Result<Self, MailError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            from,
        })
    }
}

#[async_trait]
impl Mailer for WebhookMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&RelayPayload {
                from: &self.from,
                to: &message.to,
                subject: &message.subject,
                text: &message.text,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MailError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!("Mail relay accepted message to {}", message.to);
        Ok(())
    }
}

/// Pick the transport from configuration: the relay when a URL is set, the log otherwise.
pub fn from_config(config: &MailerConfig) -> Result<Arc<dyn Mailer>, MailError> {
    match config.webhook_url {
        Some(ref url) => {
            tracing::info!("Mail relay configured: {}", url);
            Ok(Arc::new(WebhookMailer::new(
                url.clone(),
                config.from_address.clone(),
                Duration::from_secs(config.request_timeout_seconds),
            )?))
        }
        None => {
            tracing::info!("No mail relay configured; emails will be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn log_mailer_always_accepts() {
        let message = EmailMessage {
            to: "guest@example.com".to_string(),
            subject: "Hello".to_string(),
            text: "Body".to_string(),
        };
        assert!(LogMailer.send(&message).await.is_ok());
    }

    #[tokio::test]
    async fn unreachable_relay_reports_transport_error() {
        let mailer = WebhookMailer::new(
            "http://127.0.0.1:9/mail".to_string(),
            "noreply@example.com".to_string(),
            Duration::from_millis(500),
        )
        .unwrap();
        let message = EmailMessage {
            to: "guest@example.com".to_string(),
            subject: "Hello".to_string(),
            text: "Body".to_string(),
        };

        let err = mailer.send(&message).await.unwrap_err();
        assert!(matches!(err, MailError::Transport(_)));
    }
}
