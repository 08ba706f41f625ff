use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::repository::lock::guest_key;
use crate::db::{
    Event, EventRepository, Guest, GuestChanges, GuestDraft, GuestRepository, LockRepository,
    RsvpCount,
};
use crate::error::{AppError, AppResult};
use crate::services::hooks::{PostCommit, PostCommitHub};
use crate::services::mailer::Mailer;
use crate::services::rsvp;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvitationRequest {
    pub subject: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryResult {
    pub guest: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvitationReport {
    pub message: String,
    pub sent: Vec<DeliveryResult>,
    pub failed: Vec<DeliveryResult>,
    pub total: usize,
}

/// Guest list management. RSVP changes are announced on the post-commit hub.
pub struct GuestService<'a> {
    pool: &'a SqlitePool,
    hooks: &'a PostCommitHub,
}

impl<'a> GuestService<'a> {
    pub fn new(pool: &'a SqlitePool, hooks: &'a PostCommitHub) -> Self {
        Self { pool, hooks }
    }

    async fn owned_event(&self, owner_id: &str, event_id: &str) -> AppResult<Event> {
        EventRepository::find_for_owner(self.pool, event_id, owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
    }

    pub async fn list_for_event(&self, owner_id: &str, event_id: &str) -> AppResult<Vec<Guest>> {
        self.owned_event(owner_id, event_id).await?;
        GuestRepository::list_for_event(self.pool, event_id).await
    }

    pub async fn rsvp_stats(&self, owner_id: &str, event_id: &str) -> AppResult<Vec<RsvpCount>> {
        self.owned_event(owner_id, event_id).await?;
        GuestRepository::rsvp_counts(self.pool, event_id).await
    }

    pub async fn get(&self, owner_id: &str, guest_id: &str) -> AppResult<Guest> {
        GuestRepository::find_for_owner(self.pool, guest_id, owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Guest not found".to_string()))
    }

    pub async fn create(&self, owner_id: &str, draft: GuestDraft) -> AppResult<Guest> {
        if draft.event_id.trim().is_empty() {
            return Err(AppError::Validation("Event ID is required".to_string()));
        }
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }

        self.owned_event(owner_id, draft.event_id.trim()).await?;

        let guest = Guest {
            id: uuid::Uuid::new_v4().to_string(),
            event_id: draft.event_id.trim().to_string(),
            name: name.to_string(),
            email: draft.email,
            phone: draft.phone,
            rsvp_status: draft.rsvp_status.unwrap_or_default(),
            dietary_restrictions: draft.dietary_restrictions,
            created_at: Utc::now(),
        };

        GuestRepository::create(self.pool, &guest).await
    }

    /// Apply a partial update. Once it is stored, an RSVP change for a guest
    /// with an email address publishes exactly one notice.
    ///
    /// Updates of one guest are serialized on the guest's lock row, so
    /// concurrent identical changes see each other's result.
    pub async fn update(
        &self,
        owner_id: &str,
        guest_id: &str,
        changes: GuestChanges,
    ) -> AppResult<Guest> {
        let mut tx = self.pool.begin().await?;
        LockRepository::claim(&mut *tx, &guest_key(guest_id)).await?;

        let current = GuestRepository::find_for_owner(&mut *tx, guest_id, owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Guest not found".to_string()))?;
        let event = EventRepository::find_for_owner(&mut *tx, &current.event_id, owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
        let previous = current.rsvp_status;

        let mut next = current;
        if let Some(name) = changes.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(AppError::Validation("Name is required".to_string()));
            }
            next.name = name.to_string();
        }
        if let Some(email) = changes.email {
            next.email = email;
        }
        if let Some(phone) = changes.phone {
            next.phone = phone;
        }
        if let Some(status) = changes.rsvp_status {
            next.rsvp_status = status;
        }
        if let Some(dietary) = changes.dietary_restrictions {
            next.dietary_restrictions = dietary;
        }

        let updated = GuestRepository::update(&mut *tx, &next).await?;
        tx.commit().await?;

        if let Some(notice) = rsvp::notice_for_update(previous, &updated, &event) {
            tracing::debug!(
                "RSVP of guest {} changed {} -> {}",
                updated.id,
                previous.as_str(),
                updated.rsvp_status.as_str()
            );
            self.hooks.publish(PostCommit::RsvpChanged(notice));
        }

        Ok(updated)
    }

    pub async fn delete(&self, owner_id: &str, guest_id: &str) -> AppResult<()> {
        self.get(owner_id, guest_id).await?;
        GuestRepository::delete(self.pool, guest_id).await?;
        Ok(())
    }

    /// Email an invitation to every guest of the event with an address.
    ///
    /// Individual delivery failures are reported, never raised.
    pub async fn send_invitations(
        &self,
        owner_id: &str,
        event_id: &str,
        request: InvitationRequest,
        mailer: &dyn Mailer,
    ) -> AppResult<InvitationReport> {
        let event = self.owned_event(owner_id, event_id).await?;
        let guests = GuestRepository::list_reachable(self.pool, event_id).await?;
        if guests.is_empty() {
            return Err(AppError::Validation(
                "No guests with email addresses found".to_string(),
            ));
        }

        let mut sent = Vec::new();
        let mut failed = Vec::new();

        for guest in &guests {
            let Some(email) = guest.deliverable_email() else {
                continue;
            };
            let message = rsvp::invitation_email(
                guest,
                email,
                &event,
                request.subject.as_deref(),
                request.message.as_deref(),
            );

            match mailer.send(&message).await {
                Ok(()) => sent.push(DeliveryResult {
                    guest: guest.name.clone(),
                    email: email.to_string(),
                    error: None,
                }),
                Err(e) => {
                    tracing::warn!("Failed to send invitation to {}: {}", email, e);
                    failed.push(DeliveryResult {
                        guest: guest.name.clone(),
                        email: email.to_string(),
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        tracing::info!(
            "Invitations for event {}: {} sent, {} failed",
            event_id,
            sent.len(),
            failed.len()
        );

        Ok(InvitationReport {
            message: "Email sending completed".to_string(),
            sent,
            failed,
            total: guests.len(),
        })
    }
}
