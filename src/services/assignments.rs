use sqlx::SqlitePool;

use crate::db::repository::lock::vendor_key;
use crate::db::{
    now_millis, Assignment, AssignmentDraft, AssignmentRepository, AssignmentStatus,
    EventRepository, LockRepository, VendorRepository,
};
use crate::error::{AppError, AppResult};
use crate::scheduling::check_vendor_conflict;

/// Vendor assignments guarded against vendor double-booking.
pub struct AssignmentService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> AssignmentService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Book a vendor for one of the owner's events.
    ///
    /// Assigning a vendor already on the event revises that assignment instead
    /// of adding a second one.
    pub async fn assign_vendor(&self, owner_id: &str, draft: AssignmentDraft) -> AppResult<Assignment> {
        let event_id = draft.event_id.trim();
        let vendor_id = draft.vendor_id.trim();
        if event_id.is_empty() || vendor_id.is_empty() {
            return Err(AppError::Validation(
                "Event ID and Vendor ID are required".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        LockRepository::claim(&mut *tx, &vendor_key(vendor_id)).await?;

        let event = EventRepository::find_for_owner(&mut *tx, event_id, owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        if VendorRepository::find_by_id(&mut *tx, vendor_id).await?.is_none() {
            return Err(AppError::NotFound("Vendor not found".to_string()));
        }

        let existing =
            AssignmentRepository::find_by_event_and_vendor(&mut *tx, event_id, vendor_id).await?;
        let exclude = existing.as_ref().map(|a| a.id.as_str());

        if let Some(conflict) = check_vendor_conflict(&mut tx, vendor_id, &event.window, exclude).await? {
            tracing::info!(
                "Rejected assignment of vendor {} to event {}: conflict with {}",
                vendor_id,
                event_id,
                conflict.id
            );
            return Err(AppError::vendor_conflict(conflict));
        }

        let assignment = match existing {
            Some(current) => {
                let status = draft.status.unwrap_or(current.status);
                AssignmentRepository::update_status(&mut *tx, &current.id, status).await?
            }
            None => {
                let id = uuid::Uuid::new_v4().to_string();
                AssignmentRepository::create(
                    &mut *tx,
                    &id,
                    event_id,
                    vendor_id,
                    draft.status.unwrap_or_default(),
                    now_millis(),
                )
                .await?
            }
        };
        tx.commit().await?;

        tracing::info!(
            "Vendor {} assigned to event {} ({})",
            vendor_id,
            event_id,
            assignment.id
        );
        Ok(assignment)
    }

    /// Change an assignment's status, re-checking the vendor's other bookings.
    pub async fn update_status(
        &self,
        owner_id: &str,
        assignment_id: &str,
        status: AssignmentStatus,
    ) -> AppResult<Assignment> {
        // The vendor of an assignment never changes, so it is safe to look it up
        // before the lock is taken.
        let vendor_id = AssignmentRepository::find_for_owner(self.pool, assignment_id, owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Assignment not found".to_string()))?
            .vendor_id;

        let mut tx = self.pool.begin().await?;
        LockRepository::claim(&mut *tx, &vendor_key(&vendor_id)).await?;

        let current = AssignmentRepository::find_for_owner(&mut *tx, assignment_id, owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Assignment not found".to_string()))?;
        let event = EventRepository::find_for_owner(&mut *tx, &current.event_id, owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;

        if let Some(conflict) =
            check_vendor_conflict(&mut tx, &vendor_id, &event.window, Some(assignment_id)).await?
        {
            return Err(AppError::vendor_conflict(conflict));
        }

        let assignment = AssignmentRepository::update_status(&mut *tx, assignment_id, status).await?;
        tx.commit().await?;

        Ok(assignment)
    }

    pub async fn remove(&self, owner_id: &str, assignment_id: &str) -> AppResult<()> {
        if !AssignmentRepository::delete(self.pool, assignment_id, owner_id).await? {
            return Err(AppError::NotFound("Assignment not found".to_string()));
        }
        tracing::info!("Removed assignment {}", assignment_id);
        Ok(())
    }
}
