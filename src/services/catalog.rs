use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::db::{
    now_millis, AssignedVendor, EventRepository, Vendor, VendorDraft, VendorRepository, Venue,
    VenueDraft, VenueRepository,
};
use crate::error::{AppError, AppResult};
use crate::scheduling::TimeWindow;

/// Shared venue and vendor catalog, visible to every owner.
pub struct CatalogService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CatalogService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list_venues(&self) -> AppResult<Vec<Venue>> {
        VenueRepository::list_all(self.pool).await
    }

    pub async fn get_venue(&self, venue_id: &str) -> AppResult<Venue> {
        VenueRepository::find_by_id(self.pool, venue_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Venue not found".to_string()))
    }

    pub async fn create_venue(&self, draft: VenueDraft) -> AppResult<Venue> {
        let name = draft.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }
        let address = draft.address.trim();
        if address.is_empty() {
            return Err(AppError::Validation("Address is required".to_string()));
        }
        let capacity = draft
            .capacity
            .filter(|c| *c >= 1)
            .ok_or_else(|| AppError::Validation("Capacity must be a positive integer".to_string()))?;
        let price = draft
            .price_per_day
            .filter(|p| p.is_finite() && *p >= 0.0)
            .ok_or_else(|| AppError::Validation("Price must be a positive number".to_string()))?;

        let venue = VenueRepository::create(
            self.pool,
            &uuid::Uuid::new_v4().to_string(),
            name,
            address,
            capacity,
            price,
            draft.amenities.as_deref(),
            draft.availability_status.unwrap_or_default(),
            now_millis(),
        )
        .await?;

        tracing::info!("Created venue {} ({})", venue.name, venue.id);
        Ok(venue)
    }

    /// Venues marked available that no event holds at any point of `[start, end]`.
    pub async fn available_venues(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> AppResult<Vec<Venue>> {
        let window = TimeWindow::new(start, end).map_err(|_| {
            AppError::Validation("Start date must not be after end date".to_string())
        })?;
        VenueRepository::list_available(self.pool, &window).await
    }

    pub async fn list_vendors(&self, vendor_type: Option<&str>) -> AppResult<Vec<Vendor>> {
        let vendor_type = vendor_type.map(str::trim).filter(|t| !t.is_empty());
        VendorRepository::list(self.pool, vendor_type).await
    }

    pub async fn get_vendor(&self, vendor_id: &str) -> AppResult<Vendor> {
        VendorRepository::find_by_id(self.pool, vendor_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Vendor not found".to_string()))
    }

    pub async fn create_vendor(&self, draft: VendorDraft) -> AppResult<Vendor> {
        if draft.name.trim().is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }
        if draft.vendor_type.trim().is_empty() {
            return Err(AppError::Validation("Vendor type is required".to_string()));
        }
        if let Some(rating) = draft.rating {
            if !(0.0..=5.0).contains(&rating) {
                return Err(AppError::Validation(
                    "Rating must be between 0 and 5".to_string(),
                ));
            }
        }

        let vendor = VendorRepository::create(
            self.pool,
            &uuid::Uuid::new_v4().to_string(),
            &draft,
            now_millis(),
        )
        .await?;

        tracing::info!("Created vendor {} ({})", vendor.name, vendor.id);
        Ok(vendor)
    }

    /// Vendors booked for one of the owner's events.
    pub async fn vendors_for_event(
        &self,
        owner_id: &str,
        event_id: &str,
    ) -> AppResult<Vec<AssignedVendor>> {
        if EventRepository::find_for_owner(self.pool, event_id, owner_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("Event not found".to_string()));
        }
        VendorRepository::list_for_event(self.pool, event_id).await
    }
}
