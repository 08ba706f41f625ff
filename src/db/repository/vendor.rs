use sqlx::SqliteExecutor;

use crate::db::models::{AssignedVendor, Vendor, VendorDraft};
use crate::db::map_write_error;
use crate::error::{AppError, AppResult};

// ============================================================================
// Vendor Repository
// ============================================================================

pub struct VendorRepository;

impl VendorRepository {
    /// Insert a vendor. The draft is expected to be validated already.
    pub async fn create<'e, E>(
        exec: E,
        id: &str,
        draft: &VendorDraft,
        created_at: i64,
    ) -> AppResult<Vendor>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Vendor>(
            r#"
            INSERT INTO vendors (
                id, name, vendor_type, contact_email, contact_phone,
                service_description, price_range, rating, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(draft.name.trim())
        .bind(draft.vendor_type.trim())
        .bind(&draft.contact_email)
        .bind(&draft.contact_phone)
        .bind(&draft.service_description)
        .bind(&draft.price_range)
        .bind(draft.rating.unwrap_or(0.0))
        .bind(created_at)
        .fetch_one(exec)
        .await
        .map_err(|e| map_write_error(e, "vendor"))
    }

    pub async fn find_by_id<'e, E>(exec: E, id: &str) -> AppResult<Option<Vendor>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Vendor>("SELECT * FROM vendors WHERE id = ?")
            .bind(id)
            .fetch_optional(exec)
            .await
            .map_err(AppError::Database)
    }

    /// Best rated first, optionally restricted to one category.
    pub async fn list<'e, E>(exec: E, vendor_type: Option<&str>) -> AppResult<Vec<Vendor>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, Vendor>(
            r#"
            SELECT * FROM vendors
            WHERE (? IS NULL OR vendor_type = ?)
            ORDER BY rating DESC, name
            "#,
        )
        .bind(vendor_type)
        .bind(vendor_type)
        .fetch_all(exec)
        .await
        .map_err(AppError::Database)
    }

    pub async fn list_for_event<'e, E>(exec: E, event_id: &str) -> AppResult<Vec<AssignedVendor>>
    where
        E: SqliteExecutor<'e>,
    {
        sqlx::query_as::<_, AssignedVendor>(
            r#"
            SELECT v.*, ev.id AS assignment_id, ev.status AS assignment_status
            FROM vendors v
            INNER JOIN event_vendors ev ON v.id = ev.vendor_id
            WHERE ev.event_id = ?
            ORDER BY ev.created_at
            "#,
        )
        .bind(event_id)
        .fetch_all(exec)
        .await
        .map_err(AppError::Database)
    }
}
