use sqlx::SqlitePool;

use crate::db::repository::lock::{event_key, venue_key};
use crate::db::{
    now_millis, Event, EventDraft, EventFields, EventRepository, LockRepository, VenueRepository,
};
use crate::error::{AppError, AppResult};
use crate::scheduling::{check_venue_conflict, TimeWindow};

/// Check a submitted event and turn it into writable fields.
pub fn validate_event(draft: EventDraft) -> AppResult<EventFields> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Title is required".to_string()));
    }

    let event_type = draft.event_type.trim();
    if event_type.is_empty() {
        return Err(AppError::Validation("Event type is required".to_string()));
    }

    let (Some(start), Some(end)) = (draft.start_date, draft.end_date) else {
        return Err(AppError::Validation(
            "Start date and end date are required".to_string(),
        ));
    };

    let window = TimeWindow::new(start, end).map_err(|_| {
        AppError::Validation("Start date must not be after end date".to_string())
    })?;

    let venue_id = draft
        .venue_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty());

    Ok(EventFields {
        title: title.to_string(),
        description: draft.description,
        event_type: event_type.to_string(),
        window,
        venue_id,
        status: draft.status.unwrap_or_default(),
    })
}

/// Owner-scoped event operations guarded against venue double-booking.
pub struct EventService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> EventService<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, owner_id: &str) -> AppResult<Vec<Event>> {
        EventRepository::list_for_owner(self.pool, owner_id).await
    }

    pub async fn get(&self, owner_id: &str, event_id: &str) -> AppResult<Event> {
        EventRepository::find_for_owner(self.pool, event_id, owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
    }

    pub async fn create(&self, owner_id: &str, draft: EventDraft) -> AppResult<Event> {
        let fields = validate_event(draft)?;
        let id = uuid::Uuid::new_v4().to_string();

        let mut tx = self.pool.begin().await?;

        if let Some(ref venue_id) = fields.venue_id {
            LockRepository::claim(&mut *tx, &venue_key(venue_id)).await?;
            ensure_venue_exists(&mut tx, venue_id).await?;
        }

        if let Some(conflict) =
            check_venue_conflict(&mut tx, fields.venue_id.as_deref(), &fields.window, None).await?
        {
            tracing::info!(
                "Rejected event for owner {}: venue conflict with {}",
                owner_id,
                conflict.id
            );
            return Err(AppError::venue_conflict(conflict));
        }

        let event = EventRepository::create(&mut *tx, &id, owner_id, &fields, now_millis()).await?;
        tx.commit().await?;

        tracing::info!("Created event {} for owner {}", event.id, owner_id);
        Ok(event)
    }

    /// Replace an event's fields. The event never conflicts with itself.
    pub async fn update(
        &self,
        owner_id: &str,
        event_id: &str,
        draft: EventDraft,
    ) -> AppResult<Event> {
        let fields = validate_event(draft)?;

        let mut tx = self.pool.begin().await?;

        let lock = match fields.venue_id {
            Some(ref venue_id) => venue_key(venue_id),
            None => event_key(event_id),
        };
        LockRepository::claim(&mut *tx, &lock).await?;

        if EventRepository::find_for_owner(&mut *tx, event_id, owner_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("Event not found".to_string()));
        }

        if let Some(ref venue_id) = fields.venue_id {
            ensure_venue_exists(&mut tx, venue_id).await?;
        }

        if let Some(conflict) = check_venue_conflict(
            &mut tx,
            fields.venue_id.as_deref(),
            &fields.window,
            Some(event_id),
        )
        .await?
        {
            tracing::info!(
                "Rejected update of event {}: venue conflict with {}",
                event_id,
                conflict.id
            );
            return Err(AppError::venue_conflict(conflict));
        }

        let event = EventRepository::update(&mut *tx, event_id, owner_id, &fields)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))?;
        tx.commit().await?;

        tracing::info!("Updated event {}", event.id);
        Ok(event)
    }

    /// Delete an event with its guests, tasks and vendor assignments.
    pub async fn delete(&self, owner_id: &str, event_id: &str) -> AppResult<()> {
        if !EventRepository::delete(self.pool, event_id, owner_id).await? {
            return Err(AppError::NotFound("Event not found".to_string()));
        }
        tracing::info!("Deleted event {}", event_id);
        Ok(())
    }
}

async fn ensure_venue_exists(conn: &mut sqlx::SqliteConnection, venue_id: &str) -> AppResult<()> {
    VenueRepository::find_by_id(&mut *conn, venue_id)
        .await?
        .map(|_| ())
        .ok_or_else(|| AppError::NotFound("Venue not found".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{AssignmentRepository, AssignmentStatus, EventStatus, GuestRepository, TaskRepository};
    use crate::test_support::{
        at, draft, file_pool, insert_event, memory_pool, window, VENDOR_CATERING, VENUE_BALLROOM,
        VENUE_GARDEN,
    };

    #[test]
    fn validation_rejects_missing_fields() {
        let mut d = draft("Gala", Some(VENUE_BALLROOM), 0, 10);
        d.title = "   ".to_string();
        assert!(matches!(validate_event(d), Err(AppError::Validation(_))));

        let mut d = draft("Gala", None, 0, 10);
        d.event_type = String::new();
        assert!(matches!(validate_event(d), Err(AppError::Validation(_))));

        let mut d = draft("Gala", None, 0, 10);
        d.end_date = None;
        assert!(matches!(validate_event(d), Err(AppError::Validation(_))));

        let d = draft("Gala", None, 10, 0);
        assert!(matches!(validate_event(d), Err(AppError::Validation(_))));
    }

    #[test]
    fn validation_normalizes_blank_venue_and_defaults_status() {
        let mut d = draft("Gala", Some(" "), 0, 10);
        d.status = None;
        let fields = validate_event(d).unwrap();
        assert_eq!(fields.venue_id, None);
        assert_eq!(fields.status, EventStatus::Planning);
        assert_eq!(fields.window, window(0, 10));
    }

    #[tokio::test]
    async fn create_rejects_overlapping_venue_booking() {
        let pool = memory_pool().await;
        let service = EventService::new(&pool);

        let first = service
            .create("owner-a", draft("Wedding", Some(VENUE_BALLROOM), 1_000, 5_000))
            .await
            .unwrap();

        // A different owner collides on the shared venue.
        let err = service
            .create("owner-b", draft("Conference", Some(VENUE_BALLROOM), 5_000, 9_000))
            .await
            .unwrap_err();
        match err {
            AppError::BookingConflict { event, .. } => {
                assert_eq!(event.id, first.id);
                assert_eq!(event.title, "Wedding");
                assert_eq!(event.window, window(1_000, 5_000));
            }
            other => panic!("expected booking conflict, got {:?}", other),
        }

        assert_eq!(service.list("owner-b").await.unwrap().len(), 0);

        service
            .create("owner-b", draft("Conference", Some(VENUE_BALLROOM), 5_001, 9_000))
            .await
            .unwrap();
        service
            .create("owner-b", draft("Picnic", Some(VENUE_GARDEN), 1_000, 5_000))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn create_rejects_unknown_venue() {
        let pool = memory_pool().await;
        let service = EventService::new(&pool);

        let err = service
            .create("owner-a", draft("Gala", Some("no-such-venue"), 0, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn events_without_venue_never_conflict() {
        let pool = memory_pool().await;
        let service = EventService::new(&pool);

        for _ in 0..3 {
            service
                .create("owner-a", draft("Online meetup", None, 0, 100))
                .await
                .unwrap();
        }
        assert_eq!(service.list("owner-a").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn update_does_not_conflict_with_itself() {
        let pool = memory_pool().await;
        let service = EventService::new(&pool);

        let event = service
            .create("owner-a", draft("Wedding", Some(VENUE_BALLROOM), 1_000, 5_000))
            .await
            .unwrap();

        let mut changed = draft("Wedding reception", Some(VENUE_BALLROOM), 2_000, 6_000);
        changed.status = Some(EventStatus::Confirmed);
        let updated = service.update("owner-a", &event.id, changed).await.unwrap();
        assert_eq!(updated.title, "Wedding reception");
        assert_eq!(updated.status, EventStatus::Confirmed);
        assert_eq!(updated.window.start(), at(2_000));
        assert_eq!(updated.created_at, event.created_at);
    }

    #[tokio::test]
    async fn update_rejects_move_onto_booked_window() {
        let pool = memory_pool().await;
        let service = EventService::new(&pool);

        let booked = service
            .create("owner-a", draft("Wedding", Some(VENUE_BALLROOM), 1_000, 5_000))
            .await
            .unwrap();
        let movable = service
            .create("owner-a", draft("Gala", Some(VENUE_GARDEN), 1_000, 5_000))
            .await
            .unwrap();

        let err = service
            .update("owner-a", &movable.id, draft("Gala", Some(VENUE_BALLROOM), 4_000, 8_000))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BookingConflict { ref event, .. } if event.id == booked.id));

        let unchanged = service.get("owner-a", &movable.id).await.unwrap();
        assert_eq!(unchanged.venue_id.as_deref(), Some(VENUE_GARDEN));
    }

    #[tokio::test]
    async fn other_owners_cannot_touch_an_event() {
        let pool = memory_pool().await;
        let service = EventService::new(&pool);
        let event = insert_event(&pool, "owner-a", None, window(0, 10)).await;

        assert!(matches!(
            service.get("owner-b", &event.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.update("owner-b", &event.id, draft("x", None, 0, 10)).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.delete("owner-b", &event.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(service.get("owner-a", &event.id).await.is_ok());
    }

    #[tokio::test]
    async fn delete_cascades_to_dependents() {
        let pool = memory_pool().await;
        let service = EventService::new(&pool);
        let event = insert_event(&pool, "owner-a", Some(VENUE_BALLROOM), window(0, 10)).await;

        AssignmentRepository::create(&pool, "asg", &event.id, VENDOR_CATERING, AssignmentStatus::Pending, 0)
            .await
            .unwrap();
        sqlx::query("INSERT INTO guests (id, event_id, name, created_at) VALUES ('g1', ?, 'Ada', 0)")
            .bind(&event.id)
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO tasks (id, event_id, title, created_at) VALUES ('t1', ?, 'Book DJ', 0)")
            .bind(&event.id)
            .execute(&pool)
            .await
            .unwrap();

        service.delete("owner-a", &event.id).await.unwrap();

        assert!(GuestRepository::list_for_event(&pool, &event.id).await.unwrap().is_empty());
        assert!(TaskRepository::list_for_event(&pool, &event.id).await.unwrap().is_empty());
        assert!(AssignmentRepository::vendor_bookings(&pool, VENDOR_CATERING, None)
            .await
            .unwrap()
            .is_empty());

        // The venue is free again.
        service
            .create("owner-b", draft("Next", Some(VENUE_BALLROOM), 0, 10))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn trigger_rejects_raw_overlapping_insert() {
        let pool = memory_pool().await;
        insert_event(&pool, "owner-a", Some(VENUE_BALLROOM), window(0, 100)).await;

        let fields = validate_event(draft("Sneaky", Some(VENUE_BALLROOM), 100, 200)).unwrap();
        let err = EventRepository::create(&pool, "raw", "owner-b", &fields, 0)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_overlapping_creates_admit_exactly_one() {
        let dir = tempfile::tempdir().unwrap();
        let pool = file_pool(&dir.path().join("race.db")).await;

        let mut handles = Vec::new();
        for i in 0..8 {
            let pool = pool.clone();
            handles.push(tokio::spawn(async move {
                EventService::new(&pool)
                    .create(
                        &format!("owner-{}", i),
                        draft(&format!("Party {}", i), Some(VENUE_BALLROOM), i * 10, 1_000 + i * 10),
                    )
                    .await
            }));
        }

        let mut created = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(AppError::BookingConflict { .. }) | Err(AppError::Conflict(_)) => {}
                Err(other) => panic!("unexpected error: {:?}", other),
            }
        }
        assert_eq!(created, 1);

        let (stored,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events WHERE venue_id = ?")
            .bind(VENUE_BALLROOM)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(stored, 1);
    }
}
