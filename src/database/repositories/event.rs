//! Event repository implementation
//!
//! Events are stored as one row per event with the participant
//! collection held in a JSONB column, mirroring the document shape the
//! mobile client reads. The `revision` column backs the compare-and-set
//! discipline of the participation ledger.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::database::store::EventStore;
use crate::models::{CreateEventRequest, Event, Participant};
use crate::utils::errors::Result;

const EVENT_COLUMNS: &str = "id, title, description, start_time, duration_minutes, capacity, location, image_url, created_by, participants, revision, created_at, updated_at";

#[derive(Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for EventRepository {
    /// Create a new event with the creator as its first participant
    async fn create(&self, request: CreateEventRequest, creator: Participant) -> Result<Event> {
        let participants = vec![creator];
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (title, description, start_time, duration_minutes, capacity, location, image_url, created_by, participants, revision, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 1, $10, $11)
            RETURNING id, title, description, start_time, duration_minutes, capacity, location, image_url, created_by, participants, revision, created_at, updated_at
            "#
        )
        .bind(request.title)
        .bind(request.description)
        .bind(request.start_time)
        .bind(request.duration_minutes)
        .bind(request.capacity)
        .bind(Json(request.location))
        .bind(request.image_url)
        .bind(request.created_by)
        .bind(Json(participants))
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(event)
    }

    /// Find event by ID
    async fn find_by_id(&self, id: i64) -> Result<Option<Event>> {
        let event = sqlx::query_as::<_, Event>(
            &format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1")
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }

    /// List all events, soonest first
    async fn list_all(&self) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            &format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY start_time ASC")
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// List events created by one user
    async fn list_by_creator(&self, creator_id: &str) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            &format!("SELECT {EVENT_COLUMNS} FROM events WHERE created_by = $1 ORDER BY start_time ASC")
        )
        .bind(creator_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    /// Compare-and-set write of the participant collection. Returns
    /// false when the stored revision no longer matches.
    async fn update_participants(
        &self,
        id: i64,
        expected_revision: i64,
        participants: &[Participant],
    ) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET participants = $3,
                revision = revision + 1,
                updated_at = $4
            WHERE id = $1 AND revision = $2
            "#,
        )
        .bind(id)
        .bind(expected_revision)
        .bind(Json(participants))
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
