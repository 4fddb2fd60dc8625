//! Store contracts for the participation ledger
//!
//! The ledger mutates one shared resource, an event's participant
//! collection, through a read-modify-write cycle. These traits are the
//! boundary to the persistent store; the Postgres repositories implement
//! them in production and tests substitute an in-memory store.

use async_trait::async_trait;

use crate::models::{CreateEventRequest, Event, Participant, UserProfile};
use crate::utils::errors::Result;

/// Event document access: get-by-id, enumeration, and a compare-and-set
/// write of the participant collection.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn create(&self, request: CreateEventRequest, creator: Participant) -> Result<Event>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Event>>;

    async fn list_all(&self) -> Result<Vec<Event>>;

    async fn list_by_creator(&self, creator_id: &str) -> Result<Vec<Event>>;

    /// Replace the participant collection if the stored revision still
    /// matches `expected_revision`. Returns false when another writer
    /// got there first; the caller re-reads and retries.
    async fn update_participants(
        &self,
        id: i64,
        expected_revision: i64,
        participants: &[Participant],
    ) -> Result<bool>;
}

/// Best-effort profile lookup used to populate participant display
/// fields. A missing profile never blocks a transition.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>>;
}
