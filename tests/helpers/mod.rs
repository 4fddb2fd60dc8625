//! Shared test infrastructure
//!
//! In-memory implementations of the store contracts so ledger flows can
//! be exercised end to end without a database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use gatherly::config::Settings;
use gatherly::database::store::{EventStore, ProfileStore};
use gatherly::models::{
    CreateEventRequest, Event, Location, Participant, UserProfile,
};
use gatherly::services::{NotificationService, ParticipationService};
use gatherly::Result;

/// In-memory event store with a revision-checked participant write,
/// matching the compare-and-set contract of the Postgres repository.
#[derive(Default)]
pub struct MemoryEventStore {
    events: Mutex<HashMap<i64, Event>>,
    next_id: AtomicI64,
    writes: AtomicUsize,
    /// Number of upcoming CAS attempts that will be reported as lost
    forced_cas_failures: AtomicU32,
}

impl MemoryEventStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicI64::new(1),
            ..Default::default()
        })
    }

    pub fn get(&self, id: i64) -> Option<Event> {
        self.events.lock().unwrap().get(&id).cloned()
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn fail_next_cas(&self, attempts: u32) {
        self.forced_cas_failures.store(attempts, Ordering::SeqCst);
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn create(&self, request: CreateEventRequest, creator: Participant) -> Result<Event> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let event = Event {
            id,
            title: request.title,
            description: request.description,
            start_time: request.start_time,
            duration_minutes: request.duration_minutes,
            capacity: request.capacity,
            location: request.location,
            image_url: request.image_url,
            created_by: request.created_by,
            participants: vec![creator],
            revision: 1,
            created_at: now,
            updated_at: now,
        };
        self.events.lock().unwrap().insert(id, event.clone());
        Ok(event)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Event>> {
        Ok(self.events.lock().unwrap().get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Event>> {
        Ok(self.events.lock().unwrap().values().cloned().collect())
    }

    async fn list_by_creator(&self, creator_id: &str) -> Result<Vec<Event>> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.created_by == creator_id)
            .cloned()
            .collect())
    }

    async fn update_participants(
        &self,
        id: i64,
        expected_revision: i64,
        participants: &[Participant],
    ) -> Result<bool> {
        if self.forced_cas_failures.load(Ordering::SeqCst) > 0 {
            self.forced_cas_failures.fetch_sub(1, Ordering::SeqCst);
            return Ok(false);
        }

        let mut events = self.events.lock().unwrap();
        match events.get_mut(&id) {
            Some(event) if event.revision == expected_revision => {
                event.participants = participants.to_vec();
                event.revision += 1;
                event.updated_at = Utc::now();
                self.writes.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// In-memory profile directory
#[derive(Default)]
pub struct MemoryProfileStore {
    profiles: Mutex<HashMap<String, UserProfile>>,
}

impl MemoryProfileStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn insert(&self, id: &str, name: &str, photo_url: Option<&str>) {
        self.profiles.lock().unwrap().insert(
            id.to_string(),
            UserProfile {
                id: id.to_string(),
                name: name.to_string(),
                photo_url: photo_url.map(str::to_string),
            },
        );
    }
}

#[async_trait]
impl ProfileStore for MemoryProfileStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        Ok(self.profiles.lock().unwrap().get(user_id).cloned())
    }
}

pub struct TestContext {
    pub events: Arc<MemoryEventStore>,
    pub profiles: Arc<MemoryProfileStore>,
    pub service: ParticipationService,
}

/// Build a ledger over in-memory stores. Push is disabled unless a
/// gateway URL is given.
pub fn test_context(push_url: Option<&str>) -> TestContext {
    let mut settings = Settings::default();
    if let Some(url) = push_url {
        settings.push.enabled = true;
        settings.push.api_url = url.to_string();
    }

    let events = MemoryEventStore::new();
    let profiles = MemoryProfileStore::new();
    let notifications = NotificationService::new(settings).expect("failed to build dispatcher");
    let service = ParticipationService::new(events.clone(), profiles.clone(), notifications);

    TestContext {
        events,
        profiles,
        service,
    }
}

pub fn test_location() -> Location {
    Location {
        latitude: 52.52,
        longitude: 13.40,
        address: "Mauerpark".to_string(),
        detail: Some("north entrance".to_string()),
    }
}

pub fn create_request(creator_id: &str, start_time: DateTime<Utc>, capacity: Option<i32>) -> CreateEventRequest {
    CreateEventRequest {
        title: "Sunday picnic".to_string(),
        description: Some("Bring snacks".to_string()),
        start_time,
        duration_minutes: Some(120),
        capacity,
        location: test_location(),
        image_url: None,
        created_by: creator_id.to_string(),
    }
}

pub fn upcoming_start() -> DateTime<Utc> {
    Utc::now() + Duration::days(3)
}

pub fn past_start() -> DateTime<Utc> {
    Utc::now() - Duration::days(3)
}
