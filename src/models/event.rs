//! Event and participant models

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Reserved prefix for synthesized non-user participant identifiers
pub const GUEST_ID_PREFIX: &str = "guest:";

/// Smallest capacity an event may declare when capacity is set
pub const MIN_CAPACITY: i32 = 2;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub detail: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantKind {
    User,
    NonUser,
}

/// Status of a user participant. `None` on the entry means implicit
/// confirmed (the creator on legacy records). Rejection and decline
/// delete the entry, so there is no terminal rejected value here.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ParticipantStatus {
    Pending,
    Accepted,
    Invited,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Participant {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub kind: ParticipantKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ParticipantStatus>,
}

impl Participant {
    /// Build the creator's entry. The creator is stored with an explicit
    /// Accepted status; `None` is still honored as confirmed when reading
    /// legacy records.
    pub fn creator(user_id: impl Into<String>, name: impl Into<String>, photo_url: Option<String>) -> Self {
        Self {
            id: user_id.into(),
            name: name.into(),
            photo_url,
            kind: ParticipantKind::User,
            status: Some(ParticipantStatus::Accepted),
        }
    }

    pub fn invited(user_id: impl Into<String>, name: impl Into<String>, photo_url: Option<String>) -> Self {
        Self {
            id: user_id.into(),
            name: name.into(),
            photo_url,
            kind: ParticipantKind::User,
            status: Some(ParticipantStatus::Invited),
        }
    }

    pub fn pending(user_id: impl Into<String>, name: impl Into<String>, photo_url: Option<String>) -> Self {
        Self {
            id: user_id.into(),
            name: name.into(),
            photo_url,
            kind: ParticipantKind::User,
            status: Some(ParticipantStatus::Pending),
        }
    }

    /// Build a non-user guest entry with a synthesized identifier.
    pub fn guest(name: impl Into<String>) -> Self {
        Self {
            id: synthesize_guest_id(),
            name: name.into(),
            photo_url: None,
            kind: ParticipantKind::NonUser,
            status: None,
        }
    }

    /// Confirmed means counted against capacity for display purposes:
    /// accepted entries, guests, and legacy status-less user entries.
    pub fn is_confirmed(&self) -> bool {
        match self.status {
            None | Some(ParticipantStatus::Accepted) => true,
            Some(ParticipantStatus::Pending) | Some(ParticipantStatus::Invited) => false,
        }
    }

    /// Pending and invited entries are transient and purged once the
    /// event has ended.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.status,
            Some(ParticipantStatus::Pending) | Some(ParticipantStatus::Invited)
        )
    }
}

/// Synthesize a stable identifier for a non-user guest, distinguishable
/// from real user identifiers by its reserved prefix.
pub fn synthesize_guest_id() -> String {
    format!("{}{}", GUEST_ID_PREFIX, Uuid::new_v4())
}

/// Check whether a participant identifier denotes a synthesized guest.
pub fn is_guest_id(id: &str) -> bool {
    id.starts_with(GUEST_ID_PREFIX)
}

#[derive(Debug, Clone, FromRow)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: Option<i32>,
    pub capacity: Option<i32>,
    #[sqlx(json)]
    pub location: Location,
    pub image_url: Option<String>,
    pub created_by: String,
    #[sqlx(json)]
    pub participants: Vec<Participant>,
    pub revision: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// End time of the event: start plus duration, or the start itself
    /// when no duration is set.
    pub fn end_time(&self) -> DateTime<Utc> {
        match self.duration_minutes {
            Some(minutes) => self.start_time + Duration::minutes(minutes as i64),
            None => self.start_time,
        }
    }

    /// An event has ended once its end time lies strictly in the past.
    pub fn has_ended(&self, now: DateTime<Utc>) -> bool {
        self.end_time() < now
    }

    /// Number of confirmed participants, the numerator of the
    /// `confirmed/capacity` display.
    pub fn confirmed_count(&self) -> usize {
        self.participants.iter().filter(|p| p.is_confirmed()).count()
    }

    /// Number of pending join requests awaiting a creator decision.
    pub fn pending_request_count(&self) -> usize {
        self.participants
            .iter()
            .filter(|p| p.status == Some(ParticipantStatus::Pending))
            .count()
    }

    pub fn find_participant(&self, participant_id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == participant_id)
    }

    pub fn is_participant(&self, participant_id: &str) -> bool {
        self.find_participant(participant_id).is_some()
    }

    /// True when capacity is set and the raw participant count has
    /// reached it. All admission paths check this before appending.
    pub fn is_full(&self) -> bool {
        match self.capacity {
            Some(capacity) => self.participants.len() >= capacity as usize,
            None => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: Option<i32>,
    pub capacity: Option<i32>,
    pub location: Location,
    pub image_url: Option<String>,
    pub created_by: String,
}
