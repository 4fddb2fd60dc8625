//! Participation ledger implementation
//!
//! This service owns the lifecycle of participant entries attached to an
//! event: invitations, join requests, admission decisions, guest entries,
//! capacity enforcement, and expiry cleanup of stale pending/invited
//! entries. Every transition is a single read-modify-write against the
//! event's participant collection, committed with a compare-and-set on
//! the event revision and retried a bounded number of times when a
//! concurrent writer wins the race.
//!
//! The transition rules themselves are pure functions over a snapshot of
//! the event; the service wraps them with store access, best-effort
//! profile lookups, and fire-and-forget notifications.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::database::store::{EventStore, ProfileStore};
use crate::models::{
    CreateEventRequest, Event, Participant, ParticipantStatus, UserProfile, MIN_CAPACITY,
};
use crate::services::notification::{NotificationKind, NotificationService};
use crate::utils::errors::{GatherlyError, Result};
use crate::utils::logging;

/// How many times a lost compare-and-set race is retried before the
/// operation gives up and asks the caller to retry.
const MAX_CAS_RETRIES: u32 = 3;

/// Outcome of an expiry cleanup sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub events_scanned: usize,
    pub events_pruned: usize,
    pub entries_removed: usize,
}

/// Participation ledger service
#[derive(Clone)]
pub struct ParticipationService {
    events: Arc<dyn EventStore>,
    profiles: Arc<dyn ProfileStore>,
    notifications: NotificationService,
}

impl ParticipationService {
    /// Create a new ParticipationService instance
    pub fn new(
        events: Arc<dyn EventStore>,
        profiles: Arc<dyn ProfileStore>,
        notifications: NotificationService,
    ) -> Self {
        Self {
            events,
            profiles,
            notifications,
        }
    }

    /// Create a new event. The creator becomes participant index 0 with
    /// an explicit accepted status.
    pub async fn create_event(&self, request: CreateEventRequest) -> Result<Event> {
        if request.title.trim().is_empty() {
            return Err(GatherlyError::InvalidInput("event title must not be empty".to_string()));
        }
        if let Some(capacity) = request.capacity {
            if capacity < MIN_CAPACITY {
                return Err(GatherlyError::InvalidInput(format!(
                    "event capacity must be at least {}, got {}",
                    MIN_CAPACITY, capacity
                )));
            }
        }

        let profile = self.lookup_profile(&request.created_by).await;
        let creator = Participant::creator(
            request.created_by.clone(),
            profile.as_ref().map(|p| p.name.clone()).unwrap_or_else(|| request.created_by.clone()),
            profile.and_then(|p| p.photo_url),
        );

        let event = self.events.create(request, creator).await?;
        info!(event_id = event.id, created_by = %event.created_by, "Event created");
        Ok(event)
    }

    /// Invite a user to an event. Creator-only; the invitee gets an
    /// entry with invited status and an invite notification.
    pub async fn invite_user(&self, caller_id: &str, event_id: i64, user_id: &str) -> Result<Event> {
        let profile = self.lookup_profile(user_id).await;
        let entry = Participant::invited(
            user_id,
            profile.as_ref().map(|p| p.name.clone()).unwrap_or_else(|| user_id.to_string()),
            profile.and_then(|p| p.photo_url),
        );

        let event = self
            .commit(event_id, |event| {
                ensure_creator(event, caller_id)?;
                admit(event, entry.clone())
            })
            .await?;

        logging::log_participation_action(event_id, "invite", caller_id, Some(user_id));
        self.notifications
            .notify_best_effort(
                user_id,
                NotificationKind::EventInvite,
                json!({ "event_id": event.id, "event_title": event.title, "invited_by": caller_id }),
            )
            .await;

        Ok(event)
    }

    /// Request to join an event. Self-service; appends a pending entry
    /// for the caller and notifies the creator.
    pub async fn request_to_join(&self, caller_id: &str, event_id: i64) -> Result<Event> {
        let profile = self.lookup_profile(caller_id).await;
        let entry = Participant::pending(
            caller_id,
            profile.as_ref().map(|p| p.name.clone()).unwrap_or_else(|| caller_id.to_string()),
            profile.and_then(|p| p.photo_url),
        );

        let event = self.commit(event_id, |event| admit(event, entry.clone())).await?;

        logging::log_participation_action(event_id, "request_to_join", caller_id, None);
        self.notifications
            .notify_best_effort(
                &event.created_by,
                NotificationKind::JoinRequest,
                json!({ "event_id": event.id, "event_title": event.title, "requester_id": caller_id }),
            )
            .await;

        Ok(event)
    }

    /// Accept a pending join request. Creator-only; the entry flips to
    /// accepted with a photo refresh, and the requester is notified.
    pub async fn accept_request(&self, caller_id: &str, event_id: i64, user_id: &str) -> Result<Event> {
        let profile = self.lookup_profile(user_id).await;

        let event = self
            .commit(event_id, |event| {
                ensure_creator(event, caller_id)?;
                accept_pending(event, user_id, profile.as_ref())
            })
            .await?;

        logging::log_participation_action(event_id, "accept_request", caller_id, Some(user_id));
        self.notifications
            .notify_best_effort(
                user_id,
                NotificationKind::RequestAccepted,
                json!({ "event_id": event.id, "event_title": event.title }),
            )
            .await;

        Ok(event)
    }

    /// Reject a pending join request. Creator-only; the entry is removed
    /// entirely and the requester is notified.
    pub async fn reject_request(&self, caller_id: &str, event_id: i64, user_id: &str) -> Result<Event> {
        let event = self
            .commit(event_id, |event| {
                ensure_creator(event, caller_id)?;
                remove_with_status(event, user_id, ParticipantStatus::Pending)
            })
            .await?;

        logging::log_participation_action(event_id, "reject_request", caller_id, Some(user_id));
        self.notifications
            .notify_best_effort(
                user_id,
                NotificationKind::RequestDeclined,
                json!({ "event_id": event.id, "event_title": event.title }),
            )
            .await;

        Ok(event)
    }

    /// Accept an invitation. Self-service for the invited user; name and
    /// photo are refreshed from the accepting user's current profile.
    pub async fn accept_invitation(&self, event_id: i64, user_id: &str) -> Result<Event> {
        let profile = self.lookup_profile(user_id).await;

        let event = self
            .commit(event_id, |event| accept_invited(event, user_id, profile.as_ref()))
            .await?;

        logging::log_participation_action(event_id, "accept_invitation", user_id, None);
        Ok(event)
    }

    /// Decline an invitation. Self-service; the entry is removed.
    pub async fn decline_invitation(&self, event_id: i64, user_id: &str) -> Result<Event> {
        let event = self
            .commit(event_id, |event| {
                remove_with_status(event, user_id, ParticipantStatus::Invited)
            })
            .await?;

        logging::log_participation_action(event_id, "decline_invitation", user_id, None);
        Ok(event)
    }

    /// Add a non-user guest entry. Creator-only convenience with the
    /// same capacity check as any other admission.
    pub async fn add_guest(&self, caller_id: &str, event_id: i64, name: &str) -> Result<Event> {
        if name.trim().is_empty() {
            return Err(GatherlyError::InvalidInput("guest name must not be empty".to_string()));
        }
        let entry = Participant::guest(name.trim());

        let event = self
            .commit(event_id, |event| {
                ensure_creator(event, caller_id)?;
                admit(event, entry.clone())
            })
            .await?;

        logging::log_participation_action(event_id, "add_guest", caller_id, Some(name));
        Ok(event)
    }

    /// Remove a participant by position. Creator-only host management;
    /// index 0 (the creator) is never removable.
    pub async fn remove_participant(&self, caller_id: &str, event_id: i64, index: usize) -> Result<Event> {
        let event = self
            .commit(event_id, |event| {
                ensure_creator(event, caller_id)?;
                remove_at(event, index)
            })
            .await?;

        logging::log_participation_action(event_id, "remove_participant", caller_id, None);
        Ok(event)
    }

    /// Purge stale pending/invited entries from one event, or from every
    /// event when no id is given. Idempotent: an event that has nothing
    /// to prune is not written.
    pub async fn cleanup_expired(&self, event_id: Option<i64>) -> Result<CleanupReport> {
        let mut report = CleanupReport::default();

        match event_id {
            Some(id) => {
                report.events_scanned = 1;
                let removed = self.cleanup_event(id).await?;
                if removed > 0 {
                    report.events_pruned = 1;
                    report.entries_removed = removed;
                }
            }
            None => {
                let events = self.events.list_all().await?;
                report.events_scanned = events.len();
                for event in events {
                    match self.cleanup_event(event.id).await {
                        Ok(0) => {}
                        Ok(removed) => {
                            report.events_pruned += 1;
                            report.entries_removed += removed;
                        }
                        // A sweep keeps going past events deleted under it
                        Err(GatherlyError::EventNotFound { .. }) => {}
                        Err(e) => return Err(e),
                    }
                }
            }
        }

        logging::log_cleanup_sweep(report.events_scanned, report.events_pruned, report.entries_removed);
        Ok(report)
    }

    /// Count pending join requests on an event snapshot.
    pub fn count_pending_requests(&self, event: &Event) -> usize {
        event.pending_request_count()
    }

    /// Events created by `creator_id` that have not ended and carry at
    /// least one pending join request.
    pub async fn events_with_pending_requests(&self, creator_id: &str) -> Result<Vec<Event>> {
        let now = Utc::now();
        let events = self.events.list_by_creator(creator_id).await?;

        Ok(events
            .into_iter()
            .filter(|e| !e.has_ended(now) && e.pending_request_count() > 0)
            .collect())
    }

    /// Read-modify-write loop: fetch the event, apply the transition to
    /// its participant snapshot, commit with compare-and-set.
    async fn commit<F>(&self, event_id: i64, apply: F) -> Result<Event>
    where
        F: Fn(&Event) -> Result<Vec<Participant>>,
    {
        for attempt in 0..MAX_CAS_RETRIES {
            let event = self
                .events
                .find_by_id(event_id)
                .await?
                .ok_or(GatherlyError::EventNotFound { event_id })?;

            let participants = apply(&event)?;

            if self
                .events
                .update_participants(event_id, event.revision, &participants)
                .await?
            {
                let mut updated = event;
                updated.participants = participants;
                updated.revision += 1;
                return Ok(updated);
            }

            debug!(event_id = event_id, attempt = attempt + 1, "Lost participant update race, retrying");
        }

        warn!(event_id = event_id, retries = MAX_CAS_RETRIES, "Participant update retries exhausted");
        Err(GatherlyError::ConcurrentUpdate { event_id })
    }

    /// Prune one event. Returns the number of entries removed; zero
    /// means no write was issued.
    async fn cleanup_event(&self, event_id: i64) -> Result<usize> {
        for _ in 0..MAX_CAS_RETRIES {
            let event = self
                .events
                .find_by_id(event_id)
                .await?
                .ok_or(GatherlyError::EventNotFound { event_id })?;

            if !event.has_ended(Utc::now()) {
                return Ok(0);
            }

            let retained: Vec<Participant> = event
                .participants
                .iter()
                .filter(|p| !p.is_transient())
                .cloned()
                .collect();

            let removed = event.participants.len() - retained.len();
            if removed == 0 {
                return Ok(0);
            }

            if self
                .events
                .update_participants(event_id, event.revision, &retained)
                .await?
            {
                debug!(event_id = event_id, removed = removed, "Pruned stale pending/invited entries");
                return Ok(removed);
            }
        }

        Err(GatherlyError::ConcurrentUpdate { event_id })
    }

    /// Best-effort profile lookup; lookup failures degrade to `None`.
    async fn lookup_profile(&self, user_id: &str) -> Option<UserProfile> {
        match self.profiles.get_profile(user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!(user_id = user_id, error = %e, "Profile lookup failed, continuing without snapshot");
                None
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Pure transition rules. Each takes an event snapshot and returns the new
// participant collection, or the precondition failure that forbids it.
// ---------------------------------------------------------------------------

fn ensure_creator(event: &Event, caller_id: &str) -> Result<()> {
    if event.created_by != caller_id {
        return Err(GatherlyError::PermissionDenied(format!(
            "only the creator of event {} may perform this operation",
            event.id
        )));
    }
    Ok(())
}

/// Append a new entry, enforcing the one-entry-per-identity rule and the
/// raw-length capacity policy.
fn admit(event: &Event, entry: Participant) -> Result<Vec<Participant>> {
    if event.is_participant(&entry.id) {
        return Err(GatherlyError::AlreadyParticipant {
            event_id: event.id,
            participant_id: entry.id,
        });
    }
    if event.is_full() {
        return Err(GatherlyError::CapacityExceeded {
            event_id: event.id,
            capacity: event.capacity.unwrap_or_default(),
        });
    }

    let mut participants = event.participants.clone();
    participants.push(entry);
    Ok(participants)
}

/// Pending -> accepted, with a photo refresh from the latest profile.
/// Guarded so confirmed entries never exceed capacity.
fn accept_pending(event: &Event, user_id: &str, profile: Option<&UserProfile>) -> Result<Vec<Participant>> {
    let position = find_with_status(event, user_id, ParticipantStatus::Pending)?;

    if let Some(capacity) = event.capacity {
        if event.confirmed_count() >= capacity as usize {
            return Err(GatherlyError::CapacityExceeded {
                event_id: event.id,
                capacity,
            });
        }
    }

    let mut participants = event.participants.clone();
    participants[position].status = Some(ParticipantStatus::Accepted);
    if let Some(profile) = profile {
        if profile.photo_url.is_some() {
            participants[position].photo_url = profile.photo_url.clone();
        }
    }
    Ok(participants)
}

/// Invited -> accepted, refreshing name and photo from the accepting
/// user's current identity.
fn accept_invited(event: &Event, user_id: &str, profile: Option<&UserProfile>) -> Result<Vec<Participant>> {
    let position = find_with_status(event, user_id, ParticipantStatus::Invited)?;

    if let Some(capacity) = event.capacity {
        if event.confirmed_count() >= capacity as usize {
            return Err(GatherlyError::CapacityExceeded {
                event_id: event.id,
                capacity,
            });
        }
    }

    let mut participants = event.participants.clone();
    participants[position].status = Some(ParticipantStatus::Accepted);
    if let Some(profile) = profile {
        participants[position].name = profile.name.clone();
        participants[position].photo_url = profile.photo_url.clone();
    }
    Ok(participants)
}

/// Remove the entry for `user_id` if it currently has `status`. Used by
/// reject (pending) and decline (invited); no rejected state is kept.
fn remove_with_status(event: &Event, user_id: &str, status: ParticipantStatus) -> Result<Vec<Participant>> {
    let position = find_with_status(event, user_id, status)?;

    let mut participants = event.participants.clone();
    participants.remove(position);
    Ok(participants)
}

/// Remove by position. Index 0 is the creator and is never removable.
fn remove_at(event: &Event, index: usize) -> Result<Vec<Participant>> {
    if index == 0 {
        return Err(GatherlyError::PermissionDenied(format!(
            "the creator of event {} cannot be removed",
            event.id
        )));
    }
    if index >= event.participants.len() {
        return Err(GatherlyError::ParticipantNotFound {
            event_id: event.id,
            participant_id: format!("#{}", index),
        });
    }

    let mut participants = event.participants.clone();
    participants.remove(index);
    Ok(participants)
}

fn find_with_status(event: &Event, user_id: &str, status: ParticipantStatus) -> Result<usize> {
    event
        .participants
        .iter()
        .position(|p| p.id == user_id && p.status == Some(status))
        .ok_or_else(|| GatherlyError::ParticipantNotFound {
            event_id: event.id,
            participant_id: user_id.to_string(),
        })
}
