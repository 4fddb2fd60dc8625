//! Data models module
//!
//! This module contains all data structures used throughout the application

pub mod event;
pub mod user;

// Re-export commonly used models
pub use event::{
    is_guest_id, synthesize_guest_id, CreateEventRequest, Event, Location, Participant,
    ParticipantKind, ParticipantStatus, GUEST_ID_PREFIX, MIN_CAPACITY,
};
pub use user::{CreateUserRequest, User, UserProfile};
