//! Gatherly Participation Service
//!
//! Backend core of the Gatherly social events platform. This library owns
//! the participation ledger: the lifecycle of participant entries attached
//! to an event, covering invitations, join requests, admission decisions,
//! guest entries, capacity enforcement, and expiry cleanup.

pub mod config;
pub mod database;
pub mod models;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{GatherlyError, Result};

// Re-export main components for easy access
pub use database::{EventRepository, EventStore, ProfileStore, UserRepository};
pub use services::{NotificationService, ParticipationService, ServiceFactory};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
