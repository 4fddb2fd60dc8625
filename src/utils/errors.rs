//! Error handling for Gatherly
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for the Gatherly participation service
#[derive(Error, Debug)]
pub enum GatherlyError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Push gateway error: {0}")]
    PushGateway(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Event not found: {event_id}")]
    EventNotFound { event_id: i64 },

    #[error("Participant not found in event {event_id}: {participant_id}")]
    ParticipantNotFound { event_id: i64, participant_id: String },

    #[error("Already a participant of event {event_id}: {participant_id}")]
    AlreadyParticipant { event_id: i64, participant_id: String },

    #[error("Event {event_id} is at capacity ({capacity})")]
    CapacityExceeded { event_id: i64, capacity: i32 },

    #[error("Concurrent update on event {event_id}, retries exhausted")]
    ConcurrentUpdate { event_id: i64 },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for Gatherly operations
pub type Result<T> = std::result::Result<T, GatherlyError>;

impl GatherlyError {
    /// Check if the error is worth retrying the whole operation for.
    /// Precondition failures are final; transport failures are not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            GatherlyError::Database(_) => true,
            GatherlyError::Migration(_) => false,
            GatherlyError::PushGateway(_) => true,
            GatherlyError::Config(_) => false,
            GatherlyError::PermissionDenied(_) => false,
            GatherlyError::EventNotFound { .. } => false,
            GatherlyError::ParticipantNotFound { .. } => false,
            GatherlyError::AlreadyParticipant { .. } => false,
            GatherlyError::CapacityExceeded { .. } => false,
            GatherlyError::ConcurrentUpdate { .. } => true,
            GatherlyError::Serialization(_) => false,
            GatherlyError::Io(_) => true,
            GatherlyError::InvalidInput(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            GatherlyError::Database(_) => ErrorSeverity::Critical,
            GatherlyError::Migration(_) => ErrorSeverity::Critical,
            GatherlyError::Config(_) => ErrorSeverity::Critical,
            GatherlyError::PermissionDenied(_) => ErrorSeverity::Warning,
            GatherlyError::AlreadyParticipant { .. } => ErrorSeverity::Warning,
            GatherlyError::CapacityExceeded { .. } => ErrorSeverity::Warning,
            GatherlyError::InvalidInput(_) => ErrorSeverity::Info,
            _ => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
