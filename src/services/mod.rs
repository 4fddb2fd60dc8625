//! Services module
//!
//! This module contains business logic services

pub mod notification;
pub mod participation;

// Re-export commonly used services
pub use notification::{NotificationKind, NotificationService, PushRequest};
pub use participation::{CleanupReport, ParticipationService};

use std::sync::Arc;

use crate::config::settings::Settings;
use crate::database::repositories::{EventRepository, UserRepository};
use crate::utils::errors::Result;

/// Service factory for creating and managing all services
#[derive(Clone)]
pub struct ServiceFactory {
    pub participation_service: ParticipationService,
    pub notification_service: NotificationService,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(
        settings: Settings,
        event_repository: EventRepository,
        user_repository: UserRepository,
    ) -> Result<Self> {
        let notification_service = NotificationService::new(settings)?;
        let participation_service = ParticipationService::new(
            Arc::new(event_repository),
            Arc::new(user_repository),
            notification_service.clone(),
        );

        Ok(Self {
            participation_service,
            notification_service,
        })
    }
}
