//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod event;
pub mod user;

// Re-export repositories
pub use event::EventRepository;
pub use user::UserRepository;
