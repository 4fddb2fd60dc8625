//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the Gatherly participation service.

use crate::config::LoggingConfig;
use crate::utils::errors::{GatherlyError, Result};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging based on configuration.
///
/// Returns the file writer's [`WorkerGuard`]; the caller must hold it
/// for the life of the process, or the background writer shuts down and
/// file logging stops.
pub fn init_logging(config: &LoggingConfig) -> Result<WorkerGuard> {
    let file_appender = tracing_appender::rolling::daily(&config.file_path, "gatherly.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .try_init()
        .map_err(|e| GatherlyError::Config(format!("failed to install tracing subscriber: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log participation transitions with structured data
pub fn log_participation_action(event_id: i64, action: &str, actor_id: &str, details: Option<&str>) {
    info!(
        event_id = event_id,
        action = action,
        actor_id = actor_id,
        details = details,
        "Participation action performed"
    );
}

/// Log expiry cleanup sweeps
pub fn log_cleanup_sweep(events_scanned: usize, events_pruned: usize, entries_removed: usize) {
    if entries_removed > 0 {
        info!(
            events_scanned = events_scanned,
            events_pruned = events_pruned,
            entries_removed = entries_removed,
            "Expiry cleanup sweep completed"
        );
    } else {
        tracing::debug!(events_scanned = events_scanned, "Expiry cleanup sweep found nothing to prune");
    }
}

/// Log push gateway failures (best-effort path, never escalated)
pub fn log_push_failure(recipient_id: &str, kind: &str, error: &str) {
    warn!(
        recipient_id = recipient_id,
        kind = kind,
        error = error,
        "Push notification dispatch failed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_logging_hands_back_a_live_writer_guard() {
        let dir = std::env::temp_dir().join(format!("gatherly-log-test-{}", std::process::id()));
        let config = LoggingConfig {
            level: "info".to_string(),
            file_path: dir.to_string_lossy().into_owned(),
        };

        let guard = init_logging(&config).expect("logging init failed");

        // Emitted while the guard is held, so the file layer must see it
        info!("file layer smoke event");

        // Dropping the guard flushes the worker; the rolling log file
        // must have received the event
        drop(guard);
        let wrote_to_file = std::fs::read_dir(&dir)
            .map(|entries| {
                entries
                    .flatten()
                    .any(|e| e.metadata().map(|m| m.len() > 0).unwrap_or(false))
            })
            .unwrap_or(false);
        assert!(wrote_to_file);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
