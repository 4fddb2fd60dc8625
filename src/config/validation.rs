//! Configuration validation

use crate::config::Settings;
use crate::utils::errors::GatherlyError;

/// Validate the loaded settings before the service starts
pub fn validate_settings(settings: &Settings) -> Result<(), GatherlyError> {
    if settings.database.url.is_empty() {
        return Err(GatherlyError::Config("database.url must not be empty".to_string()));
    }
    if !settings.database.url.starts_with("postgres") {
        return Err(GatherlyError::Config(format!(
            "database.url must be a PostgreSQL URL, got: {}",
            settings.database.url
        )));
    }
    if settings.database.min_connections > settings.database.max_connections {
        return Err(GatherlyError::Config(
            "database.min_connections must not exceed database.max_connections".to_string(),
        ));
    }

    if settings.push.enabled {
        if settings.push.api_url.is_empty() {
            return Err(GatherlyError::Config("push.api_url must not be empty when push is enabled".to_string()));
        }
        if settings.push.timeout_seconds == 0 {
            return Err(GatherlyError::Config("push.timeout_seconds must be positive".to_string()));
        }
    }

    if settings.cleanup.interval_seconds == 0 {
        return Err(GatherlyError::Config("cleanup.interval_seconds must be positive".to_string()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_are_valid() {
        let settings = Settings::default();
        assert!(validate_settings(&settings).is_ok());
    }

    #[test]
    fn rejects_non_postgres_url() {
        let mut settings = Settings::default();
        settings.database.url = "mysql://localhost/gatherly".to_string();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn rejects_zero_push_timeout_when_enabled() {
        let mut settings = Settings::default();
        settings.push.enabled = true;
        settings.push.timeout_seconds = 0;
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn rejects_zero_cleanup_interval() {
        let mut settings = Settings::default();
        settings.cleanup.interval_seconds = 0;
        assert!(validate_settings(&settings).is_err());
    }
}
