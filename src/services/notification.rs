//! Notification dispatcher implementation
//!
//! This service posts participation notifications to the push gateway,
//! which owns device resolution and actual delivery. Dispatch is
//! fire-and-forget: a gateway failure is logged and swallowed so it can
//! never fail the state transition that triggered it.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::config::settings::Settings;
use crate::utils::errors::{GatherlyError, Result};
use crate::utils::logging;

/// Kinds of participation notifications the ledger emits
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    EventInvite,
    JoinRequest,
    RequestAccepted,
    RequestDeclined,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::EventInvite => "event_invite",
            NotificationKind::JoinRequest => "join_request",
            NotificationKind::RequestAccepted => "request_accepted",
            NotificationKind::RequestDeclined => "request_declined",
        }
    }
}

/// Wire payload sent to the push gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushRequest {
    pub recipient_id: String,
    pub kind: NotificationKind,
    pub payload: Value,
}

/// Notification dispatcher for the push gateway
#[derive(Debug, Clone)]
pub struct NotificationService {
    client: Client,
    settings: Settings,
}

impl NotificationService {
    /// Create a new NotificationService instance
    pub fn new(settings: Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.push.timeout_seconds))
            .user_agent("Gatherly-Participation/1.0")
            .build()
            .map_err(GatherlyError::PushGateway)?;

        Ok(Self { client, settings })
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.push.enabled
    }

    /// Send a notification to one recipient. Propagates gateway errors;
    /// use [`notify_best_effort`](Self::notify_best_effort) from
    /// state-transition paths.
    pub async fn notify(&self, recipient_id: &str, kind: NotificationKind, payload: Value) -> Result<()> {
        if !self.is_enabled() {
            debug!(recipient_id = recipient_id, kind = kind.as_str(), "Push disabled, skipping notification");
            return Ok(());
        }

        let request = PushRequest {
            recipient_id: recipient_id.to_string(),
            kind,
            payload,
        };

        let mut http_request = self.client.post(&self.settings.push.api_url).json(&request);
        if let Some(api_key) = &self.settings.push.api_key {
            http_request = http_request.bearer_auth(api_key);
        }

        let response = http_request.send().await?;
        response.error_for_status()?;

        info!(recipient_id = recipient_id, kind = kind.as_str(), "Notification dispatched");
        Ok(())
    }

    /// Fire-and-forget variant used at state transitions: failures are
    /// logged, never returned.
    pub async fn notify_best_effort(&self, recipient_id: &str, kind: NotificationKind, payload: Value) {
        if let Err(e) = self.notify(recipient_id, kind, payload).await {
            logging::log_push_failure(recipient_id, kind.as_str(), &e.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&NotificationKind::RequestAccepted).unwrap();
        assert_eq!(json, "\"request_accepted\"");
        assert_eq!(NotificationKind::EventInvite.as_str(), "event_invite");
    }

    #[tokio::test]
    async fn disabled_dispatcher_is_a_no_op() {
        let settings = Settings::default();
        assert!(!settings.push.enabled);
        let service = NotificationService::new(settings).unwrap();

        let result = service
            .notify("user-1", NotificationKind::JoinRequest, serde_json::json!({"event_id": 1}))
            .await;
        assert!(result.is_ok());
    }
}
