//! ntfy notification client.
//!
//! Delivers titled, prioritized messages to a configured ntfy topic. The
//! [`Notify`] trait is the seam the dispatcher depends on, so delivery can
//! be faked in tests.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::config::NtfyConfig;

/// Seconds at or below which a timed-out request earns a configuration hint.
const LOW_TIMEOUT_HINT_SECS: u64 = 3;

/// ntfy message priority (the `Priority` header value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    /// Highest priority, used for critical alerts.
    Max,
    /// Elevated priority, used for warnings and test messages.
    High,
}

impl Priority {
    /// Header value for this priority.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Max => "max",
            Self::High => "high",
        }
    }
}

/// A rendered notification ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// The `Title` header.
    pub title: String,
    /// The message body.
    pub body: String,
    /// The `Priority` header.
    pub priority: Priority,
    /// The `Tags` header (emoji shortcodes).
    pub tags: String,
}

/// Error delivering a notification. Fatal when a genuine alert was due.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// HTTP transport failure (connection, TLS, timeout).
    #[error("ntfy request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// HTTP 401 — almost always a wrong or missing auth token.
    #[error("ntfy rejected the request (HTTP 401); check the auth token")]
    Unauthorized,
    /// Any other non-success HTTP status.
    #[error("ntfy returned non-success status {status}")]
    HttpStatus {
        /// The HTTP status code.
        status: u16,
    },
}

/// Delivery seam for the dispatcher.
#[async_trait]
pub trait Notify: Send + Sync {
    /// Deliver one notification.
    ///
    /// # Errors
    ///
    /// Returns a [`NotifyError`] on transport failure or non-success status.
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// HTTP client for a single ntfy topic.
pub struct NtfyNotifier {
    client: reqwest::Client,
    topic_url: String,
    auth_token: String,
    timeout_secs: u64,
}

impl NtfyNotifier {
    /// Build a notifier from config.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Request`] if the HTTP client cannot be
    /// constructed (TLS backend initialisation).
    pub fn new(config: &NtfyConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()?;
        Ok(Self {
            client,
            topic_url: config.topic_url.clone(),
            auth_token: config.auth_token.clone(),
            timeout_secs: config.request_timeout_secs,
        })
    }

    /// Topic URL this notifier delivers to.
    pub fn topic_url(&self) -> &str {
        &self.topic_url
    }

    /// Send a fixed test notification and report whether it was delivered.
    ///
    /// Never fails; a delivery error is logged and reported as `false`.
    pub async fn test_config(&self) -> bool {
        let notification = Notification {
            title: "Test notification".to_owned(),
            body: "This is just a test notification of gridwatch.".to_owned(),
            priority: Priority::High,
            tags: "white_check_mark".to_owned(),
        };
        match self.send(&notification).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "test notification failed");
                false
            }
        }
    }
}

#[async_trait]
impl Notify for NtfyNotifier {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.topic_url)
            .header("Title", &notification.title)
            .header("Priority", notification.priority.as_str())
            .header("Tags", &notification.tags)
            .bearer_auth(&self.auth_token)
            .body(notification.body.clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() && self.timeout_secs <= LOW_TIMEOUT_HINT_SECS {
                    warn!(
                        timeout_secs = self.timeout_secs,
                        "request timed out; the configured timeout may be too low"
                    );
                }
                e
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(delivery_error(status));
        }
        debug!(status = %status, "notification delivered");
        Ok(())
    }
}

/// Map a non-success HTTP status to a delivery error.
fn delivery_error(status: reqwest::StatusCode) -> NotifyError {
    if status == reqwest::StatusCode::UNAUTHORIZED {
        NotifyError::Unauthorized
    } else {
        NotifyError::HttpStatus {
            status: status.as_u16(),
        }
    }
}
