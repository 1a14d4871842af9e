//! Error types for talking to the hosted assistant service.

use thiserror::Error;

use crate::openai::RunStatus;

/// Every failure a turn can end with.
///
/// Only `TransientService` is retried. Everything else is reported to
/// the caller once and the turn is abandoned.
#[derive(Error, Debug)]
pub enum AssistantError {
    /// A required secret is missing or the secret store is unreadable
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The hosted service rejected the credentials
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Network failure, rate limit or server-side hiccup
    #[error("Assistant service unavailable: {0}")]
    TransientService(String),

    /// Any other non-success response or an undecodable body
    #[error("Assistant service error (status {status}): {message}")]
    Service { status: u16, message: String },

    /// No assistant message exists after the user's message
    #[error("The assistant did not reply")]
    EmptyReply,

    /// The run ended in a terminal status other than `completed`
    #[error("The assistant could not process that message (run {status}): {reason}")]
    RunFailed { status: RunStatus, reason: String },

    /// Polling exceeded the maximum wait
    #[error("Timed out after {0:?} waiting for the assistant")]
    Timeout(std::time::Duration),

    /// Polling was cancelled by the caller
    #[error("Cancelled while waiting for the assistant")]
    Cancelled,
}

impl AssistantError {
    pub fn is_transient(&self) -> bool {
        matches!(self, AssistantError::TransientService(_))
    }
}

impl From<reqwest::Error> for AssistantError {
    fn from(err: reqwest::Error) -> Self {
        // A malformed host can't succeed on retry
        if err.is_builder() {
            return AssistantError::Configuration(format!("Invalid request: {}", err));
        }
        if err.is_decode() {
            return AssistantError::Service {
                status: err.status().map(|s| s.as_u16()).unwrap_or(200),
                message: format!("Invalid response body: {}", err),
            };
        }
        // Connect, timeout and body read failures are all worth another try
        AssistantError::TransientService(err.to_string())
    }
}
