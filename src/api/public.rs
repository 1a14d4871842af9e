//! Public API types

use axum::response::{IntoResponse, Response};
use http::StatusCode;

use crate::core::AssistantError;

// Errors

pub struct ApiError(anyhow::Error);

/// Status code to report for a failed turn
pub fn status_for(err: &AssistantError) -> StatusCode {
    match err {
        AssistantError::Configuration(_) | AssistantError::Cancelled => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        AssistantError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        AssistantError::TransientService(_) => StatusCode::SERVICE_UNAVAILABLE,
        AssistantError::Authentication(_) => StatusCode::UNAUTHORIZED,
        AssistantError::Service { .. }
        | AssistantError::EmptyReply
        | AssistantError::RunFailed { .. } => StatusCode::BAD_GATEWAY,
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Always log the error
        tracing::error!("{}", self.0);

        let status = self
            .0
            .downcast_ref::<AssistantError>()
            .map(status_for)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, format!("Something went wrong: {}", self.0)).into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

// Re-export public types from each route

pub mod chat {
    pub use crate::api::routes::chat::public::*;
}

pub mod web {
    pub use crate::api::routes::web::public::*;
}
