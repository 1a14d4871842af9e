//! API routes module

pub mod chat;
pub mod web;

use axum::Router;

use crate::api::state::SharedState;

/// Create the combined JSON API router
pub fn router() -> Router<SharedState> {
    Router::new()
        // Chat routes
        .nest("/chat", chat::router())
}
