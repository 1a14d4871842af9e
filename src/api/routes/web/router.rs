//! Router for the chat page

use axum::{
    Form, Router,
    extract::{Request, State},
    http::{HeaderValue, header},
    middleware,
    response::{Html, IntoResponse, Response},
    routing::get,
};

use super::page;
use super::public::{ChatForm, ChatPage};
use crate::api::public::{ApiError, status_for};
use crate::api::state::{AppState, SharedState};
use crate::chat::ChatSession;

async fn set_no_cache(request: Request, next: middleware::Next) -> Response {
    let mut response = next.run(request).await;
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    response
}

fn render_page(
    state: &AppState,
    session: &ChatSession,
    warning: Option<String>,
    error: Option<String>,
) -> Result<Html<String>, ApiError> {
    let page = ChatPage {
        title: state.config.title.clone(),
        lines: session.history.transcript_lines(),
        warning,
        error,
    };
    Ok(Html(page::render(&state.templates, &page)?))
}

async fn chat_page(State(state): State<SharedState>) -> Result<Html<String>, ApiError> {
    let session = state.session.lock().await;
    render_page(&state, &session, None, None)
}

/// Run a turn from the page's form and re-render with the result
async fn submit_message(
    State(state): State<SharedState>,
    Form(form): Form<ChatForm>,
) -> Result<Response, ApiError> {
    let mut session = state.session.lock().await;

    let message = form.message.trim();
    if message.is_empty() {
        let warning = Some("Please type a message before sending.".to_string());
        return Ok(render_page(&state, &session, warning, None)?.into_response());
    }

    match session.send(message).await {
        Ok(_) => Ok(render_page(&state, &session, None, None)?.into_response()),
        Err(e) => {
            tracing::error!("Turn failed: {}", e);
            let status = status_for(&e);
            let html = render_page(&state, &session, None, Some(e.to_string()))?;
            Ok((status, html).into_response())
        }
    }
}

/// Create the page router
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/", get(chat_page).post(submit_message))
        .layer(middleware::from_fn(set_no_cache))
}
