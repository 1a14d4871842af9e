use std::sync::Arc;

use handlebars::Handlebars;
use tokio::sync::Mutex;

use crate::api::routes::web::page;
use crate::chat::ChatSession;
use crate::core::AppConfig;

pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub config: AppConfig,
    // One turn at a time: the lock is held for the whole turn so
    // overlapping requests can't interleave on the conversation
    pub session: Mutex<ChatSession>,
    pub templates: Handlebars<'static>,
}

impl AppState {
    pub fn new(config: AppConfig, session: ChatSession) -> Self {
        Self {
            config,
            session: Mutex::new(session),
            templates: page::templates(),
        }
    }
}
