//! Public types for the chat API
use serde::{Deserialize, Serialize};

use crate::chat::Turn;

#[derive(Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: String,
}

impl ChatResponse {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
pub struct ChatHistoryResponse {
    pub history: Vec<Turn>,
}
