//! Public types for the chat page
use serde::{Deserialize, Serialize};

/// Form posted by the page's text box
#[derive(Deserialize)]
pub struct ChatForm {
    #[serde(default)]
    pub message: String,
}

/// Everything the page template renders. Optional fields are always
/// serialized so strict mode sees them.
#[derive(Serialize)]
pub struct ChatPage {
    pub title: String,
    pub lines: Vec<String>,
    pub warning: Option<String>,
    pub error: Option<String>,
}
