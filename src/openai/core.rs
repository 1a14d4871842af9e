use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::core::AssistantError;

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum Role {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "assistant")]
    Assistant,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    // The service adds statuses from time to time, anything we don't
    // know about is treated as terminal
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// Anything outside of `queued` and `in_progress` ends polling
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RunStatus::Queued | RunStatus::InProgress)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
            RunStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Deserialize, Debug)]
pub struct Assistant {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Clone, Deserialize, Debug)]
pub struct Thread {
    pub id: String,
    #[serde(default)]
    pub created_at: i64,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct TextContent {
    pub value: String,
    #[serde(default)]
    pub annotations: Vec<Value>,
}

// Object {
//     "type": String("text"),
//     "text": Object {
//         "annotations": Array [],
//         "value": String("Hi, how can I help?")
//     }
// }
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum MessageContent {
    #[serde(rename = "text")]
    Text { text: TextContent },
    // Images, file references and refusals are not displayed
    #[serde(other)]
    Other,
}

#[derive(Clone, Deserialize, Debug)]
pub struct ThreadMessage {
    pub id: String,
    pub role: Role,
    #[serde(default)]
    pub content: Vec<MessageContent>,
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub run_id: Option<String>,
}

impl ThreadMessage {
    /// All text parts of the message joined together or `None` when
    /// the message has no text.
    pub fn text(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .content
            .iter()
            .filter_map(|c| match c {
                MessageContent::Text { text } => Some(text.value.as_str()),
                MessageContent::Other => None,
            })
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("\n"))
        }
    }
}

#[derive(Clone, Deserialize, Debug, PartialEq)]
pub struct RunError {
    pub code: String,
    pub message: String,
}

#[derive(Clone, Deserialize, Debug)]
pub struct Run {
    pub id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub thread_id: String,
    #[serde(default)]
    pub assistant_id: String,
    #[serde(default)]
    pub last_error: Option<RunError>,
}

impl Run {
    /// Human readable explanation for a run that did not complete
    pub fn failure_reason(&self) -> String {
        match &self.last_error {
            Some(e) => format!("{} ({})", e.message, e.code),
            None => format!("run {}", self.status),
        }
    }
}

#[derive(Deserialize, Debug)]
struct MessageList {
    data: Vec<ThreadMessage>,
    #[serde(default)]
    #[allow(dead_code)]
    has_more: bool,
}

/// The operations the hosted assistant service offers. Implemented
/// over HTTP by [`OpenAIAssistants`] and by in-memory fakes in tests.
#[async_trait]
pub trait AssistantService: Send + Sync {
    async fn retrieve_assistant(&self, assistant_id: &str) -> Result<Assistant, AssistantError>;

    async fn create_thread(&self) -> Result<Thread, AssistantError>;

    async fn create_message(
        &self,
        thread_id: &str,
        role: Role,
        content: &str,
    ) -> Result<ThreadMessage, AssistantError>;

    async fn create_run(&self, thread_id: &str, assistant_id: &str)
    -> Result<Run, AssistantError>;

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AssistantError>;

    /// Asks the service to stop a run that is still queued or in progress
    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AssistantError>;

    /// Messages in ascending order, strictly after `after` when given
    async fn list_messages(
        &self,
        thread_id: &str,
        after: Option<&str>,
    ) -> Result<Vec<ThreadMessage>, AssistantError>;
}

pub type SharedAssistantService = Arc<dyn AssistantService>;

/// Assistants v2 HTTP API client
#[derive(Clone)]
pub struct OpenAIAssistants {
    client: reqwest::Client,
    api_hostname: String,
    api_key: String,
}

impl OpenAIAssistants {
    pub fn new(api_hostname: &str, api_key: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_hostname: api_hostname.trim_end_matches("/").to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> RequestBuilder {
        let url = format!("{}/v1/{}", self.api_hostname, path);
        self.client
            .request(method, url)
            .bearer_auth(&self.api_key)
            .header("OpenAI-Beta", "assistants=v2")
            .timeout(Duration::from_secs(60))
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, AssistantError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = try_parse_error_message(&body);
        tracing::debug!("Assistant service returned {}: {}", status, message);
        Err(error_for_status(status, message))
    }
}

fn error_for_status(status: StatusCode, message: String) -> AssistantError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AssistantError::Authentication(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::CONFLICT | StatusCode::TOO_MANY_REQUESTS => {
            AssistantError::TransientService(format!("{}: {}", status, message))
        }
        s if s.is_server_error() => {
            AssistantError::TransientService(format!("{}: {}", status, message))
        }
        s => AssistantError::Service {
            status: s.as_u16(),
            message,
        },
    }
}

/// Pulls `error.message` out of an error body, falling back to the
/// raw text.
fn try_parse_error_message(text: &str) -> String {
    let json = serde_json::from_str::<Value>(text).unwrap_or_default();
    if let Some(message) = json["error"]["message"].as_str() {
        return message.to_string();
    }
    if text.is_empty() {
        return "Unknown error".to_string();
    }
    text.to_string()
}

#[async_trait]
impl AssistantService for OpenAIAssistants {
    async fn retrieve_assistant(&self, assistant_id: &str) -> Result<Assistant, AssistantError> {
        let req = self.request(reqwest::Method::GET, &format!("assistants/{}", assistant_id));
        self.send(req).await
    }

    async fn create_thread(&self) -> Result<Thread, AssistantError> {
        let req = self.request(reqwest::Method::POST, "threads").json(&json!({}));
        self.send(req).await
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: Role,
        content: &str,
    ) -> Result<ThreadMessage, AssistantError> {
        let payload = json!({
            "role": role,
            "content": content,
        });
        let req = self
            .request(reqwest::Method::POST, &format!("threads/{}/messages", thread_id))
            .json(&payload);
        self.send(req).await
    }

    async fn create_run(
        &self,
        thread_id: &str,
        assistant_id: &str,
    ) -> Result<Run, AssistantError> {
        let payload = json!({ "assistant_id": assistant_id });
        let req = self
            .request(reqwest::Method::POST, &format!("threads/{}/runs", thread_id))
            .json(&payload);
        self.send(req).await
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AssistantError> {
        let req = self.request(
            reqwest::Method::GET,
            &format!("threads/{}/runs/{}", thread_id, run_id),
        );
        self.send(req).await
    }

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AssistantError> {
        let req = self.request(
            reqwest::Method::POST,
            &format!("threads/{}/runs/{}/cancel", thread_id, run_id),
        );
        self.send(req).await
    }

    async fn list_messages(
        &self,
        thread_id: &str,
        after: Option<&str>,
    ) -> Result<Vec<ThreadMessage>, AssistantError> {
        let mut query = vec![("order", "asc")];
        if let Some(after) = after {
            query.push(("after", after));
        }
        let req = self
            .request(reqwest::Method::GET, &format!("threads/{}/messages", thread_id))
            .query(&query);
        let list: MessageList = self.send(req).await?;
        Ok(list.data)
    }
}
