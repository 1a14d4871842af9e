//! Session client: owns the credentials and the one conversation a
//! session talks to.

use std::sync::Arc;

use crate::core::{AppConfig, AssistantError, Credentials};
use crate::openai::{
    OpenAIAssistants, RetryConfig, Role, Run, SharedAssistantService, ThreadMessage,
    retry_with_backoff,
};

/// Handle to a server-side thread
#[derive(Clone, Debug, PartialEq)]
pub struct Conversation {
    pub id: String,
}

#[derive(Clone)]
pub struct SessionClient {
    service: SharedAssistantService,
    assistant_id: String,
    retry: RetryConfig,
}

impl SessionClient {
    /// Reads the credentials, builds the service with `connect`, checks
    /// the assistant exists and creates the conversation for this
    /// session. Nothing is sent when a secret is missing.
    pub async fn initialize<F>(
        config: &AppConfig,
        connect: F,
    ) -> Result<(Self, Conversation), AssistantError>
    where
        F: FnOnce(&Credentials) -> SharedAssistantService,
    {
        let credentials = config.credentials()?;
        let service = connect(&credentials);
        let retry = config.retry.clone();

        let assistant_id = credentials.assistant_id.as_str();
        let svc = &service;
        let assistant = retry_with_backoff(&retry, "retrieve_assistant", move || {
            svc.retrieve_assistant(assistant_id)
        })
        .await?;
        tracing::info!(
            "Using assistant {} ({})",
            assistant.id,
            assistant.name.as_deref().unwrap_or("unnamed")
        );

        let thread = retry_with_backoff(&retry, "create_thread", move || svc.create_thread()).await?;
        tracing::debug!("Created conversation {}", thread.id);

        let client = Self {
            service,
            assistant_id: credentials.assistant_id,
            retry,
        };
        Ok((client, Conversation { id: thread.id }))
    }

    /// Initializes against the hosted HTTP API
    pub async fn connect(config: &AppConfig) -> Result<(Self, Conversation), AssistantError> {
        let api_hostname = config.api_hostname.clone();
        Self::initialize(config, |credentials| {
            Arc::new(OpenAIAssistants::new(&api_hostname, &credentials.api_key))
                as SharedAssistantService
        })
        .await
    }

    pub fn assistant_id(&self) -> &str {
        &self.assistant_id
    }

    pub async fn submit_message(
        &self,
        conversation: &Conversation,
        role: Role,
        content: &str,
    ) -> Result<ThreadMessage, AssistantError> {
        let svc = &self.service;
        let thread_id = conversation.id.as_str();
        retry_with_backoff(&self.retry, "create_message", move || {
            svc.create_message(thread_id, role, content)
        })
        .await
    }

    /// Starts processing everything appended since the last run
    pub async fn start_run(&self, conversation: &Conversation) -> Result<Run, AssistantError> {
        let svc = &self.service;
        let thread_id = conversation.id.as_str();
        let assistant_id = self.assistant_id.as_str();
        let run = retry_with_backoff(&self.retry, "create_run", move || {
            svc.create_run(thread_id, assistant_id)
        })
        .await?;
        tracing::debug!("Started run {} with status {}", run.id, run.status);
        Ok(run)
    }

    pub async fn fetch_run(
        &self,
        conversation: &Conversation,
        run_id: &str,
    ) -> Result<Run, AssistantError> {
        let svc = &self.service;
        let thread_id = conversation.id.as_str();
        retry_with_backoff(&self.retry, "retrieve_run", move || {
            svc.retrieve_run(thread_id, run_id)
        })
        .await
    }

    /// Stops a run that is still in flight. Not retried since the run
    /// expires server-side anyway.
    pub async fn cancel_run(
        &self,
        conversation: &Conversation,
        run_id: &str,
    ) -> Result<Run, AssistantError> {
        self.service.cancel_run(&conversation.id, run_id).await
    }

    /// Messages strictly after `after_message_id`, oldest first
    pub async fn messages_after(
        &self,
        conversation: &Conversation,
        after_message_id: &str,
    ) -> Result<Vec<ThreadMessage>, AssistantError> {
        let svc = &self.service;
        let thread_id = conversation.id.as_str();
        retry_with_backoff(&self.retry, "list_messages", move || {
            svc.list_messages(thread_id, Some(after_message_id))
        })
        .await
    }
}
