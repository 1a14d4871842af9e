//! In-memory assistant service for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::secrets::{API_KEY_SECRET, ASSISTANT_ID_SECRET};
use crate::core::{AppConfig, AssistantError, SecretStore};
use crate::openai::{
    Assistant, AssistantService, MessageContent, RetryConfig, Role, Run, RunError, RunStatus,
    TextContent, Thread, ThreadMessage,
};

pub fn test_config() -> AppConfig {
    let secrets = SecretStore::default()
        .with(API_KEY_SECRET, "sk-test")
        .with(ASSISTANT_ID_SECRET, "asst_test");
    let mut config = AppConfig::new(secrets);
    config.retry = RetryConfig::none();
    config
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Calls {
    pub retrieve_assistant: usize,
    pub create_thread: usize,
    pub create_message: usize,
    pub create_run: usize,
    pub retrieve_run: usize,
    pub cancel_run: usize,
    pub list_messages: usize,
}

impl Calls {
    pub fn total(&self) -> usize {
        self.retrieve_assistant
            + self.create_thread
            + self.create_message
            + self.create_run
            + self.retrieve_run
            + self.cancel_run
            + self.list_messages
    }
}

#[derive(Default)]
struct State {
    reject_credentials: bool,
    // Statuses handed out by successive `retrieve_run` calls. Once
    // empty every run reports `completed`.
    statuses: VecDeque<RunStatus>,
    replies: VecDeque<String>,
    transient_failures: usize,
    threads: usize,
    messages: Vec<(String, ThreadMessage)>,
    runs: usize,
    active_run: Option<(String, String)>,
    calls: Calls,
}

#[derive(Default)]
pub struct FakeAssistant {
    state: Mutex<State>,
}

impl FakeAssistant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting_credentials(self) -> Self {
        self.state.lock().unwrap().reject_credentials = true;
        self
    }

    pub fn with_statuses(self, statuses: &[RunStatus]) -> Self {
        self.state.lock().unwrap().statuses.extend(statuses.iter().copied());
        self
    }

    pub fn with_replies(self, replies: &[&str]) -> Self {
        self.state
            .lock()
            .unwrap()
            .replies
            .extend(replies.iter().map(|r| r.to_string()));
        self
    }

    /// The next `n` calls to `retrieve_run` fail with a transient error
    pub fn with_transient_failures(self, n: usize) -> Self {
        self.state.lock().unwrap().transient_failures = n;
        self
    }

    /// Appends a message directly, as if another client had posted it
    pub fn push_message(&self, thread_id: &str, role: Role, text: &str) {
        let mut state = self.state.lock().unwrap();
        append(&mut state, thread_id, role, text);
    }

    pub fn calls(&self) -> Calls {
        self.state.lock().unwrap().calls.clone()
    }
}

fn append(state: &mut State, thread_id: &str, role: Role, text: &str) -> ThreadMessage {
    let msg = ThreadMessage {
        id: format!("msg_{}", state.messages.len() + 1),
        role,
        content: vec![MessageContent::Text {
            text: TextContent {
                value: text.to_string(),
                annotations: vec![],
            },
        }],
        created_at: state.messages.len() as i64,
        run_id: None,
    };
    state.messages.push((thread_id.to_string(), msg.clone()));
    msg
}

fn run(id: &str, thread_id: &str, status: RunStatus) -> Run {
    let last_error = match status {
        RunStatus::Failed => Some(RunError {
            code: "server_error".to_string(),
            message: "Something went wrong".to_string(),
        }),
        _ => None,
    };
    Run {
        id: id.to_string(),
        status,
        thread_id: thread_id.to_string(),
        assistant_id: "asst_test".to_string(),
        last_error,
    }
}

#[async_trait]
impl AssistantService for FakeAssistant {
    async fn retrieve_assistant(&self, assistant_id: &str) -> Result<Assistant, AssistantError> {
        let mut state = self.state.lock().unwrap();
        state.calls.retrieve_assistant += 1;
        if state.reject_credentials {
            return Err(AssistantError::Authentication(
                "Incorrect API key provided".to_string(),
            ));
        }
        Ok(Assistant {
            id: assistant_id.to_string(),
            name: Some("Test Assistant".to_string()),
            model: None,
        })
    }

    async fn create_thread(&self) -> Result<Thread, AssistantError> {
        let mut state = self.state.lock().unwrap();
        state.calls.create_thread += 1;
        state.threads += 1;
        Ok(Thread {
            id: format!("thread_{}", state.threads),
            created_at: 0,
        })
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: Role,
        content: &str,
    ) -> Result<ThreadMessage, AssistantError> {
        let mut state = self.state.lock().unwrap();
        state.calls.create_message += 1;
        Ok(append(&mut state, thread_id, role, content))
    }

    async fn create_run(
        &self,
        thread_id: &str,
        _assistant_id: &str,
    ) -> Result<Run, AssistantError> {
        let mut state = self.state.lock().unwrap();
        state.calls.create_run += 1;
        state.runs += 1;
        let run_id = format!("run_{}", state.runs);
        state.active_run = Some((thread_id.to_string(), run_id.clone()));
        Ok(run(&run_id, thread_id, RunStatus::Queued))
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AssistantError> {
        let mut state = self.state.lock().unwrap();
        state.calls.retrieve_run += 1;
        if state.transient_failures > 0 {
            state.transient_failures -= 1;
            return Err(AssistantError::TransientService(
                "429 Too Many Requests".to_string(),
            ));
        }

        let status = state.statuses.pop_front().unwrap_or(RunStatus::Completed);
        let finishing = state.active_run.as_ref()
            == Some(&(thread_id.to_string(), run_id.to_string()));
        if status.is_terminal() && finishing {
            state.active_run = None;
            if status == RunStatus::Completed {
                if let Some(reply) = state.replies.pop_front() {
                    append(&mut state, thread_id, Role::Assistant, &reply);
                }
            }
        }
        Ok(run(run_id, thread_id, status))
    }

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<Run, AssistantError> {
        let mut state = self.state.lock().unwrap();
        state.calls.cancel_run += 1;
        if state.active_run.as_ref() == Some(&(thread_id.to_string(), run_id.to_string())) {
            state.active_run = None;
        }
        Ok(run(run_id, thread_id, RunStatus::Cancelling))
    }

    async fn list_messages(
        &self,
        thread_id: &str,
        after: Option<&str>,
    ) -> Result<Vec<ThreadMessage>, AssistantError> {
        let mut state = self.state.lock().unwrap();
        state.calls.list_messages += 1;
        let in_thread = state
            .messages
            .iter()
            .filter(|(t, _)| t == thread_id)
            .map(|(_, m)| m.clone());
        let messages = match after {
            Some(after) => in_thread.skip_while(|m| m.id != after).skip(1).collect(),
            None => in_thread.collect(),
        };
        Ok(messages)
    }
}
