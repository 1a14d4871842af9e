mod history;
mod session;
mod turn;

#[cfg(test)]
pub(crate) mod fake;

pub use history::{LocalHistory, Turn};
pub use session::{Conversation, SessionClient};
pub use turn::{PollConfig, TurnExecutor};

use crate::core::{AppConfig, AssistantError};

/// Everything a UI needs for one chat: the executor bound to a
/// conversation and the history of turns shown to the user.
pub struct ChatSession {
    pub executor: TurnExecutor,
    pub history: LocalHistory,
}

impl ChatSession {
    pub fn new(executor: TurnExecutor) -> Self {
        Self {
            executor,
            history: LocalHistory::new(),
        }
    }

    /// Connects to the hosted service and opens a fresh conversation
    pub async fn start(config: &AppConfig) -> Result<Self, AssistantError> {
        let (client, conversation) = SessionClient::connect(config).await?;
        Ok(Self::new(TurnExecutor::new(
            client,
            conversation,
            config.poll.clone(),
        )))
    }

    pub async fn send(&mut self, user_text: &str) -> Result<String, AssistantError> {
        self.executor.submit(&mut self.history, user_text).await
    }
}
