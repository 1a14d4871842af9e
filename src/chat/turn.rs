//! Turn executor: drives one run to completion and pulls out the reply.

use std::time::Duration;

use tokio::time::{sleep, timeout};
use tokio_util::sync::CancellationToken;

use crate::chat::history::LocalHistory;
use crate::chat::session::{Conversation, SessionClient};
use crate::core::AssistantError;
use crate::openai::{Role, Run, RunStatus, ThreadMessage};

#[derive(Clone, Debug, PartialEq)]
pub struct PollConfig {
    /// Delay between run status checks
    pub interval: Duration,
    /// Give up on a run after this long
    pub max_wait: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            max_wait: Duration::from_secs(120),
        }
    }
}

pub struct TurnExecutor {
    client: SessionClient,
    conversation: Conversation,
    poll: PollConfig,
}

impl TurnExecutor {
    pub fn new(client: SessionClient, conversation: Conversation, poll: PollConfig) -> Self {
        Self {
            client,
            conversation,
            poll,
        }
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Re-fetches the run every poll interval until its status leaves
    /// `queued`/`in_progress`. The first terminal status observed is
    /// returned, whatever it is.
    pub async fn poll_until_terminal(
        &self,
        run: Run,
        cancel: &CancellationToken,
    ) -> Result<Run, AssistantError> {
        let run_id = run.id.clone();
        let wait = async {
            let mut run = run;
            while !run.status.is_terminal() {
                tracing::debug!(
                    "Run {} is {}, checking again in {:?}",
                    run.id,
                    run.status,
                    self.poll.interval
                );
                sleep(self.poll.interval).await;
                run = self.client.fetch_run(&self.conversation, &run.id).await?;
            }
            Ok::<Run, AssistantError>(run)
        };

        let abandoned = tokio::select! {
            biased;
            _ = cancel.cancelled() => AssistantError::Cancelled,
            result = timeout(self.poll.max_wait, wait) => match result {
                Ok(run) => return run,
                Err(_) => {
                    tracing::warn!("Gave up on run after {:?}", self.poll.max_wait);
                    AssistantError::Timeout(self.poll.max_wait)
                }
            },
        };
        self.abandon_run(&run_id).await;
        Err(abandoned)
    }

    /// Best effort: the run keeps working server-side otherwise and the
    /// thread stays locked until it expires.
    async fn abandon_run(&self, run_id: &str) {
        match self.client.cancel_run(&self.conversation, run_id).await {
            Ok(run) => tracing::info!("Cancelled run {} ({})", run.id, run.status),
            Err(e) => tracing::warn!("Failed to cancel run {}: {}", run_id, e),
        }
    }

    /// Text of the oldest message after `after_message`
    pub async fn get_reply(
        &self,
        conversation: &Conversation,
        after_message: &ThreadMessage,
    ) -> Result<String, AssistantError> {
        let messages = self
            .client
            .messages_after(conversation, &after_message.id)
            .await?;
        let first = messages
            .into_iter()
            .next()
            .ok_or(AssistantError::EmptyReply)?;
        first.text().ok_or(AssistantError::EmptyReply)
    }

    /// Runs a full turn and records it in `history` on success
    pub async fn submit(
        &self,
        history: &mut LocalHistory,
        user_text: &str,
    ) -> Result<String, AssistantError> {
        self.submit_cancellable(history, user_text, &CancellationToken::new())
            .await
    }

    pub async fn submit_cancellable(
        &self,
        history: &mut LocalHistory,
        user_text: &str,
        cancel: &CancellationToken,
    ) -> Result<String, AssistantError> {
        let conversation = &self.conversation;
        let message = self
            .client
            .submit_message(conversation, Role::User, user_text)
            .await?;
        let run = self.client.start_run(conversation).await?;
        let run = self.poll_until_terminal(run, cancel).await?;

        if run.status != RunStatus::Completed {
            tracing::warn!("Run {} ended with status {}", run.id, run.status);
            return Err(AssistantError::RunFailed {
                status: run.status,
                reason: run.failure_reason(),
            });
        }

        let reply = self.get_reply(conversation, &message).await?;
        history.push(user_text, &reply);
        Ok(reply)
    }
}
