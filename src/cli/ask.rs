use anyhow::Result;

use crate::chat::ChatSession;
use crate::cli::{default_filter, init_tracing};
use crate::core::AppConfig;

/// One turn against a throwaway conversation, nothing is kept.
pub async fn run(message: &str) -> Result<()> {
    init_tracing(default_filter());

    if message.trim().is_empty() {
        println!("Please type a message before sending.");
        return Ok(());
    }

    let config = AppConfig::from_env()?;
    let mut session = ChatSession::start(&config).await?;
    let reply = session.send(message).await?;

    println!("You entered: {}", message);
    println!("Assistant: {}", reply);

    Ok(())
}
