use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio_util::sync::CancellationToken;

use crate::chat::ChatSession;
use crate::cli::{default_filter, init_tracing};
use crate::core::AppConfig;

const HISTORY_COMMAND: &str = "/history";

pub async fn run() -> Result<()> {
    init_tracing(default_filter());

    let config = AppConfig::from_env()?;
    let mut session = ChatSession::start(&config).await?;
    let mut rl = DefaultEditor::new()?;

    println!("{}", config.title);
    println!("Type {} to show the conversation, Ctrl-D to quit.", HISTORY_COMMAND);

    loop {
        let readline = rl.readline("You: ");
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    println!("Please type a message before sending.");
                    continue;
                }
                let _ = rl.add_history_entry(line);

                if line == HISTORY_COMMAND {
                    for l in session.history.transcript_lines() {
                        println!("{}", l);
                    }
                    continue;
                }

                // Ctrl-C while waiting cancels the run but keeps the session
                let cancel = CancellationToken::new();
                let trigger = cancel.clone();
                let ctrl_c = tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        trigger.cancel();
                    }
                });

                let result = session
                    .executor
                    .submit_cancellable(&mut session.history, line, &cancel)
                    .await;
                ctrl_c.abort();

                match result {
                    Ok(reply) => println!("Assistant: {}", reply),
                    Err(e) => println!("Error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
