use anyhow::Result;
use threadchat::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
