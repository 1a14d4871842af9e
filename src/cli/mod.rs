use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod ask;
pub mod chat;
pub mod serve;

#[derive(Subcommand)]
enum Command {
    /// Start an interactive chat session with the assistant
    Chat {},
    /// Send a single message and print the reply
    Ask {
        /// The message to send
        message: String,
    },
    /// Run the chat web page
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "2222")]
        port: String,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

/// Log level for this crate when `RUST_LOG` isn't set
pub(crate) fn default_filter() -> String {
    format!("{}=debug", env!("CARGO_CRATE_NAME"))
}

/// Logs go to stderr so they don't interleave with the conversation
/// printed on stdout.
pub(crate) fn init_tracing(default_filter: String) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    match args.command {
        Some(Command::Chat {}) => {
            chat::run().await?;
        }
        Some(Command::Ask { message }) => {
            ask::run(&message).await?;
        }
        Some(Command::Serve { host, port }) => {
            serve::run(host, port).await?;
        }
        None => {}
    }

    Ok(())
}
