use anyhow::Result;

use crate::api;
use crate::chat::ChatSession;
use crate::cli::{default_filter, init_tracing};
use crate::core::AppConfig;

pub async fn run(host: String, port: String) -> Result<()> {
    // axum logs rejections from built-in extractors with the
    // `axum::rejection` target, at `TRACE` level
    init_tracing(format!(
        "{},tower_http=debug,axum::rejection=trace",
        default_filter()
    ));

    let config = AppConfig::from_env()?;
    let session = ChatSession::start(&config).await?;
    api::serve(host, port, config, session).await
}
