use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::chat::PollConfig;
use crate::core::AssistantError;
use crate::core::secrets::{API_KEY_SECRET, ASSISTANT_ID_SECRET, SecretStore};
use crate::openai::RetryConfig;

/// API key and assistant identifier, both opaque to this crate.
#[derive(Clone, Debug, PartialEq)]
pub struct Credentials {
    pub api_key: String,
    pub assistant_id: String,
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_hostname: String,
    pub title: String,
    pub secrets: SecretStore,
    pub poll: PollConfig,
    pub retry: RetryConfig,
}

impl AppConfig {
    pub fn new(secrets: SecretStore) -> Self {
        Self {
            api_hostname: String::from("https://api.openai.com"),
            title: String::from("Assistant"),
            secrets,
            poll: PollConfig::default(),
            retry: RetryConfig::default(),
        }
    }

    /// Builds the config from the secrets file and environment
    /// variables. Environment variables take precedence over the file.
    pub fn from_env() -> Result<Self, AssistantError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`AppConfig::from_env`] with variables resolved by `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AssistantError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secrets_path = lookup("THREADCHAT_SECRETS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./secrets.toml"));
        let mut secrets = SecretStore::load(&secrets_path)?;
        if let Some(api_key) = lookup("OPENAI_API_KEY") {
            secrets.set(API_KEY_SECRET, &api_key);
        }
        if let Some(assistant_id) = lookup("THREADCHAT_ASSISTANT_ID") {
            secrets.set(ASSISTANT_ID_SECRET, &assistant_id);
        }

        let mut config = Self::new(secrets);
        if let Some(host) = lookup("THREADCHAT_API_HOST") {
            config.api_hostname = host;
        }
        if let Some(title) = lookup("THREADCHAT_TITLE") {
            config.title = title;
        }
        if let Some(ms) = parse_u64(&lookup, "THREADCHAT_POLL_INTERVAL_MS")? {
            config.poll.interval = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_u64(&lookup, "THREADCHAT_POLL_TIMEOUT_SECS")? {
            config.poll.max_wait = Duration::from_secs(secs);
        }
        if let Some(attempts) = parse_u64(&lookup, "THREADCHAT_RETRY_ATTEMPTS")? {
            config.retry.max_attempts = attempts.max(1) as usize;
        }

        Ok(config)
    }

    /// Looks up both required secrets.
    pub fn credentials(&self) -> Result<Credentials, AssistantError> {
        let api_key = self.secrets.get(API_KEY_SECRET).ok_or_else(|| {
            AssistantError::Configuration(format!("Missing secret `{}`", API_KEY_SECRET))
        })?;
        let assistant_id = self.secrets.get(ASSISTANT_ID_SECRET).ok_or_else(|| {
            AssistantError::Configuration(format!("Missing secret `{}`", ASSISTANT_ID_SECRET))
        })?;

        Ok(Credentials {
            api_key: api_key.to_string(),
            assistant_id: assistant_id.to_string(),
        })
    }
}

fn parse_u64<F>(lookup: &F, name: &str) -> Result<Option<u64>, AssistantError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(val) => val
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| AssistantError::Configuration(format!("{} must be a number", name))),
        None => Ok(None),
    }
}
