mod config;
mod error;
pub mod secrets;

pub use config::{AppConfig, Credentials};
pub use error::AssistantError;
pub use secrets::SecretStore;
