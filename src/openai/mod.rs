mod core;
mod retry;

pub use self::core::*;
pub use retry::{RetryConfig, retry_with_backoff};
