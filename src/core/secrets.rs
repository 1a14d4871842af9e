//! Static secret store backed by a TOML file, e.g.
//!
//! ```toml
//! apikey = "sk-..."
//! assistantID = "asst_..."
//! ```

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::core::AssistantError;

pub const API_KEY_SECRET: &str = "apikey";
pub const ASSISTANT_ID_SECRET: &str = "assistantID";

#[derive(Clone, Debug, Default)]
pub struct SecretStore {
    values: HashMap<String, String>,
}

impl SecretStore {
    pub fn from_toml(contents: &str) -> Result<Self, AssistantError> {
        let table: toml::Table = contents
            .parse()
            .map_err(|e| AssistantError::Configuration(format!("Invalid secrets file: {}", e)))?;

        // Non-string values are ignored, the store only deals in opaque strings
        let values = table
            .into_iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k, s.to_string())))
            .collect();

        Ok(Self { values })
    }

    /// Reads the secrets file at `path`. A missing file yields an empty
    /// store so that secrets can come from the environment alone.
    pub fn load(path: &Path) -> Result<Self, AssistantError> {
        if !path.exists() {
            tracing::debug!("No secrets file at {}", path.display());
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path).map_err(|e| {
            AssistantError::Configuration(format!(
                "Unable to read secrets file {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&contents)
    }

    /// Returns the secret for `key`. Blank values count as missing.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }
}
