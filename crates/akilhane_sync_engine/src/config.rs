//! Configuration for the sync engine.

use crate::error::{SyncError, SyncResult};
use std::time::Duration;

/// Configuration for sync operations.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Remote base URL (e.g., "https://abc.supabase.co").
    pub base_url: String,
    /// Project API key, sent as `apikey`.
    pub api_key: String,
    /// User access token; the API key is used as bearer when absent.
    pub access_token: Option<String>,
    /// Request timeout.
    pub timeout: Duration,
    /// Topic for pushed questions without one.
    pub fallback_topic: String,
    /// Question type for pushed questions without one.
    pub fallback_type: String,
    /// Difficulty for pushed questions without one.
    pub fallback_difficulty: String,
}

impl SyncConfig {
    /// Creates a new sync configuration.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            access_token: None,
            timeout: Duration::from_secs(30),
            fallback_topic: "Genel".to_string(),
            fallback_type: "multiple-choice".to_string(),
            fallback_difficulty: "Orta".to_string(),
        }
    }

    /// Sets the user access token.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the topic, type and difficulty used for incomplete questions.
    pub fn with_fallbacks(
        mut self,
        topic: impl Into<String>,
        kind: impl Into<String>,
        difficulty: impl Into<String>,
    ) -> Self {
        self.fallback_topic = topic.into();
        self.fallback_type = kind.into();
        self.fallback_difficulty = difficulty.into();
        self
    }

    /// Returns the bearer token for requests.
    pub fn bearer(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.api_key)
    }

    /// Checks that the remote endpoint is usable.
    pub fn validate(&self) -> SyncResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(SyncError::Config(format!(
                "remote URL must be http(s): '{}'",
                self.base_url
            )));
        }
        if self.api_key.is_empty() {
            return Err(SyncError::Config("API key is empty".into()));
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new("", "")
    }
}
