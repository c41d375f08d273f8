//! Remote identity and commerce backend configuration.

use serde::{Deserialize, Serialize};

/// Default HTTP request timeout in seconds.
const fn default_request_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Base URL of the backend API (e.g., `https://a1b2.playfabapi.com`).
    #[serde(default)]
    pub base_url: String,

    /// Title (game) identifier sent with unauthenticated calls.
    #[serde(default)]
    pub title_id: String,

    /// Per-request timeout applied by the HTTP transport.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            title_id: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl BackendConfig {
    /// Check if the backend config has the minimum required fields.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        !self.base_url.is_empty() && !self.title_id.is_empty()
    }

    /// Dotted keys of the required fields that are still empty.
    #[must_use]
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.base_url.is_empty() {
            missing.push("backend.base_url");
        }
        if self.title_id.is_empty() {
            missing.push("backend.title_id");
        }
        missing
    }

    #[must_use]
    pub const fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}
