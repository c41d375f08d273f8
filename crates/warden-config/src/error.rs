//! Errors raised while loading or checking warden configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A TOML file or `WARDEN_*` variable could not be merged or extracted.
    #[error("failed to load warden configuration: {0}")]
    Figment(#[from] figment::Error),

    /// The backend section is missing fields needed to reach the server.
    /// `missing` holds dotted keys such as `backend.title_id`.
    #[error("backend is not configured: set {}", .missing.join(", "))]
    BackendNotConfigured { missing: Vec<&'static str> },

    /// A loaded value falls outside the range warden accepts.
    #[error("invalid value {value} for {field}: expected {expected}")]
    InvalidValue {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}
