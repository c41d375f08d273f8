//! # warden-config
//!
//! Layered configuration loading for Warden using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`WARDEN_*` prefix, `__` as separator)
//! 2. Project-level `.warden/config.toml`
//! 3. User-level `~/.config/warden/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `WARDEN_BACKEND__BASE_URL` -> `backend.base_url`,
//! `WARDEN_INVENTORY__REFRESH_INTERVAL_MS` -> `inventory.refresh_interval_ms`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use warden_config::WardenConfig;
//!
//! let config = WardenConfig::load_with_dotenv().expect("config");
//! if config.backend.is_configured() {
//!     println!("backend: {}", config.backend.base_url);
//! }
//! ```

mod auth;
mod backend;
mod error;
mod inventory;

pub use auth::AuthConfig;
pub use backend::BackendConfig;
pub use error::ConfigError;
pub use inventory::InventoryConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct WardenConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub inventory: InventoryConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

impl WardenConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need `.env` file loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source cannot be parsed and
    /// `ConfigError::InvalidValue` if a loaded value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(global_path));
        }

        let local_path = PathBuf::from(".warden/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("WARDEN_").split("__"))
    }

    /// Reject values the runtime cannot use.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base_url = &self.backend.base_url;
        if !base_url.is_empty()
            && !(base_url.starts_with("https://") || base_url.starts_with("http://"))
        {
            return Err(ConfigError::InvalidValue {
                field: "backend.base_url",
                value: format!("'{base_url}'"),
                expected: "an http:// or https:// URL",
            });
        }
        if self.backend.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "backend.request_timeout_secs",
                value: "0".into(),
                expected: "at least 1 second",
            });
        }
        if self.inventory.refresh_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "inventory.refresh_interval_ms",
                value: "0".into(),
                expected: "at least 1 millisecond",
            });
        }
        Ok(())
    }

    /// Require the backend section, for commands that talk to the server.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::BackendNotConfigured` listing whichever of
    /// `base_url` and `title_id` is missing.
    pub fn require_backend(&self) -> Result<&BackendConfig, ConfigError> {
        let missing = self.backend.missing_fields();
        if missing.is_empty() {
            Ok(&self.backend)
        } else {
            Err(ConfigError::BackendNotConfigured { missing })
        }
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("warden").join("config.toml"))
    }

    /// Load `.env` from the workspace root, walking up from `CARGO_MANIFEST_DIR`
    /// when available. Silently does nothing if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = WardenConfig::default();
        assert!(!config.backend.is_configured());
        assert_eq!(config.inventory.refresh_interval_ms, 3_000);
        assert!(config.auth.create_account);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn require_backend_names_missing_fields() {
        let err = WardenConfig::default().require_backend().unwrap_err();
        assert_eq!(
            err.to_string(),
            "backend is not configured: set backend.base_url, backend.title_id"
        );

        let mut config = WardenConfig::default();
        config.backend.base_url = "https://A1B2.playfabapi.com".into();
        let err = config.require_backend().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::BackendNotConfigured { ref missing } if missing == &["backend.title_id"]
        ));

        config.backend.title_id = "A1B2".into();
        assert!(config.require_backend().is_ok());
    }

    #[test]
    fn validate_rejects_zero_refresh_interval() {
        let mut config = WardenConfig::default();
        config.inventory.refresh_interval_ms = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid value 0 for inventory.refresh_interval_ms: expected at least 1 millisecond"
        );
    }

    #[test]
    fn validate_rejects_non_http_url() {
        let mut config = WardenConfig::default();
        config.backend.base_url = "ftp://example.com".into();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { field: "backend.base_url", .. }));
    }
}
