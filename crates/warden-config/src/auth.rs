//! Login behaviour configuration.

use serde::{Deserialize, Serialize};

const fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Ask the backend to create an account when a provider identity is new.
    #[serde(default = "default_true")]
    pub create_account: bool,

    /// Attempt a silent login with the last provider at startup.
    #[serde(default = "default_true")]
    pub auto_login: bool,

    /// Override for the last-provider file (defaults to `~/.warden/last_provider`).
    #[serde(default)]
    pub preference_path: String,

    /// Fixed device identifier for device login. Generated and stored when empty.
    #[serde(default)]
    pub device_id: String,

    /// Social network access token. Enables social login when set.
    #[serde(default)]
    pub social_token: String,

    /// Platform game-services server auth code. Enables platform login when set.
    #[serde(default)]
    pub platform_auth_code: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            create_account: true,
            auto_login: true,
            preference_path: String::new(),
            device_id: String::new(),
            social_token: String::new(),
            platform_auth_code: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = AuthConfig::default();
        assert!(config.create_account);
        assert!(config.auto_login);
        assert!(config.preference_path.is_empty());
        assert!(config.device_id.is_empty());
        assert!(config.social_token.is_empty());
        assert!(config.platform_auth_code.is_empty());
    }
}
