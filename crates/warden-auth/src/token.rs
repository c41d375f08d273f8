//! Providers that pass through a credential obtained outside warden.
//!
//! A social access token is reusable until it expires, so it also serves
//! silent logins. A platform server auth code is single-use and is consumed by
//! the first exchange.

use async_trait::async_trait;
use parking_lot::Mutex;
use warden_core::{ProviderCredential, ProviderKind};

use crate::error::ProviderError;
use crate::provider::{AuthParams, ProviderAdapter};

/// Logs in with a social network access token.
pub struct SocialTokenProvider {
    token: Mutex<Option<String>>,
}

impl SocialTokenProvider {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: Mutex::new((!token.trim().is_empty()).then_some(token)),
        }
    }
}

#[async_trait]
impl ProviderAdapter for SocialTokenProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::SocialToken
    }

    async fn authenticate(&self, _params: &AuthParams) -> Result<ProviderCredential, ProviderError> {
        let token = self
            .token
            .lock()
            .clone()
            .ok_or_else(|| ProviderError::Failed("no social access token".into()))?;
        Ok(ProviderCredential::SocialToken { token })
    }

    async fn has_cached_session(&self) -> bool {
        self.token.lock().is_some()
    }

    async fn forget_cached_credential(&self) {
        self.token.lock().take();
    }
}

impl std::fmt::Debug for SocialTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocialTokenProvider")
            .field("has_token", &self.token.lock().is_some())
            .finish()
    }
}

/// Logs in with a platform game-services server auth code.
pub struct PlatformAccountProvider {
    server_auth_code: Mutex<Option<String>>,
}

impl PlatformAccountProvider {
    #[must_use]
    pub fn new(server_auth_code: impl Into<String>) -> Self {
        let code = server_auth_code.into();
        Self {
            server_auth_code: Mutex::new((!code.trim().is_empty()).then_some(code)),
        }
    }
}

#[async_trait]
impl ProviderAdapter for PlatformAccountProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::PlatformAccount
    }

    async fn authenticate(&self, params: &AuthParams) -> Result<ProviderCredential, ProviderError> {
        if !params.interactive {
            return Err(ProviderError::Failed(
                "server auth codes cannot be reused for silent login".into(),
            ));
        }
        let server_auth_code = self
            .server_auth_code
            .lock()
            .take()
            .ok_or_else(|| ProviderError::Failed("no unused server auth code".into()))?;
        Ok(ProviderCredential::PlatformAccount { server_auth_code })
    }
}

impl std::fmt::Debug for PlatformAccountProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformAccountProvider")
            .field("has_code", &self.server_auth_code.lock().is_some())
            .finish()
    }
}
