//! Identity provider adapters and the runtime capability set.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use warden_core::{ProviderCredential, ProviderKind};

use crate::error::ProviderError;

/// Per-attempt options handed to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthParams {
    /// Extra permission scopes to request from the provider.
    pub scopes: Vec<String>,
    /// `false` when no UI may be shown (auto-login). Adapters that need a
    /// dialog should fail instead of prompting.
    pub interactive: bool,
}

impl Default for AuthParams {
    fn default() -> Self {
        Self {
            scopes: Vec::new(),
            interactive: true,
        }
    }
}

impl AuthParams {
    /// Parameters for auto-login: no UI.
    #[must_use]
    pub fn silent() -> Self {
        Self {
            scopes: Vec::new(),
            interactive: false,
        }
    }
}

/// One external identity source.
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Run the provider's login and produce a credential for the backend.
    ///
    /// # Errors
    ///
    /// `ProviderError::Cancelled` if the user dismissed the login,
    /// `ProviderError::Failed` for provider-internal failures.
    async fn authenticate(&self, params: &AuthParams) -> Result<ProviderCredential, ProviderError>;

    /// Whether the provider already holds a usable local session, so a silent
    /// login can succeed without user interaction.
    async fn has_cached_session(&self) -> bool {
        false
    }

    /// Drop any locally cached provider session so it cannot be reused.
    async fn forget_cached_credential(&self) {}
}

/// Mapping from provider kind to the adapter available at runtime.
///
/// Kinds without an adapter are unsupported and rejected at login time.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    adapters: HashMap<ProviderKind, Arc<dyn ProviderAdapter>>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `adapter` under its own kind, replacing any previous adapter.
    #[must_use]
    pub fn with(mut self, adapter: Arc<dyn ProviderAdapter>) -> Self {
        self.register(adapter);
        self
    }

    pub fn register(&mut self, adapter: Arc<dyn ProviderAdapter>) {
        let kind = adapter.kind();
        if kind.is_none() {
            tracing::warn!("ignoring provider adapter registered under kind 'none'");
            return;
        }
        self.adapters.insert(kind, adapter);
    }

    #[must_use]
    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn ProviderAdapter>> {
        self.adapters.get(&kind).cloned()
    }

    #[must_use]
    pub fn supports(&self, kind: ProviderKind) -> bool {
        self.adapters.contains_key(&kind)
    }

    /// Supported kinds in declaration order.
    #[must_use]
    pub fn kinds(&self) -> Vec<ProviderKind> {
        ProviderKind::AUTHENTICATING
            .into_iter()
            .filter(|k| self.supports(*k))
            .collect()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(ProviderKind);

    #[async_trait]
    impl ProviderAdapter for Fixed {
        fn kind(&self) -> ProviderKind {
            self.0
        }

        async fn authenticate(&self, _: &AuthParams) -> Result<ProviderCredential, ProviderError> {
            Err(ProviderError::Cancelled)
        }
    }

    #[test]
    fn registry_reports_supported_kinds() {
        let registry = ProviderRegistry::new()
            .with(Arc::new(Fixed(ProviderKind::Device)))
            .with(Arc::new(Fixed(ProviderKind::SocialToken)));

        assert!(registry.supports(ProviderKind::Device));
        assert!(!registry.supports(ProviderKind::PlatformAccount));
        assert_eq!(
            registry.kinds(),
            vec![ProviderKind::SocialToken, ProviderKind::Device]
        );
    }

    #[test]
    fn registry_ignores_none_kind() {
        let registry = ProviderRegistry::new().with(Arc::new(Fixed(ProviderKind::None)));
        assert!(registry.kinds().is_empty());
        assert!(registry.get(ProviderKind::None).is_none());
    }

    #[tokio::test]
    async fn default_capabilities_are_conservative() {
        let adapter = Fixed(ProviderKind::Device);
        assert!(!adapter.has_cached_session().await);
        adapter.forget_cached_credential().await;
    }

    #[test]
    fn silent_params_are_not_interactive() {
        assert!(AuthParams::default().interactive);
        assert!(!AuthParams::silent().interactive);
    }
}
