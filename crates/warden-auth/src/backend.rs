//! Capability boundary to the remote identity and commerce service.
//!
//! [`BackendClient`] is the only seam through which Warden talks to the
//! server. [`crate::http::HttpBackendClient`] implements it over HTTPS; tests
//! substitute scripted implementations.

use async_trait::async_trait;
use warden_core::{InventorySnapshot, ProviderCredential, Session};

use crate::error::BackendError;

/// Google Play purchase to verify server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GooglePlayValidation {
    /// ISO 4217 currency code of the store price.
    pub currency_code: String,
    /// Price in minor units (price × 100).
    pub purchase_price: u32,
    /// Signed purchase JSON from the store.
    pub receipt_json: String,
    pub signature: String,
}

/// App Store purchase to verify server-side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppStoreValidation {
    pub currency_code: String,
    pub purchase_price: u32,
    /// Base64 receipt blob as delivered by the store.
    pub receipt_data: String,
}

#[async_trait]
pub trait BackendClient: Send + Sync {
    /// Exchange a provider credential for a session.
    async fn login(
        &self,
        credential: &ProviderCredential,
        create_account: bool,
    ) -> Result<Session, BackendError>;

    async fn login_with_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Session, BackendError>;

    async fn register(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<Session, BackendError>;

    async fn validate_google_play_purchase(
        &self,
        session: &Session,
        request: &GooglePlayValidation,
    ) -> Result<(), BackendError>;

    async fn validate_app_store_purchase(
        &self,
        session: &Session,
        request: &AppStoreValidation,
    ) -> Result<(), BackendError>;

    async fn get_inventory(&self, session: &Session) -> Result<InventorySnapshot, BackendError>;

    /// Add `amount` of `code` to the player's balance. Returns the new balance.
    async fn credit_currency(
        &self,
        session: &Session,
        code: &str,
        amount: u32,
    ) -> Result<u64, BackendError>;

    /// Run a named server-side function and return its result payload.
    async fn execute_function(
        &self,
        session: &Session,
        name: &str,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, BackendError>;
}
