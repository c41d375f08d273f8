//! Server-side verification of store purchase receipts.
//!
//! ```text
//! PurchaseEvent
//!   └─ skip? (purchasing not initialized / no product / empty receipt) → accepted no-op
//!   └─ parse envelope ─┬─ GooglePlay     → nested {json, signature} → ValidateGooglePlayPurchase
//!                      ├─ AppleAppStore  → base64 payload           → ValidateIOSReceipt
//!                      └─ anything else  → "unsupported store"
//! ```
//!
//! Validation never fails the purchase itself: [`ReceiptValidator::complete_purchase`]
//! always tells the store to complete and reports the outcome alongside.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use warden_auth::{AppStoreValidation, BackendClient, GooglePlayValidation, SessionStore};
use warden_core::{
    GooglePlayPayload, PurchaseReceiptEnvelope, ReceiptStore, Session, ValidationOutcome,
};

use crate::error::ValidationError;
use crate::purchase::{PurchaseCompletion, PurchaseEvent, PurchasedProduct, price_in_minor_units};

pub struct ReceiptValidator {
    backend: Arc<dyn BackendClient>,
    sessions: SessionStore,
    purchasing_initialized: Arc<AtomicBool>,
}

impl ReceiptValidator {
    /// A validator whose purchasing subsystem starts uninitialized.
    pub fn new(backend: Arc<dyn BackendClient>, sessions: SessionStore) -> Self {
        Self {
            backend,
            sessions,
            purchasing_initialized: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share the "purchasing initialized" flag with the store integration that
    /// owns it.
    #[must_use]
    pub fn with_initialized_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.purchasing_initialized = flag;
        self
    }

    pub fn set_purchasing_initialized(&self, initialized: bool) {
        self.purchasing_initialized
            .store(initialized, Ordering::Release);
    }

    #[must_use]
    pub fn is_purchasing_initialized(&self) -> bool {
        self.purchasing_initialized.load(Ordering::Acquire)
    }

    /// Handle a store purchase: validate it, then tell the store to complete.
    pub async fn complete_purchase(
        &self,
        event: &PurchaseEvent,
    ) -> (PurchaseCompletion, ValidationOutcome) {
        let outcome = self.validate(event).await;
        if !outcome.accepted {
            tracing::warn!(
                reason = outcome.reason.as_deref().unwrap_or_default(),
                "completing purchase that failed validation",
            );
        }
        (PurchaseCompletion::Complete, outcome)
    }

    /// Validate one purchase with the backend. Never fails: every problem is
    /// folded into the returned outcome.
    pub async fn validate(&self, event: &PurchaseEvent) -> ValidationOutcome {
        if !self.is_purchasing_initialized() {
            tracing::warn!("purchase received before purchasing was initialized; ignoring");
            return ValidationOutcome::accepted();
        }
        let Some(product) = &event.product else {
            tracing::warn!("purchase for unknown product; ignoring");
            return ValidationOutcome::accepted();
        };
        if product.receipt.is_empty() {
            tracing::warn!(product_id = %product.product_id, "purchase without receipt; ignoring");
            return ValidationOutcome::accepted();
        }

        tracing::debug!(
            product_id = %product.product_id,
            transaction_id = %product.transaction_id,
            "validating purchase",
        );
        match self.validate_product(product).await {
            Ok(()) => {
                tracing::info!(transaction_id = %product.transaction_id, "purchase validated");
                ValidationOutcome::accepted()
            }
            Err(error) => {
                if let ValidationError::MalformedReceipt { detail } = &error {
                    tracing::debug!(%detail, "receipt rejected as malformed");
                }
                tracing::warn!(
                    transaction_id = %product.transaction_id,
                    %error,
                    "purchase validation failed",
                );
                error.into()
            }
        }
    }

    async fn validate_product(&self, product: &PurchasedProduct) -> Result<(), ValidationError> {
        let envelope = PurchaseReceiptEnvelope::parse(&product.receipt)?;
        let purchase_price = price_in_minor_units(product.localized_price)?;
        let currency_code = product.iso_currency_code.clone();

        match envelope.store {
            ReceiptStore::GooglePlay => {
                let payload = GooglePlayPayload::parse(&envelope.payload)?;
                let request = GooglePlayValidation {
                    currency_code,
                    purchase_price,
                    receipt_json: payload.json,
                    signature: payload.signature,
                };
                let session = self.require_session()?;
                self.backend
                    .validate_google_play_purchase(&session, &request)
                    .await?;
            }
            ReceiptStore::AppleAppStore => {
                if envelope.payload.is_empty() {
                    return Err(ValidationError::malformed("empty app store payload"));
                }
                STANDARD
                    .decode(&envelope.payload)
                    .map_err(|e| ValidationError::malformed(format!("app store payload: {e}")))?;
                let request = AppStoreValidation {
                    currency_code,
                    purchase_price,
                    receipt_data: envelope.payload,
                };
                let session = self.require_session()?;
                self.backend
                    .validate_app_store_purchase(&session, &request)
                    .await?;
            }
        }
        Ok(())
    }

    fn require_session(&self) -> Result<Arc<Session>, ValidationError> {
        self.sessions
            .current()
            .ok_or(ValidationError::NotAuthenticated)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use warden_auth::testing::{ScriptedBackend, ValidationCall};
    use warden_core::{EntitlementToken, ProviderKind};

    use super::*;

    fn product(receipt: &str) -> PurchaseEvent {
        PurchaseEvent::new(PurchasedProduct {
            product_id: "gems_100".into(),
            transaction_id: "T-1".into(),
            receipt: receipt.into(),
            iso_currency_code: "USD".into(),
            localized_price: 1.99,
        })
    }

    fn ready() -> (ReceiptValidator, Arc<ScriptedBackend>) {
        let backend = Arc::new(ScriptedBackend::new());
        let sessions = SessionStore::new();
        sessions.install(Session::new(
            "player-1",
            EntitlementToken::new("ticket-1".into()),
            ProviderKind::Device,
        ));
        let validator = ReceiptValidator::new(backend.clone(), sessions);
        validator.set_purchasing_initialized(true);
        (validator, backend)
    }

    #[tokio::test]
    async fn uninitialized_purchasing_is_a_no_op() {
        let (validator, backend) = ready();
        validator.set_purchasing_initialized(false);

        let outcome = validator.validate(&product("{not json")).await;

        assert_eq!(outcome, ValidationOutcome::accepted());
        assert!(backend.validations().is_empty());
    }

    #[tokio::test]
    async fn missing_product_or_receipt_is_a_no_op() {
        let (validator, backend) = ready();

        assert!(validator.validate(&PurchaseEvent::default()).await.accepted);
        assert!(validator.validate(&product("")).await.accepted);
        assert!(backend.validations().is_empty());
    }

    #[tokio::test]
    async fn shared_flag_controls_initialization() {
        let backend = Arc::new(ScriptedBackend::new());
        let flag = Arc::new(AtomicBool::new(false));
        let validator = ReceiptValidator::new(backend, SessionStore::new())
            .with_initialized_flag(Arc::clone(&flag));

        assert!(!validator.is_purchasing_initialized());
        flag.store(true, Ordering::Release);
        assert!(validator.is_purchasing_initialized());
    }

    #[tokio::test]
    async fn app_store_payload_must_be_base64() {
        let (validator, backend) = ready();
        let receipt = r#"{"Store":"AppleAppStore","TransactionID":"T-1","Payload":"%%% not base64"}"#;

        let outcome = validator.validate(&product(receipt)).await;

        assert_eq!(outcome, ValidationOutcome::rejected("malformed receipt"));
        assert!(backend.validations().is_empty());
    }

    #[tokio::test]
    async fn app_store_receipt_is_forwarded() {
        let (validator, backend) = ready();
        let receipt = r#"{"Store":"AppleAppStore","TransactionID":"T-1","Payload":"TUlJVE5BIGZha2UgcmVjZWlwdA=="}"#;

        let outcome = validator.validate(&product(receipt)).await;

        assert_eq!(outcome, ValidationOutcome::accepted());
        assert_eq!(
            backend.validations(),
            vec![ValidationCall::AppStore(AppStoreValidation {
                currency_code: "USD".into(),
                purchase_price: 199,
                receipt_data: "TUlJVE5BIGZha2UgcmVjZWlwdA==".into(),
            })]
        );
    }

    #[tokio::test]
    async fn complete_purchase_is_fail_open() {
        let (validator, backend) = ready();
        backend.reject_validations(Some(warden_auth::BackendError::Rejected {
            code: 400,
            message: "InvalidReceipt".into(),
        }));
        let receipt = r#"{"Store":"AppleAppStore","TransactionID":"T-1","Payload":"TUlJ"}"#;

        let (completion, outcome) = validator.complete_purchase(&product(receipt)).await;

        assert_eq!(completion, PurchaseCompletion::Complete);
        assert_eq!(outcome, ValidationOutcome::rejected("InvalidReceipt"));
    }
}
