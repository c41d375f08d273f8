//! Purchase receipt envelopes and validation outcomes.
//!
//! Platform purchase systems hand over a JSON envelope:
//!
//! ```json
//! {"Store":"GooglePlay","TransactionID":"GPA.1234","Payload":"{\"json\":\"...\",\"signature\":\"...\"}"}
//! ```
//!
//! The envelope names the issuing store; the payload format varies by store.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ReceiptStore;
use crate::errors::CoreError;

/// Parsed store receipt, consumed once by the receipt validator.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct PurchaseReceiptEnvelope {
    pub store: ReceiptStore,
    pub transaction_id: String,
    /// Store-specific blob (nested JSON for Google Play, base64 for the App Store).
    pub payload: String,
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(rename = "Store", alias = "store")]
    store: String,
    #[serde(
        rename = "TransactionID",
        alias = "transactionId",
        alias = "transaction_id",
        default
    )]
    transaction_id: String,
    #[serde(rename = "Payload", alias = "payload", default)]
    payload: serde_json::Value,
}

impl PurchaseReceiptEnvelope {
    /// Parse a raw platform receipt.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the receipt is not a JSON envelope,
    /// and `CoreError::UnknownStore` if it names a store other than Google Play
    /// or the App Store.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        let envelope: RawEnvelope = serde_json::from_str(raw)
            .map_err(|e| CoreError::Validation(format!("receipt envelope: {e}")))?;
        let store = envelope.store.parse::<ReceiptStore>()?;

        let payload = match envelope.payload {
            serde_json::Value::Null => String::new(),
            serde_json::Value::String(s) => s,
            // Some platforms inline the payload object instead of a JSON string.
            other => other.to_string(),
        };

        Ok(Self {
            store,
            transaction_id: envelope.transaction_id,
            payload,
        })
    }
}

/// Google Play payload nested inside the envelope: the signed purchase JSON and
/// its signature.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct GooglePlayPayload {
    pub json: String,
    pub signature: String,
}

impl GooglePlayPayload {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` if the payload is not JSON or lacks the
    /// signed JSON or signature.
    pub fn parse(payload: &str) -> Result<Self, CoreError> {
        let parsed: Self = serde_json::from_str(payload)
            .map_err(|e| CoreError::Validation(format!("google play payload: {e}")))?;
        if parsed.json.is_empty() || parsed.signature.is_empty() {
            return Err(CoreError::Validation(
                "google play payload missing json or signature".into(),
            ));
        }
        Ok(parsed)
    }
}

/// Result of validating one purchase with the backend.
///
/// `reason` is present exactly when the purchase was rejected.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub accepted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ValidationOutcome {
    #[must_use]
    pub const fn accepted() -> Self {
        Self {
            accepted: true,
            reason: None,
        }
    }

    #[must_use]
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            accepted: false,
            reason: Some(reason.into()),
        }
    }
}
