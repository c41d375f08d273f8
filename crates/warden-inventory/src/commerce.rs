//! Server-side inventory writes: currency credits, item purchases, ad rewards.
//!
//! None of these touch the local snapshot. A successful write marks the cache
//! dirty so the next tick fetches server truth.

use std::sync::Arc;

use serde::Deserialize;
use tokio::task::JoinHandle;
use warden_core::{InventoryEvent, Session};

use crate::cache::InventoryCache;
use crate::error::InventoryError;

const BUY_ITEM: &str = "buyItem";
const BUY_ITEM_WITH_CURRENCY: &str = "buyItemWithCurrencyId";
const SAVE_ADS_REWARD: &str = "saveAdsReward";

/// Result payload of the purchase functions.
#[derive(Debug, Default, Deserialize)]
struct PurchaseResult {
    #[serde(rename = "Error", default)]
    error: Option<String>,
    #[serde(rename = "ItemId", default)]
    item_ids: Vec<String>,
}

impl InventoryCache {
    /// Grant `amount` of currency `code` server-side. Returns the new balance
    /// as reported by the backend.
    ///
    /// # Errors
    ///
    /// - `InventoryError::InvalidInput` for an empty code or a zero amount
    /// - `InventoryError::NotAuthenticated` without a live session
    /// - `InventoryError::Backend` if the backend refuses (an `Error` event is
    ///   emitted as well)
    pub async fn credit_currency(&self, code: &str, amount: u32) -> Result<u64, InventoryError> {
        if code.trim().is_empty() {
            return Err(InventoryError::InvalidInput("currency code is empty".into()));
        }
        if amount == 0 {
            return Err(InventoryError::InvalidInput(
                "credit amount must be positive".into(),
            ));
        }
        let session = self.require_session()?;

        match self
            .inner
            .backend
            .credit_currency(&session, code, amount)
            .await
        {
            Ok(balance) => {
                tracing::info!(code, amount, balance, "currency credited");
                self.invalidate();
                Ok(balance)
            }
            Err(error) => Err(self.report(error.into())),
        }
    }

    /// Fire-and-forget [`Self::credit_currency`] on a detached task.
    ///
    /// Failures still surface as `Error` events; the handle may be ignored.
    pub fn spawn_credit_currency(
        &self,
        code: impl Into<String>,
        amount: u32,
    ) -> JoinHandle<Result<u64, InventoryError>> {
        let cache = self.clone();
        let code = code.into();
        tokio::spawn(async move { cache.credit_currency(&code, amount).await })
    }

    /// Buy a catalog item with virtual currency, optionally naming which
    /// currency to pay with. Returns the granted item ids.
    ///
    /// # Errors
    ///
    /// - `InventoryError::PurchaseRejected` if the server-side function reports
    ///   an error (e.g. insufficient funds)
    /// - `InventoryError::NotAuthenticated`, `InventoryError::Backend`,
    ///   `InventoryError::InvalidInput` as for [`Self::credit_currency`]
    pub async fn purchase_item(
        &self,
        item_id: &str,
        currency: Option<&str>,
    ) -> Result<Vec<String>, InventoryError> {
        if item_id.trim().is_empty() {
            return Err(InventoryError::InvalidInput("item id is empty".into()));
        }
        let session = self.require_session()?;

        let (function, args) = match currency {
            Some(currency_id) => (
                BUY_ITEM_WITH_CURRENCY,
                serde_json::json!({ "itemId": item_id, "currencyId": currency_id }),
            ),
            None => (BUY_ITEM, serde_json::json!({ "itemId": item_id })),
        };

        let value = match self
            .inner
            .backend
            .execute_function(&session, function, args)
            .await
        {
            Ok(value) => value,
            Err(error) => return Err(self.report(error.into())),
        };

        let result = if value.is_null() {
            PurchaseResult::default()
        } else {
            serde_json::from_value::<PurchaseResult>(value).map_err(|e| {
                self.report(InventoryError::PurchaseRejected(format!(
                    "unreadable {function} result: {e}"
                )))
            })?
        };

        if let Some(error) = result.error.filter(|e| !e.is_empty()) {
            tracing::warn!(item_id, %error, "purchase rejected");
            return Err(InventoryError::PurchaseRejected(error));
        }

        tracing::info!(item_id, granted = result.item_ids.len(), "purchase succeeded");
        self.invalidate();
        Ok(result.item_ids)
    }

    /// Record that the player finished watching a rewarded ad.
    ///
    /// # Errors
    ///
    /// `InventoryError::NotAuthenticated` or `InventoryError::Backend`; backend
    /// failures are also emitted as `Error` events.
    pub async fn record_ad_reward(&self) -> Result<(), InventoryError> {
        let session = self.require_session()?;
        self.inner
            .backend
            .execute_function(&session, SAVE_ADS_REWARD, serde_json::Value::Null)
            .await
            .map_err(|error| self.report(error.into()))?;
        tracing::info!("ad reward recorded");
        self.invalidate();
        Ok(())
    }

    fn require_session(&self) -> Result<Arc<Session>, InventoryError> {
        self.inner
            .sessions
            .current()
            .ok_or(InventoryError::NotAuthenticated)
    }

    /// Emit `error` as an `Error` event and hand it back.
    fn report(&self, error: InventoryError) -> InventoryError {
        tracing::debug!(%error, "inventory write failed");
        self.inner.emit(InventoryEvent::Error {
            reason: error.to_string(),
        });
        error
    }
}
