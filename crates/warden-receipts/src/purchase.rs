//! Purchase notifications from the platform store.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A purchase the platform store reports as completed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PurchaseEvent {
    /// `None` when the store reports a purchase for a product it does not know.
    pub product: Option<PurchasedProduct>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchasedProduct {
    pub product_id: String,
    pub transaction_id: String,
    /// Raw receipt envelope as handed over by the store.
    pub receipt: String,
    pub iso_currency_code: String,
    /// Price in major units of `iso_currency_code` (e.g. `1.99`).
    pub localized_price: f64,
}

impl PurchaseEvent {
    #[must_use]
    pub const fn new(product: PurchasedProduct) -> Self {
        Self {
            product: Some(product),
        }
    }
}

/// What to tell the platform store about a processed purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum PurchaseCompletion {
    /// Finish the transaction on the store side.
    Complete,
}

/// Convert a major-unit price to minor units (`1.99` → `199`).
///
/// Rounds to the nearest minor unit so binary float error (`1.99 * 100 =
/// 198.999...`) does not lose a cent.
///
/// # Errors
///
/// `ValidationError::MalformedReceipt` for negative, non-finite, or
/// out-of-range prices.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn price_in_minor_units(localized_price: f64) -> Result<u32, ValidationError> {
    if !localized_price.is_finite() || localized_price < 0.0 {
        return Err(ValidationError::malformed(format!(
            "invalid price {localized_price}"
        )));
    }
    let minor = (localized_price * 100.0).round();
    if minor > f64::from(u32::MAX) {
        return Err(ValidationError::malformed(format!(
            "price {localized_price} out of range"
        )));
    }
    Ok(minor as u32)
}
