//! # warden-receipts
//!
//! Validates platform store receipts (Google Play, App Store) with the Warden
//! backend so purchases are recorded against the player's account.

pub mod error;
pub mod purchase;
mod validator;

pub use error::ValidationError;
pub use purchase::{PurchaseCompletion, PurchaseEvent, PurchasedProduct, price_in_minor_units};
pub use validator::ReceiptValidator;
