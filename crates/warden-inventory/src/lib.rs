//! # warden-inventory
//!
//! Player inventory for Warden: a polled, immutable [`InventorySnapshot`]
//! behind single-flight refreshes, plus the server-side writes that change it
//! (currency credits, item purchases, ad rewards).
//!
//! Writes never patch the local snapshot. They mark it dirty and the next
//! refresh reads server truth.
//!
//! [`InventorySnapshot`]: warden_core::InventorySnapshot

mod cache;
mod commerce;
pub mod error;
mod refresh;

pub use cache::{InventoryCache, PollOutcome};
pub use error::InventoryError;
pub use refresh::RefreshLoop;
