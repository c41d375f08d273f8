//! # warden-core
//!
//! Core types shared across all Warden crates.
//!
//! This crate owns the data model of the session orchestrator:
//! - Provider kinds and the credentials each identity provider produces
//! - The authenticated `Session` and its opaque entitlement token
//! - Immutable inventory snapshots published by the inventory cache
//! - Purchase receipt envelopes and validation outcomes
//! - Notification events emitted by the auth and inventory components
//! - Cross-cutting error types

pub mod credential;
pub mod enums;
pub mod errors;
pub mod events;
pub mod inventory;
pub mod receipt;
pub mod session;

pub use credential::ProviderCredential;
pub use enums::{ProviderKind, ReceiptStore};
pub use errors::CoreError;
pub use events::{AuthEvent, InventoryEvent};
pub use inventory::InventorySnapshot;
pub use receipt::{GooglePlayPayload, PurchaseReceiptEnvelope, ValidationOutcome};
pub use session::{EntitlementToken, Session};
