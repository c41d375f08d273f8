//! Notification events broadcast to UI and game logic.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ProviderKind;

/// Login lifecycle notifications from the auth orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuthEvent {
    LoggingIn { provider: ProviderKind },
    LoginSucceeded { provider: ProviderKind, player_id: String },
    LoginCancelled { provider: ProviderKind },
    LoginFailed { provider: ProviderKind, reason: String },
    LoggedOut,
}

/// Refresh notifications from the inventory cache.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InventoryEvent {
    Refreshing,
    Refreshed,
    /// Fires once, after the first successful poll.
    RefreshedFirstTime,
    Error { reason: String },
}
