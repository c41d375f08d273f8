use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ProviderKind;

/// Opaque credential proving an authenticated session to the backend.
///
/// Sent on every authorized call. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct EntitlementToken(String);

impl EntitlementToken {
    #[must_use]
    pub const fn new(raw: String) -> Self {
        Self(raw)
    }

    /// Raw token value for transport headers.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for EntitlementToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EntitlementToken(<redacted>)")
    }
}

/// An authenticated backend session.
///
/// Produced by the backend client after a successful credential exchange and
/// owned by the session store until logout.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Session {
    /// Backend player identifier.
    pub player_id: String,
    pub entitlement_token: EntitlementToken,
    /// Provider that produced the credential for this session.
    pub provider_kind: ProviderKind,
    /// Whether the backend created the account during this login.
    #[serde(default)]
    pub newly_created: bool,
    pub created_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn new(
        player_id: impl Into<String>,
        entitlement_token: EntitlementToken,
        provider_kind: ProviderKind,
    ) -> Self {
        Self {
            player_id: player_id.into(),
            entitlement_token,
            provider_kind,
            newly_created: false,
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_newly_created(mut self, newly_created: bool) -> Self {
        self.newly_created = newly_created;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_debug_is_redacted() {
        let session = Session::new(
            "P-1",
            EntitlementToken::new("ticket-abc".into()),
            ProviderKind::Device,
        );
        let rendered = format!("{session:?}");
        assert!(rendered.contains("P-1"));
        assert!(!rendered.contains("ticket-abc"));
    }

    #[test]
    fn token_serializes_transparently() {
        let token = EntitlementToken::new("ticket-abc".into());
        assert_eq!(serde_json::to_string(&token).unwrap(), "\"ticket-abc\"");
        assert_eq!(token.expose(), "ticket-abc");
    }
}
