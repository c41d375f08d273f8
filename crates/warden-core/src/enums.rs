//! Provider and store enums for Warden.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`
//! and expose `as_str()` for logging and persistence.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// ProviderKind
// ---------------------------------------------------------------------------

/// Identity provider used for a login.
///
/// Persisted as the "last login method" so auto-login knows which provider to
/// ask for a cached local session. `None` means no provider is remembered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    None,
    SocialToken,
    PlatformAccount,
    Password,
    Device,
}

impl ProviderKind {
    /// Every kind that can actually authenticate (excludes `None`).
    pub const AUTHENTICATING: [Self; 4] = [
        Self::SocialToken,
        Self::PlatformAccount,
        Self::Password,
        Self::Device,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::SocialToken => "social_token",
            Self::PlatformAccount => "platform_account",
            Self::Password => "password",
            Self::Device => "device",
        }
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "none" => Ok(Self::None),
            "social_token" | "social" => Ok(Self::SocialToken),
            "platform_account" | "platform" => Ok(Self::PlatformAccount),
            "password" => Ok(Self::Password),
            "device" => Ok(Self::Device),
            other => Err(CoreError::UnknownProviderKind(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// ReceiptStore
// ---------------------------------------------------------------------------

/// Store that issued a purchase receipt.
///
/// Serialized with the store names used in platform receipt envelopes
/// (`"GooglePlay"`, `"AppleAppStore"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ReceiptStore {
    GooglePlay,
    AppleAppStore,
}

impl ReceiptStore {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GooglePlay => "GooglePlay",
            Self::AppleAppStore => "AppleAppStore",
        }
    }
}

impl fmt::Display for ReceiptStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReceiptStore {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GooglePlay" => Ok(Self::GooglePlay),
            "AppleAppStore" => Ok(Self::AppleAppStore),
            other => Err(CoreError::UnknownStore(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected_str:expr) => {
            #[test]
            fn $name() {
                let val = $variant;
                let json = serde_json::to_string(&val).unwrap();
                assert_eq!(json, format!("\"{}\"", $expected_str));
                let recovered: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(recovered, val);
            }
        };
    }

    test_serde_roundtrip!(provider_none, ProviderKind, ProviderKind::None, "none");
    test_serde_roundtrip!(
        provider_social,
        ProviderKind,
        ProviderKind::SocialToken,
        "social_token"
    );
    test_serde_roundtrip!(
        provider_platform,
        ProviderKind,
        ProviderKind::PlatformAccount,
        "platform_account"
    );
    test_serde_roundtrip!(provider_device, ProviderKind, ProviderKind::Device, "device");
    test_serde_roundtrip!(
        store_google,
        ReceiptStore,
        ReceiptStore::GooglePlay,
        "GooglePlay"
    );
    test_serde_roundtrip!(
        store_apple,
        ReceiptStore,
        ReceiptStore::AppleAppStore,
        "AppleAppStore"
    );

    #[test]
    fn provider_kind_parses_its_own_display() {
        for kind in ProviderKind::AUTHENTICATING {
            assert_eq!(kind.to_string().parse::<ProviderKind>().unwrap(), kind);
        }
        assert_eq!("".parse::<ProviderKind>().unwrap(), ProviderKind::None);
    }

    #[test]
    fn provider_kind_rejects_unknown() {
        let err = "carrier_pigeon".parse::<ProviderKind>().unwrap_err();
        assert!(err.to_string().contains("carrier_pigeon"));
    }

    #[test]
    fn receipt_store_rejects_unknown() {
        assert!("Steam".parse::<ReceiptStore>().is_err());
        assert_eq!(
            "AppleAppStore".parse::<ReceiptStore>().unwrap(),
            ReceiptStore::AppleAppStore
        );
    }

    #[test]
    fn default_provider_is_none() {
        assert!(ProviderKind::default().is_none());
    }
}
