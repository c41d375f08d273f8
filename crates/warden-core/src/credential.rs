use std::fmt;

use crate::enums::ProviderKind;

/// Credential produced by a provider adapter, exchanged with the backend for a
/// [`Session`](crate::Session).
///
/// Not serializable: credentials are handed straight to the backend client and
/// never persisted by this core. `Debug` output redacts secret material.
#[derive(Clone, PartialEq, Eq)]
pub enum ProviderCredential {
    /// Access token from a social network login.
    SocialToken { token: String },
    /// One-shot server auth code from a platform account service.
    PlatformAccount { server_auth_code: String },
    /// Username and password for the backend's own account system.
    Password { username: String, password: String },
    /// Anonymous device identifier.
    Device { device_id: String },
}

impl ProviderCredential {
    /// The provider kind this credential belongs to.
    #[must_use]
    pub const fn kind(&self) -> ProviderKind {
        match self {
            Self::SocialToken { .. } => ProviderKind::SocialToken,
            Self::PlatformAccount { .. } => ProviderKind::PlatformAccount,
            Self::Password { .. } => ProviderKind::Password,
            Self::Device { .. } => ProviderKind::Device,
        }
    }
}

impl fmt::Debug for ProviderCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SocialToken { .. } => f
                .debug_struct("SocialToken")
                .field("token", &"<redacted>")
                .finish(),
            Self::PlatformAccount { .. } => f
                .debug_struct("PlatformAccount")
                .field("server_auth_code", &"<redacted>")
                .finish(),
            Self::Password { username, .. } => f
                .debug_struct("Password")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Device { device_id } => f
                .debug_struct("Device")
                .field("device_id", device_id)
                .finish(),
        }
    }
}
