use thiserror::Error;
use warden_core::ProviderKind;

/// Failure reported by an identity provider adapter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProviderError {
    /// The user dismissed the provider's login dialog.
    #[error("login cancelled by user")]
    Cancelled,

    #[error("provider failed: {0}")]
    Failed(String),
}

/// Failure talking to the remote identity/commerce backend.
///
/// Cloneable so one failure can be reported to every waiter of a shared call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// The backend answered with an error envelope.
    #[error("backend rejected request ({code}): {message}")]
    Rejected { code: u16, message: String },

    /// A server-side function ran but reported an error.
    #[error("server function '{function}' failed: {message}")]
    FunctionFailed { function: String, message: String },

    #[error("backend unreachable: {0}")]
    Transport(String),

    #[error("malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("backend not configured: {0}")]
    NotConfigured(String),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("a login is already in progress")]
    AlreadyInProgress,

    #[error("provider '{0}' is not available in this build")]
    UnsupportedProvider(ProviderKind),

    #[error("login cancelled by user")]
    Cancelled,

    #[error("provider login failed: {0}")]
    Provider(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("invalid login input: {0}")]
    InvalidInput(String),

    /// `logout()` ran while this login was waiting on the backend.
    #[error("logged out while login was in flight; session discarded")]
    LoggedOutDuringLogin,

    #[error("preference store error: {0}")]
    Persistence(String),
}

impl From<ProviderError> for AuthError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::Cancelled => Self::Cancelled,
            ProviderError::Failed(reason) => Self::Provider(reason),
        }
    }
}
