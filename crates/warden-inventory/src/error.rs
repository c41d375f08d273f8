use thiserror::Error;
use warden_auth::BackendError;

/// Cloneable so every waiter of a shared poll receives the same failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("no authenticated session")]
    NotAuthenticated,

    /// The refresh failed; the previously published snapshot is still served.
    #[error("inventory refresh failed, cached snapshot is stale: {0}")]
    Stale(String),

    #[error("purchase rejected: {0}")]
    PurchaseRejected(String),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("invalid request: {0}")]
    InvalidInput(String),
}
