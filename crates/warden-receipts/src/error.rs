use thiserror::Error;
use warden_auth::BackendError;
use warden_core::{CoreError, ValidationOutcome};

/// Why a purchase was not accepted. Each variant maps to the `reason` of a
/// rejected [`ValidationOutcome`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// `detail` is for logs only; callers see "malformed receipt".
    #[error("malformed receipt")]
    MalformedReceipt { detail: String },

    #[error("unsupported store")]
    UnsupportedStore(String),

    #[error("not authenticated")]
    NotAuthenticated,

    /// The backend refused the receipt or could not be reached.
    #[error("{0}")]
    Rejected(String),
}

impl ValidationError {
    pub(crate) fn malformed(detail: impl Into<String>) -> Self {
        Self::MalformedReceipt {
            detail: detail.into(),
        }
    }
}

impl From<CoreError> for ValidationError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::UnknownStore(store) => Self::UnsupportedStore(store),
            other => Self::malformed(other.to_string()),
        }
    }
}

impl From<BackendError> for ValidationError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::Rejected { message, .. }
            | BackendError::FunctionFailed { message, .. } => Self::Rejected(message),
            other => Self::Rejected(other.to_string()),
        }
    }
}

impl From<ValidationError> for ValidationOutcome {
    fn from(error: ValidationError) -> Self {
        Self::rejected(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_reasons_are_stable() {
        let malformed: ValidationOutcome = ValidationError::malformed("bad json").into();
        assert_eq!(malformed.reason.as_deref(), Some("malformed receipt"));

        let store: ValidationOutcome = ValidationError::UnsupportedStore("Steam".into()).into();
        assert_eq!(store.reason.as_deref(), Some("unsupported store"));

        let auth: ValidationOutcome = ValidationError::NotAuthenticated.into();
        assert_eq!(auth.reason.as_deref(), Some("not authenticated"));
    }

    #[test]
    fn backend_rejection_keeps_server_message() {
        let err = ValidationError::from(BackendError::Rejected {
            code: 400,
            message: "ReceiptAlreadyUsed".into(),
        });
        assert_eq!(err, ValidationError::Rejected("ReceiptAlreadyUsed".into()));

        let err = ValidationError::from(BackendError::Transport("timed out".into()));
        assert_eq!(err.to_string(), "backend unreachable: timed out");
    }

    #[test]
    fn unknown_store_is_unsupported() {
        let err = ValidationError::from(CoreError::UnknownStore("Steam".into()));
        assert_eq!(err, ValidationError::UnsupportedStore("Steam".into()));
    }
}
