//! Cross-cutting error types for Warden.
//!
//! Component errors (`AuthError`, `BackendError`, `InventoryError`,
//! `ValidationError`) live in their own crates.

use thiserror::Error;

/// Errors that can be raised while building or parsing core types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Persisted or user-supplied provider name is not recognized.
    #[error("unknown provider kind: {0}")]
    UnknownProviderKind(String),

    /// Receipt envelope names a store this core cannot validate.
    #[error("unknown receipt store: {0}")]
    UnknownStore(String),

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_compare_and_render() {
        let err: Result<crate::ProviderKind, _> = "carrier_pigeon".parse();
        assert_eq!(
            err,
            Err(CoreError::UnknownProviderKind("carrier_pigeon".into()))
        );
        assert_eq!(
            CoreError::UnknownStore("Steam".into()).to_string(),
            "unknown receipt store: Steam"
        );
    }
}
