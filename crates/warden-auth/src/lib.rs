//! # warden-auth
//!
//! Login orchestration for Warden.
//!
//! Identity providers ([`ProviderAdapter`]) produce a credential, the backend
//! ([`BackendClient`]) exchanges it for an entitlement session, and the
//! [`SessionStore`] publishes that session to everything else. The
//! [`AuthOrchestrator`] ties the three together and guarantees at most one
//! login is in flight.

pub mod backend;
pub mod device;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod preferences;
pub mod provider;
pub mod session_store;
pub mod token;

mod fs_util;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use backend::{AppStoreValidation, BackendClient, GooglePlayValidation};
pub use device::DeviceProvider;
pub use error::{AuthError, BackendError, ProviderError};
pub use http::HttpBackendClient;
pub use orchestrator::AuthOrchestrator;
pub use preferences::{FileProviderStore, MemoryProviderStore, ProviderPreferenceStore};
pub use provider::{AuthParams, ProviderAdapter, ProviderRegistry};
pub use session_store::SessionStore;
pub use token::{PlatformAccountProvider, SocialTokenProvider};
