//! Anonymous device-identifier provider.

use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use warden_core::{ProviderCredential, ProviderKind};

use crate::error::{AuthError, ProviderError};
use crate::provider::{AuthParams, ProviderAdapter};

const DEVICE_ID_FILE_NAME: &str = "device_id";

/// Logs in with a stable per-install identifier. Always able to log in
/// silently, so it reports a cached session whenever it has an id.
#[derive(Debug, Clone)]
pub struct DeviceProvider {
    device_id: String,
}

impl DeviceProvider {
    #[must_use]
    pub const fn new(device_id: String) -> Self {
        Self { device_id }
    }

    /// Read the device id from `path`, generating and storing a new one if the
    /// file is missing or empty.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Persistence` if a new id cannot be generated or written.
    pub fn load_or_create(path: &Path) -> Result<Self, AuthError> {
        if let Ok(existing) = fs::read_to_string(path) {
            let existing = existing.trim();
            if !existing.is_empty() {
                return Ok(Self::new(existing.to_string()));
            }
        }

        let device_id = generate_device_id()?;
        crate::fs_util::write_private(path, &device_id)?;
        tracing::info!(path = %path.display(), "generated new device id");
        Ok(Self::new(device_id))
    }

    /// Default id file under `~/.warden`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        crate::preferences::warden_home().map(|dir| dir.join(DEVICE_ID_FILE_NAME))
    }

    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }
}

/// 16 random bytes, hex encoded.
fn generate_device_id() -> Result<String, AuthError> {
    let mut bytes = [0u8; 16];
    getrandom::fill(&mut bytes)
        .map_err(|e| AuthError::Persistence(format!("failed to generate device id: {e}")))?;
    Ok(bytes.iter().map(|b| format!("{b:02x}")).collect())
}

#[async_trait]
impl ProviderAdapter for DeviceProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Device
    }

    async fn authenticate(&self, _params: &AuthParams) -> Result<ProviderCredential, ProviderError> {
        if self.device_id.is_empty() {
            return Err(ProviderError::Failed("device id is empty".into()));
        }
        Ok(ProviderCredential::Device {
            device_id: self.device_id.clone(),
        })
    }

    async fn has_cached_session(&self) -> bool {
        !self.device_id.is_empty()
    }
}
