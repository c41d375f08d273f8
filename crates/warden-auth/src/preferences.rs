//! Durable "last login method" used to pick the auto-login provider.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use warden_core::ProviderKind;

use crate::error::AuthError;

const PREFERENCE_FILE_NAME: &str = "last_provider";

pub trait ProviderPreferenceStore: Send + Sync {
    /// Remember `kind` as the provider to use for the next auto-login.
    ///
    /// Saving `ProviderKind::None` forgets the preference.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Persistence` if the preference cannot be written.
    fn save_last_provider(&self, kind: ProviderKind) -> Result<(), AuthError>;

    /// The remembered provider, or `ProviderKind::None`.
    fn load_last_provider(&self) -> ProviderKind;
}

/// File-backed preference (`~/.warden/last_provider` by default).
#[derive(Debug, Clone)]
pub struct FileProviderStore {
    path: PathBuf,
}

impl FileProviderStore {
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store under the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Persistence` if the home directory cannot be found.
    pub fn default_location() -> Result<Self, AuthError> {
        warden_home()
            .map(|dir| Self::new(dir.join(PREFERENCE_FILE_NAME)))
            .ok_or_else(|| {
                AuthError::Persistence("home directory not found, cannot store preference".into())
            })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// `~/.warden`, where per-user state lives.
#[must_use]
pub fn warden_home() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".warden"))
}

impl ProviderPreferenceStore for FileProviderStore {
    fn save_last_provider(&self, kind: ProviderKind) -> Result<(), AuthError> {
        if kind.is_none() {
            if self.path.exists() {
                fs::remove_file(&self.path).map_err(|e| {
                    AuthError::Persistence(format!("failed to delete {}: {e}", self.path.display()))
                })?;
            }
            return Ok(());
        }
        crate::fs_util::write_private(&self.path, kind.as_str())
    }

    fn load_last_provider(&self) -> ProviderKind {
        let Ok(content) = fs::read_to_string(&self.path) else {
            return ProviderKind::None;
        };
        content.trim().parse().unwrap_or_else(|error| {
            tracing::warn!(%error, path = %self.path.display(), "ignoring unreadable provider preference");
            ProviderKind::None
        })
    }
}

/// Process-local preference, for tests and embedders without a filesystem.
#[derive(Debug, Default)]
pub struct MemoryProviderStore {
    kind: Mutex<ProviderKind>,
}

impl MemoryProviderStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_provider(kind: ProviderKind) -> Self {
        Self {
            kind: Mutex::new(kind),
        }
    }
}

impl ProviderPreferenceStore for MemoryProviderStore {
    fn save_last_provider(&self, kind: ProviderKind) -> Result<(), AuthError> {
        *self.kind.lock() = kind;
        Ok(())
    }

    fn load_last_provider(&self) -> ProviderKind {
        *self.kind.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_save_load_forget_cycle() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = FileProviderStore::new(tmp.path().join("nested").join(PREFERENCE_FILE_NAME));

        assert_eq!(store.load_last_provider(), ProviderKind::None);

        store.save_last_provider(ProviderKind::SocialToken).expect("save");
        assert_eq!(store.load_last_provider(), ProviderKind::SocialToken);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(store.path())
                .expect("metadata")
                .permissions()
                .mode()
                & 0o777;
            assert_eq!(mode, 0o600, "preference file should be 0600");
        }

        store.save_last_provider(ProviderKind::None).expect("forget");
        assert!(!store.path().exists());
        assert_eq!(store.load_last_provider(), ProviderKind::None);
    }

    #[test]
    fn file_store_ignores_garbage() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let path = tmp.path().join(PREFERENCE_FILE_NAME);
        std::fs::write(&path, "carrier_pigeon").expect("write");

        assert_eq!(FileProviderStore::new(path).load_last_provider(), ProviderKind::None);
    }

    #[test]
    fn default_location_is_under_home() {
        let store = FileProviderStore::default_location().expect("should resolve");
        assert!(store.path().ends_with(".warden/last_provider"));
    }

    #[test]
    fn memory_store_roundtrip() {
        let store = MemoryProviderStore::with_provider(ProviderKind::Device);
        assert_eq!(store.load_last_provider(), ProviderKind::Device);
        store.save_last_provider(ProviderKind::Password).unwrap();
        assert_eq!(store.load_last_provider(), ProviderKind::Password);
    }
}
