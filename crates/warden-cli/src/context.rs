use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use warden_auth::{
    AuthOrchestrator, DeviceProvider, FileProviderStore, HttpBackendClient,
    PlatformAccountProvider, ProviderPreferenceStore, ProviderRegistry, SessionStore,
    SocialTokenProvider,
};
use warden_config::WardenConfig;
use warden_core::{ProviderKind, Session};
use warden_inventory::InventoryCache;
use warden_receipts::ReceiptValidator;

const DEVICE_ID_FILE_NAME: &str = "device_id";

/// Components wired once per invocation. They share one session store.
pub struct AppContext {
    pub config: WardenConfig,
    pub sessions: SessionStore,
    pub preferences: Arc<FileProviderStore>,
    pub auth: AuthOrchestrator,
    pub inventory: InventoryCache,
    pub receipts: ReceiptValidator,
}

impl AppContext {
    pub fn init(config: WardenConfig) -> anyhow::Result<Self> {
        let backend_config = config.require_backend()?;
        let backend = Arc::new(
            HttpBackendClient::new(
                &backend_config.base_url,
                &backend_config.title_id,
                backend_config.request_timeout(),
            )
            .context("failed to build backend client")?,
        );

        let preferences = Arc::new(preference_store(&config)?);
        let device = device_provider(&config, &preferences)?;
        let providers = provider_registry(&config, device);

        let sessions = SessionStore::new();
        let auth = AuthOrchestrator::new(
            providers,
            backend.clone(),
            sessions.clone(),
            preferences.clone(),
        )
        .with_create_account(config.auth.create_account);
        let inventory = InventoryCache::new(
            backend.clone(),
            sessions.clone(),
            config.inventory.refresh_interval(),
        );
        let receipts = ReceiptValidator::new(backend, sessions.clone());

        Ok(Self {
            config,
            sessions,
            preferences,
            auth,
            inventory,
            receipts,
        })
    }

    /// The live session, resuming the remembered provider silently if needed.
    pub async fn ensure_session(&self) -> anyhow::Result<Arc<Session>> {
        if let Some(session) = self.sessions.current() {
            return Ok(session);
        }
        if self.config.auth.auto_login
            && let Some(session) = self.auth.auto_login().await
        {
            return Ok(session);
        }

        let remembered = self.remembered_provider();
        if remembered.is_none() {
            anyhow::bail!("not logged in. Run 'wdn login device' first.");
        }
        if !self.config.auth.auto_login {
            anyhow::bail!("not logged in and auth.auto_login is disabled. Run 'wdn login' first.");
        }
        if self.auth.providers().supports(remembered) {
            anyhow::bail!("could not resume the '{remembered}' session (rerun with --verbose for details)");
        }
        anyhow::bail!("'{remembered}' sessions cannot be resumed. Log in again with 'wdn login'.")
    }

    #[must_use]
    pub fn remembered_provider(&self) -> ProviderKind {
        self.preferences.load_last_provider()
    }
}

/// Device login is always available. Social and platform login only when a
/// credential was configured or passed on the command line.
fn provider_registry(config: &WardenConfig, device: DeviceProvider) -> ProviderRegistry {
    let mut providers = ProviderRegistry::new().with(Arc::new(device));
    if !config.auth.social_token.trim().is_empty() {
        providers.register(Arc::new(SocialTokenProvider::new(
            config.auth.social_token.clone(),
        )));
    }
    if !config.auth.platform_auth_code.trim().is_empty() {
        providers.register(Arc::new(PlatformAccountProvider::new(
            config.auth.platform_auth_code.clone(),
        )));
    }
    providers
}

fn preference_store(config: &WardenConfig) -> anyhow::Result<FileProviderStore> {
    if config.auth.preference_path.is_empty() {
        return FileProviderStore::default_location().map_err(anyhow::Error::from);
    }
    Ok(FileProviderStore::new(PathBuf::from(
        &config.auth.preference_path,
    )))
}

/// Fixed id from config, otherwise one generated and stored next to the
/// preference file.
fn device_provider(
    config: &WardenConfig,
    preferences: &FileProviderStore,
) -> anyhow::Result<DeviceProvider> {
    if !config.auth.device_id.is_empty() {
        return Ok(DeviceProvider::new(config.auth.device_id.clone()));
    }
    let path = preferences
        .path()
        .parent()
        .map(|dir| dir.join(DEVICE_ID_FILE_NAME))
        .or_else(DeviceProvider::default_path)
        .context("cannot determine where to store the device id")?;
    DeviceProvider::load_or_create(&path).context("failed to load device id")
}
