//! Single-flight login across identity providers.
//!
//! ```text
//! Idle → LoggingIn → Success   ┐
//!                  → Cancelled ├→ Idle
//!                  → Failed    ┘
//! ```
//!
//! `LoggingIn` is held by a [`LoginGuard`] acquired with a compare-and-set.
//! A second login while the guard is held fails with
//! [`AuthError::AlreadyInProgress`] before touching any provider.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::sync::broadcast;
use warden_core::{AuthEvent, ProviderKind, Session};

use crate::backend::BackendClient;
use crate::error::AuthError;
use crate::preferences::ProviderPreferenceStore;
use crate::provider::{AuthParams, ProviderRegistry};
use crate::session_store::SessionStore;

const EVENT_CAPACITY: usize = 64;

pub struct AuthOrchestrator {
    providers: ProviderRegistry,
    backend: Arc<dyn BackendClient>,
    sessions: SessionStore,
    preferences: Arc<dyn ProviderPreferenceStore>,
    create_account: bool,
    logging_in: AtomicBool,
    /// Bumped by every logout; a login that started in an older epoch must not
    /// install its session. Held while a login installs and while a logout
    /// clears, so the two never interleave.
    logout_epoch: Mutex<u64>,
    events: broadcast::Sender<AuthEvent>,
}

/// Holds the `LoggingIn` state; dropping it returns the orchestrator to `Idle`.
struct LoginGuard<'a>(&'a AtomicBool);

impl Drop for LoginGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl AuthOrchestrator {
    pub fn new(
        providers: ProviderRegistry,
        backend: Arc<dyn BackendClient>,
        sessions: SessionStore,
        preferences: Arc<dyn ProviderPreferenceStore>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            providers,
            backend,
            sessions,
            preferences,
            create_account: true,
            logging_in: AtomicBool::new(false),
            logout_epoch: Mutex::new(0),
            events,
        }
    }

    /// Whether provider logins may create a backend account for new identities.
    #[must_use]
    pub fn with_create_account(mut self, create_account: bool) -> Self {
        self.create_account = create_account;
        self
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub const fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    #[must_use]
    pub const fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    #[must_use]
    pub fn is_logging_in(&self) -> bool {
        self.logging_in.load(Ordering::Acquire)
    }

    /// Log in through the adapter registered for `kind`.
    ///
    /// # Errors
    ///
    /// - `AuthError::AlreadyInProgress` if another login is outstanding (no
    ///   provider call is made and no event is emitted)
    /// - `AuthError::UnsupportedProvider` if no adapter is registered for `kind`
    /// - `AuthError::Cancelled` / `AuthError::Provider` for provider outcomes
    /// - `AuthError::Backend` if the credential exchange fails
    pub async fn login(
        &self,
        kind: ProviderKind,
        params: &AuthParams,
    ) -> Result<Arc<Session>, AuthError> {
        let guard = self.begin()?;
        self.emit(AuthEvent::LoggingIn { provider: kind });

        let result = self.provider_flow(kind, params).await;
        drop(guard);
        self.report(kind, result)
    }

    /// Silent login with the last successful provider.
    ///
    /// Runs only if a provider is remembered, registered, and reports a cached
    /// local session. Never fails: problems are logged and yield `None`.
    pub async fn auto_login(&self) -> Option<Arc<Session>> {
        let kind = self.preferences.load_last_provider();
        if kind.is_none() {
            tracing::debug!("auto-login skipped: no remembered provider");
            return None;
        }
        let Some(adapter) = self.providers.get(kind) else {
            tracing::debug!(provider = %kind, "auto-login skipped: provider not available");
            return None;
        };
        if !adapter.has_cached_session().await {
            tracing::debug!(provider = %kind, "auto-login skipped: no cached provider session");
            return None;
        }
        let Ok(guard) = self.begin() else {
            tracing::debug!("auto-login skipped: a login is already in progress");
            return None;
        };

        let result = self.provider_flow(kind, &AuthParams::silent()).await;
        drop(guard);

        match result {
            Ok(session) => {
                self.emit(AuthEvent::LoginSucceeded {
                    provider: kind,
                    player_id: session.player_id.clone(),
                });
                Some(session)
            }
            Err(error) => {
                tracing::warn!(provider = %kind, %error, "auto-login failed");
                None
            }
        }
    }

    /// Log in with the backend's own username/password accounts.
    ///
    /// # Errors
    ///
    /// `AuthError::InvalidInput` for empty fields, otherwise as [`Self::login`].
    pub async fn login_with_password(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Arc<Session>, AuthError> {
        validate_account_input(username, password, None)?;
        let guard = self.begin()?;
        self.emit(AuthEvent::LoggingIn {
            provider: ProviderKind::Password,
        });

        let epoch = self.current_epoch();
        let result = match self.backend.login_with_password(username, password).await {
            Ok(session) => self.complete(ProviderKind::Password, session, epoch),
            Err(error) => Err(error.into()),
        };
        drop(guard);
        self.report(ProviderKind::Password, result)
    }

    /// Create a username/password account and log into it.
    ///
    /// # Errors
    ///
    /// `AuthError::InvalidInput` for empty fields or a malformed email,
    /// otherwise as [`Self::login`].
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> Result<Arc<Session>, AuthError> {
        validate_account_input(username, password, email)?;
        let guard = self.begin()?;
        self.emit(AuthEvent::LoggingIn {
            provider: ProviderKind::Password,
        });

        let epoch = self.current_epoch();
        let result = match self.backend.register(username, password, email).await {
            Ok(session) => self.complete(ProviderKind::Password, session, epoch),
            Err(error) => Err(error.into()),
        };
        drop(guard);
        self.report(ProviderKind::Password, result)
    }

    /// End the live session.
    ///
    /// Clears the session store, tells the provider that produced the session
    /// to drop its cached credential, and forgets the auto-login provider.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Persistence` if the provider preference cannot be
    /// cleared. The session is cleared regardless.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let previous = {
            let mut epoch = self.logout_epoch.lock();
            *epoch += 1;
            self.sessions.clear()
        };

        if let Some(session) = &previous {
            if let Some(adapter) = self.providers.get(session.provider_kind) {
                adapter.forget_cached_credential().await;
            }
            tracing::info!(player_id = %session.player_id, "logged out");
        }

        let persisted = self.preferences.save_last_provider(ProviderKind::None);
        self.emit(AuthEvent::LoggedOut);
        persisted
    }

    fn begin(&self) -> Result<LoginGuard<'_>, AuthError> {
        self.logging_in
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| AuthError::AlreadyInProgress)?;
        Ok(LoginGuard(&self.logging_in))
    }

    fn current_epoch(&self) -> u64 {
        *self.logout_epoch.lock()
    }

    async fn provider_flow(
        &self,
        kind: ProviderKind,
        params: &AuthParams,
    ) -> Result<Arc<Session>, AuthError> {
        let adapter = self
            .providers
            .get(kind)
            .ok_or(AuthError::UnsupportedProvider(kind))?;
        let epoch = self.current_epoch();

        let credential = adapter.authenticate(params).await?;
        if credential.kind() != kind {
            return Err(AuthError::Provider(format!(
                "{kind} adapter returned a {} credential",
                credential.kind()
            )));
        }

        let session = self.backend.login(&credential, self.create_account).await?;
        self.complete(kind, session, epoch)
    }

    /// Publish a backend session and remember the provider.
    fn complete(
        &self,
        kind: ProviderKind,
        mut session: Session,
        epoch: u64,
    ) -> Result<Arc<Session>, AuthError> {
        let session = {
            let current = self.logout_epoch.lock();
            if *current != epoch {
                return Err(AuthError::LoggedOutDuringLogin);
            }
            session.provider_kind = kind;
            let session = self.sessions.install(session);
            if let Err(error) = self.preferences.save_last_provider(kind) {
                tracing::warn!(provider = %kind, %error, "failed to remember login provider");
            }
            session
        };
        tracing::info!(
            provider = %kind,
            player_id = %session.player_id,
            newly_created = session.newly_created,
            "login succeeded",
        );
        Ok(session)
    }

    fn report(
        &self,
        kind: ProviderKind,
        result: Result<Arc<Session>, AuthError>,
    ) -> Result<Arc<Session>, AuthError> {
        let event = match &result {
            Ok(session) => AuthEvent::LoginSucceeded {
                provider: kind,
                player_id: session.player_id.clone(),
            },
            Err(AuthError::Cancelled) => AuthEvent::LoginCancelled { provider: kind },
            Err(error) => {
                tracing::debug!(provider = %kind, %error, "login failed");
                AuthEvent::LoginFailed {
                    provider: kind,
                    reason: error.to_string(),
                }
            }
        };
        self.emit(event);
        result
    }

    fn emit(&self, event: AuthEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

fn validate_account_input(
    username: &str,
    password: &str,
    email: Option<&str>,
) -> Result<(), AuthError> {
    if username.trim().is_empty() {
        return Err(AuthError::InvalidInput("username is empty".into()));
    }
    if password.is_empty() {
        return Err(AuthError::InvalidInput("password is empty".into()));
    }
    if let Some(email) = email
        && !email.contains('@')
    {
        return Err(AuthError::InvalidInput(format!("'{email}' is not an email address")));
    }
    Ok(())
}
