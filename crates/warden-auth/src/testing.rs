//! Scripted provider and in-memory backend for tests.
//!
//! Enabled for this crate's unit tests and, through the `test-support`
//! feature, for downstream crates' tests. Both fakes count calls so tests can
//! assert single-flight behaviour.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use warden_core::{EntitlementToken, InventorySnapshot, ProviderCredential, ProviderKind, Session};

use crate::backend::{AppStoreValidation, BackendClient, GooglePlayValidation};
use crate::error::{BackendError, ProviderError};
use crate::provider::{AuthParams, ProviderAdapter};

// ---------------------------------------------------------------------------
// ScriptedProvider
// ---------------------------------------------------------------------------

pub struct ScriptedProvider {
    kind: ProviderKind,
    outcomes: Mutex<VecDeque<Result<ProviderCredential, ProviderError>>>,
    delay: Duration,
    cached: AtomicBool,
    calls: AtomicUsize,
    forgotten: AtomicUsize,
    last_params: Mutex<Option<AuthParams>>,
}

impl ScriptedProvider {
    /// A provider that succeeds with a canned credential for `kind`.
    #[must_use]
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            outcomes: Mutex::new(VecDeque::new()),
            delay: Duration::ZERO,
            cached: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            forgotten: AtomicUsize::new(0),
            last_params: Mutex::new(None),
        }
    }

    /// Sleep this long inside every `authenticate` call.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn with_cached_session(self) -> Self {
        self.cached.store(true, Ordering::SeqCst);
        self
    }

    /// Queue the outcome of the next `authenticate` call.
    pub fn push_outcome(&self, outcome: Result<ProviderCredential, ProviderError>) {
        self.outcomes.lock().push_back(outcome);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn forget_calls(&self) -> usize {
        self.forgotten.load(Ordering::SeqCst)
    }

    pub fn last_params(&self) -> Option<AuthParams> {
        self.last_params.lock().clone()
    }

    fn canned_credential(&self) -> ProviderCredential {
        match self.kind {
            ProviderKind::SocialToken => ProviderCredential::SocialToken {
                token: "social-access-token".into(),
            },
            ProviderKind::PlatformAccount => ProviderCredential::PlatformAccount {
                server_auth_code: "4/server-auth-code".into(),
            },
            ProviderKind::Password => ProviderCredential::Password {
                username: "player".into(),
                password: "correct horse".into(),
            },
            ProviderKind::Device | ProviderKind::None => ProviderCredential::Device {
                device_id: "device-0001".into(),
            },
        }
    }
}

#[async_trait]
impl ProviderAdapter for ScriptedProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn authenticate(&self, params: &AuthParams) -> Result<ProviderCredential, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_params.lock() = Some(params.clone());
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let next = self.outcomes.lock().pop_front();
        next.unwrap_or_else(|| Ok(self.canned_credential()))
    }

    async fn has_cached_session(&self) -> bool {
        self.cached.load(Ordering::SeqCst)
    }

    async fn forget_cached_credential(&self) {
        self.forgotten.fetch_add(1, Ordering::SeqCst);
        self.cached.store(false, Ordering::SeqCst);
    }
}

// ---------------------------------------------------------------------------
// ScriptedBackend
// ---------------------------------------------------------------------------

/// A validation request the backend received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationCall {
    GooglePlay(GooglePlayValidation),
    AppStore(AppStoreValidation),
}

#[derive(Default)]
struct ServerInventory {
    currencies: BTreeMap<String, u64>,
    items: BTreeSet<String>,
}

/// In-memory backend holding authoritative server-side inventory.
#[derive(Default)]
pub struct ScriptedBackend {
    latency: Mutex<Duration>,
    login_error: Mutex<Option<BackendError>>,
    inventory_failures: Mutex<VecDeque<BackendError>>,
    credit_error: Mutex<Option<BackendError>>,
    validation_error: Mutex<Option<BackendError>>,
    function_results: Mutex<HashMap<String, Result<serde_json::Value, BackendError>>>,
    server: Mutex<ServerInventory>,
    validations: Mutex<Vec<ValidationCall>>,
    functions: Mutex<Vec<(String, serde_json::Value)>>,
    login_calls: AtomicUsize,
    inventory_calls: AtomicUsize,
    credit_calls: AtomicUsize,
    inventory_in_flight: AtomicUsize,
    max_inventory_in_flight: AtomicUsize,
}

impl ScriptedBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `latency` to every call.
    pub fn set_latency(&self, latency: Duration) {
        *self.latency.lock() = latency;
    }

    /// Make every login call fail with `error` (`None` restores success).
    pub fn fail_logins(&self, error: Option<BackendError>) {
        *self.login_error.lock() = error;
    }

    /// Fail the next inventory read with `error`.
    pub fn fail_next_inventory(&self, error: BackendError) {
        self.inventory_failures.lock().push_back(error);
    }

    pub fn fail_credits(&self, error: Option<BackendError>) {
        *self.credit_error.lock() = error;
    }

    pub fn reject_validations(&self, error: Option<BackendError>) {
        *self.validation_error.lock() = error;
    }

    pub fn set_function_result(&self, name: &str, result: Result<serde_json::Value, BackendError>) {
        self.function_results.lock().insert(name.to_string(), result);
    }

    /// Overwrite a balance server-side, as an out-of-band grant would.
    pub fn set_balance(&self, code: &str, balance: u64) {
        self.server.lock().currencies.insert(code.to_string(), balance);
    }

    pub fn grant_item(&self, item_id: &str) {
        self.server.lock().items.insert(item_id.to_string());
    }

    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }

    pub fn inventory_calls(&self) -> usize {
        self.inventory_calls.load(Ordering::SeqCst)
    }

    pub fn credit_calls(&self) -> usize {
        self.credit_calls.load(Ordering::SeqCst)
    }

    /// Highest number of inventory reads observed running at once.
    pub fn max_inventory_in_flight(&self) -> usize {
        self.max_inventory_in_flight.load(Ordering::SeqCst)
    }

    pub fn validations(&self) -> Vec<ValidationCall> {
        self.validations.lock().clone()
    }

    pub fn functions(&self) -> Vec<(String, serde_json::Value)> {
        self.functions.lock().clone()
    }

    async fn wait(&self) {
        let latency = *self.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
    }

    async fn issue_session(&self, kind: ProviderKind) -> Result<Session, BackendError> {
        let n = self.login_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.wait().await;
        let error = self.login_error.lock().clone();
        if let Some(error) = error {
            return Err(error);
        }
        Ok(Session::new(
            format!("player-{n}"),
            EntitlementToken::new(format!("ticket-{n}")),
            kind,
        ))
    }

    async fn record_validation(&self, call: ValidationCall) -> Result<(), BackendError> {
        self.validations.lock().push(call);
        self.wait().await;
        let error = self.validation_error.lock().clone();
        error.map_or(Ok(()), Err)
    }
}

#[async_trait]
impl BackendClient for ScriptedBackend {
    async fn login(
        &self,
        credential: &ProviderCredential,
        _create_account: bool,
    ) -> Result<Session, BackendError> {
        self.issue_session(credential.kind()).await
    }

    async fn login_with_password(
        &self,
        _username: &str,
        _password: &str,
    ) -> Result<Session, BackendError> {
        self.issue_session(ProviderKind::Password).await
    }

    async fn register(
        &self,
        _username: &str,
        _password: &str,
        _email: Option<&str>,
    ) -> Result<Session, BackendError> {
        let session = self.issue_session(ProviderKind::Password).await?;
        Ok(session.with_newly_created(true))
    }

    async fn validate_google_play_purchase(
        &self,
        _session: &Session,
        request: &GooglePlayValidation,
    ) -> Result<(), BackendError> {
        self.record_validation(ValidationCall::GooglePlay(request.clone()))
            .await
    }

    async fn validate_app_store_purchase(
        &self,
        _session: &Session,
        request: &AppStoreValidation,
    ) -> Result<(), BackendError> {
        self.record_validation(ValidationCall::AppStore(request.clone()))
            .await
    }

    async fn get_inventory(&self, _session: &Session) -> Result<InventorySnapshot, BackendError> {
        self.inventory_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.inventory_in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_inventory_in_flight.fetch_max(now, Ordering::SeqCst);

        self.wait().await;

        self.inventory_in_flight.fetch_sub(1, Ordering::SeqCst);
        let failure = self.inventory_failures.lock().pop_front();
        if let Some(error) = failure {
            return Err(error);
        }
        let server = self.server.lock();
        Ok(InventorySnapshot::new(
            server.currencies.clone(),
            server.items.clone(),
        ))
    }

    async fn credit_currency(
        &self,
        _session: &Session,
        code: &str,
        amount: u32,
    ) -> Result<u64, BackendError> {
        self.credit_calls.fetch_add(1, Ordering::SeqCst);
        self.wait().await;
        let error = self.credit_error.lock().clone();
        if let Some(error) = error {
            return Err(error);
        }
        let mut server = self.server.lock();
        let balance = server.currencies.entry(code.to_string()).or_insert(0);
        *balance = balance.saturating_add(u64::from(amount));
        Ok(*balance)
    }

    async fn execute_function(
        &self,
        _session: &Session,
        name: &str,
        args: serde_json::Value,
    ) -> Result<serde_json::Value, BackendError> {
        self.functions.lock().push((name.to_string(), args));
        self.wait().await;
        let result = self.function_results.lock().get(name).cloned();
        result.unwrap_or(Ok(serde_json::Value::Null))
    }
}
