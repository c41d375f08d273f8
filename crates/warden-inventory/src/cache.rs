//! Cached inventory snapshot with single-flight polling.
//!
//! At most one `get_inventory` call is outstanding per cache. Callers that
//! arrive while a poll is running share its future and observe its outcome.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::time::Instant;
use warden_auth::{BackendClient, SessionStore};
use warden_core::{InventoryEvent, InventorySnapshot, Session};

use crate::error::InventoryError;

const EVENT_CAPACITY: usize = 64;

/// Outcome of one inventory poll, shared by every caller that joined it.
pub type PollOutcome = Result<Arc<InventorySnapshot>, InventoryError>;
type SharedPoll = Shared<BoxFuture<'static, PollOutcome>>;

/// Handle to a shared inventory cache. Cheap to clone.
#[derive(Clone)]
pub struct InventoryCache {
    pub(crate) inner: Arc<Inner>,
}

pub(crate) struct Inner {
    pub(crate) backend: Arc<dyn BackendClient>,
    pub(crate) sessions: SessionStore,
    refresh_interval: Duration,
    state: Mutex<State>,
    in_flight: Mutex<Option<SharedPoll>>,
    /// Sequence number of the most recently started poll.
    poll_seq: AtomicU64,
    /// Ticket taken when a backend call returns; orders publication.
    completion_seq: AtomicU64,
    events: broadcast::Sender<InventoryEvent>,
}

struct State {
    snapshot: Arc<InventorySnapshot>,
    /// Completion ticket of the published snapshot.
    published_completion: u64,
    last_poll: Option<Instant>,
    /// Polls with a sequence number at or below this started before a known
    /// server-side write and must not hold off the next poll.
    dirty_through: u64,
    refreshed_once: bool,
}

impl InventoryCache {
    pub fn new(
        backend: Arc<dyn BackendClient>,
        sessions: SessionStore,
        refresh_interval: Duration,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                backend,
                sessions,
                refresh_interval,
                state: Mutex::new(State {
                    snapshot: Arc::new(InventorySnapshot::default()),
                    published_completion: 0,
                    last_poll: None,
                    dirty_through: 0,
                    refreshed_once: false,
                }),
                in_flight: Mutex::new(None),
                poll_seq: AtomicU64::new(0),
                completion_seq: AtomicU64::new(0),
                events,
            }),
        }
    }

    /// Fetch the player's inventory and publish it as the current snapshot.
    ///
    /// Joins the in-flight poll if there is one.
    ///
    /// # Errors
    ///
    /// - `InventoryError::NotAuthenticated` if there is no live session (no
    ///   backend call is made)
    /// - `InventoryError::Stale` if the backend call fails; the previous
    ///   snapshot stays published
    pub async fn poll(&self) -> PollOutcome {
        let shared = {
            let mut slot = self.inner.in_flight.lock();
            if let Some(existing) = slot.as_ref() {
                tracing::trace!("joining in-flight inventory poll");
                existing.clone()
            } else {
                let session = self
                    .inner
                    .sessions
                    .current()
                    .ok_or(InventoryError::NotAuthenticated)?;
                let seq = self.inner.poll_seq.fetch_add(1, Ordering::AcqRel) + 1;
                let poll = Inner::run_poll(Arc::clone(&self.inner), session, seq)
                    .boxed()
                    .shared();
                *slot = Some(poll.clone());
                poll
            }
        };
        shared.await
    }

    /// Poll if the refresh interval has elapsed since the last successful poll
    /// (or there has never been one). Returns `None` when no poll was due.
    pub async fn tick(&self, now: Instant) -> Option<PollOutcome> {
        if !self.is_due(now) {
            return None;
        }
        Some(self.poll().await)
    }

    #[must_use]
    pub fn is_due(&self, now: Instant) -> bool {
        self.inner.state.lock().last_poll.is_none_or(|last| {
            now.saturating_duration_since(last) >= self.inner.refresh_interval
        })
    }

    /// The current snapshot. Before the first successful poll this is an empty
    /// placeholder.
    #[must_use]
    pub fn snapshot(&self) -> Arc<InventorySnapshot> {
        Arc::clone(&self.inner.state.lock().snapshot)
    }

    #[must_use]
    pub fn currency(&self, code: &str) -> u64 {
        self.inner.state.lock().snapshot.currency(code)
    }

    #[must_use]
    pub fn owned_items(&self) -> BTreeSet<String> {
        self.inner.state.lock().snapshot.owned_items.clone()
    }

    #[must_use]
    pub fn last_poll_time(&self) -> Option<Instant> {
        self.inner.state.lock().last_poll
    }

    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.inner.in_flight.lock().is_some()
    }

    #[must_use]
    pub fn refresh_interval(&self) -> Duration {
        self.inner.refresh_interval
    }

    pub fn subscribe(&self) -> broadcast::Receiver<InventoryEvent> {
        self.inner.events.subscribe()
    }

    /// Mark the server-side inventory as changed so the next tick polls.
    pub(crate) fn invalidate(&self) {
        let started = self.inner.poll_seq.load(Ordering::Acquire);
        let mut state = self.inner.state.lock();
        state.last_poll = None;
        state.dirty_through = started;
    }
}

impl Inner {
    async fn run_poll(self: Arc<Self>, session: Arc<Session>, seq: u64) -> PollOutcome {
        self.emit(InventoryEvent::Refreshing);
        tracing::debug!(player_id = %session.player_id, seq, "inventory poll started");

        let result = self.backend.get_inventory(&session).await;
        let completed = self.completion_seq.fetch_add(1, Ordering::AcqRel) + 1;
        self.in_flight.lock().take();

        match result {
            Ok(snapshot) => {
                if !self.is_current_session(&session) {
                    let reason = "session changed while polling".to_string();
                    tracing::debug!(seq, "discarding inventory for a replaced session");
                    return Err(InventoryError::Stale(reason));
                }
                Ok(self.publish(snapshot, seq, completed))
            }
            Err(error) => {
                let reason = error.to_string();
                tracing::debug!(seq, %reason, "inventory poll failed");
                self.emit(InventoryEvent::Error {
                    reason: reason.clone(),
                });
                Err(InventoryError::Stale(reason))
            }
        }
    }

    /// Last writer by completion: a result whose backend call returned before
    /// the one already published is dropped. `seq` is the start order and only
    /// decides whether the poll timer may be re-armed.
    fn publish(
        &self,
        snapshot: InventorySnapshot,
        seq: u64,
        completed: u64,
    ) -> Arc<InventorySnapshot> {
        let first_time;
        let published = {
            let mut state = self.state.lock();
            if completed <= state.published_completion {
                tracing::debug!(
                    completed,
                    published = state.published_completion,
                    "dropping superseded inventory",
                );
                return Arc::clone(&state.snapshot);
            }
            let snapshot = Arc::new(snapshot);
            state.snapshot = Arc::clone(&snapshot);
            state.published_completion = completed;
            if seq > state.dirty_through {
                state.last_poll = Some(Instant::now());
            }
            first_time = !state.refreshed_once;
            state.refreshed_once = true;
            snapshot
        };

        tracing::debug!(
            seq,
            currencies = published.currencies.len(),
            items = published.owned_items.len(),
            "inventory refreshed",
        );
        self.emit(InventoryEvent::Refreshed);
        if first_time {
            self.emit(InventoryEvent::RefreshedFirstTime);
        }
        published
    }

    fn is_current_session(&self, session: &Arc<Session>) -> bool {
        self.sessions
            .current()
            .is_some_and(|current| Arc::ptr_eq(&current, session))
    }

    pub(crate) fn emit(&self, event: InventoryEvent) {
        let _ = self.events.send(event);
    }
}

impl std::fmt::Debug for InventoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InventoryCache")
            .field("refresh_interval", &self.inner.refresh_interval)
            .field("last_poll", &self.last_poll_time())
            .field("refreshing", &self.is_refreshing())
            .finish_non_exhaustive()
    }
}
