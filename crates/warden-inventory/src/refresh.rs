//! Background refresh loop driving [`InventoryCache::tick`].

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::cache::InventoryCache;
use crate::error::InventoryError;

/// Owns the refresh task. Dropping it stops the loop.
#[derive(Debug)]
pub struct RefreshLoop {
    handle: JoinHandle<()>,
}

impl RefreshLoop {
    pub fn stop(self) {
        drop(self);
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for RefreshLoop {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl InventoryCache {
    /// Check every `tick_period` whether a poll is due, and run it.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use = "the refresh loop stops when the handle is dropped"]
    pub fn spawn_refresh_loop(&self, tick_period: Duration) -> RefreshLoop {
        let cache = self.clone();
        let period = tick_period.max(Duration::from_millis(1));
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                let now = interval.tick().await;
                match cache.tick(now).await {
                    None | Some(Ok(_) | Err(InventoryError::NotAuthenticated)) => {}
                    Some(Err(error)) => {
                        tracing::debug!(%error, "scheduled inventory refresh failed");
                    }
                }
            }
        });
        RefreshLoop { handle }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use warden_auth::SessionStore;
    use warden_auth::testing::ScriptedBackend;
    use warden_core::{EntitlementToken, ProviderKind, Session};

    use super::*;

    fn logged_in(interval: Duration) -> (InventoryCache, Arc<ScriptedBackend>) {
        let backend = Arc::new(ScriptedBackend::new());
        let sessions = SessionStore::new();
        sessions.install(Session::new(
            "player-1",
            EntitlementToken::new("ticket-1".into()),
            ProviderKind::Device,
        ));
        (InventoryCache::new(backend.clone(), sessions, interval), backend)
    }

    #[tokio::test(start_paused = true)]
    async fn loop_polls_once_per_interval() {
        let (cache, backend) = logged_in(Duration::from_secs(3));
        let refresh = cache.spawn_refresh_loop(Duration::from_millis(250));

        // First tick fires immediately.
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(backend.inventory_calls(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(backend.inventory_calls(), 1);

        tokio::time::sleep(Duration::from_millis(1_100)).await;
        assert_eq!(backend.inventory_calls(), 2);

        refresh.stop();
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(backend.inventory_calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_stops_polling() {
        let (cache, backend) = logged_in(Duration::from_secs(1));
        {
            let _refresh = cache.spawn_refresh_loop(Duration::from_millis(100));
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        let calls = backend.inventory_calls();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(backend.inventory_calls(), calls);
    }

    #[tokio::test(start_paused = true)]
    async fn logged_out_loop_makes_no_calls() {
        let backend = Arc::new(ScriptedBackend::new());
        let cache = InventoryCache::new(backend.clone(), SessionStore::new(), Duration::from_secs(1));
        let refresh = cache.spawn_refresh_loop(Duration::from_millis(100));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(backend.inventory_calls(), 0);
        assert!(!refresh.is_finished());
    }
}
