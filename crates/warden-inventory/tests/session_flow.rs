//! Inventory behaviour across login and logout.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use warden_auth::testing::{ScriptedBackend, ScriptedProvider};
use warden_auth::{
    AuthOrchestrator, AuthParams, MemoryProviderStore, ProviderRegistry, SessionStore,
};
use warden_core::{InventoryEvent, ProviderKind};
use warden_inventory::{InventoryCache, InventoryError};

struct World {
    auth: AuthOrchestrator,
    cache: InventoryCache,
    backend: Arc<ScriptedBackend>,
}

fn world() -> World {
    let backend = Arc::new(ScriptedBackend::new());
    let sessions = SessionStore::new();
    let auth = AuthOrchestrator::new(
        ProviderRegistry::new().with(Arc::new(ScriptedProvider::new(ProviderKind::Device))),
        backend.clone(),
        sessions.clone(),
        Arc::new(MemoryProviderStore::new()),
    );
    let cache = InventoryCache::new(backend.clone(), sessions, Duration::from_secs(3));
    World {
        auth,
        cache,
        backend,
    }
}

#[tokio::test]
async fn inventory_requires_login() {
    let w = world();
    assert_eq!(w.cache.poll().await, Err(InventoryError::NotAuthenticated));

    w.auth
        .login(ProviderKind::Device, &AuthParams::default())
        .await
        .expect("login");
    assert!(w.cache.poll().await.is_ok());
    assert_eq!(w.backend.inventory_calls(), 1);
}

#[tokio::test]
async fn credit_then_poll_reflects_server_truth() {
    let w = world();
    w.auth
        .login(ProviderKind::Device, &AuthParams::default())
        .await
        .unwrap();
    w.backend.set_balance("GE", 20);
    w.cache.poll().await.unwrap();

    w.cache.credit_currency("GE", 50).await.expect("credit");
    // Someone else also granted currency out of band.
    w.backend.set_balance("GE", 75);

    w.cache.poll().await.unwrap();
    assert_eq!(w.cache.currency("GE"), 75);
}

#[tokio::test]
async fn logout_stops_authorized_calls() {
    let w = world();
    w.auth
        .login(ProviderKind::Device, &AuthParams::default())
        .await
        .unwrap();
    w.cache.poll().await.unwrap();

    w.auth.logout().await.unwrap();

    assert_eq!(w.cache.poll().await, Err(InventoryError::NotAuthenticated));
    assert_eq!(
        w.cache.credit_currency("GE", 1).await,
        Err(InventoryError::NotAuthenticated)
    );
    assert_eq!(w.backend.inventory_calls(), 1);
    assert_eq!(w.backend.credit_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn many_concurrent_pollers_one_request() {
    let w = world();
    w.auth
        .login(ProviderKind::Device, &AuthParams::default())
        .await
        .unwrap();
    w.backend.set_latency(Duration::from_millis(300));
    let mut rx = w.cache.subscribe();

    let mut handles = Vec::new();
    for _ in 0..16 {
        let cache = w.cache.clone();
        handles.push(tokio::spawn(async move { cache.poll().await }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    assert_eq!(w.backend.inventory_calls(), 1);
    assert_eq!(w.backend.max_inventory_in_flight(), 1);

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    assert_eq!(
        events,
        vec![
            InventoryEvent::Refreshing,
            InventoryEvent::Refreshed,
            InventoryEvent::RefreshedFirstTime,
        ]
    );
}
