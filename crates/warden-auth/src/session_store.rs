use std::sync::Arc;

use parking_lot::RwLock;
use warden_core::Session;

/// Holder of the current authenticated session.
///
/// Cheap to clone: clones share the same slot. Create one per application
/// context and hand clones to the components that gate on authentication.
/// Installing a session replaces the previous one wholesale.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    current: Arc<RwLock<Option<Arc<Session>>>>,
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The live session, if any.
    #[must_use]
    pub fn current(&self) -> Option<Arc<Session>> {
        self.current.read().clone()
    }

    #[must_use]
    pub fn is_live(&self) -> bool {
        self.current.read().is_some()
    }

    /// Publish `session` as the live session, replacing any previous one.
    pub fn install(&self, session: Session) -> Arc<Session> {
        let session = Arc::new(session);
        let previous = self.current.write().replace(Arc::clone(&session));
        if let Some(previous) = previous {
            tracing::debug!(
                previous = %previous.player_id,
                current = %session.player_id,
                "replacing live session",
            );
        }
        session
    }

    /// Drop the live session, returning it if there was one.
    pub fn clear(&self) -> Option<Arc<Session>> {
        self.current.write().take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_core::{EntitlementToken, ProviderKind};

    fn session(id: &str) -> Session {
        Session::new(id, EntitlementToken::new(format!("t-{id}")), ProviderKind::Device)
    }

    #[test]
    fn starts_empty() {
        let store = SessionStore::new();
        assert!(!store.is_live());
        assert!(store.current().is_none());
    }

    #[test]
    fn install_replaces_and_clones_share_state() {
        let store = SessionStore::new();
        let view = store.clone();

        store.install(session("A"));
        store.install(session("B"));

        assert_eq!(view.current().unwrap().player_id, "B");
    }

    #[test]
    fn clear_returns_previous_and_empties() {
        let store = SessionStore::new();
        store.install(session("A"));

        let cleared = store.clear().expect("had a session");
        assert_eq!(cleared.player_id, "A");
        assert!(!store.is_live());
        assert!(store.clear().is_none());
    }
}
