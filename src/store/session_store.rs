use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use crate::models::{RefreshedToken, Session};

/// The single authoritative holder of the process-wide [`Session`].
///
/// Cloning the store clones the handle, not the session: every clone writes
/// to and reads from the same channel. Readers take snapshots or subscribe to
/// be woken on each replacement.
#[derive(Clone)]
pub struct SessionStore {
    tx: Arc<watch::Sender<Session>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    /// Creates a store holding an empty session.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Session::empty());
        SessionStore { tx: Arc::new(tx) }
    }

    /// A copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.tx.borrow().access_token.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    /// Replaces the session wholesale.
    pub fn replace(&self, session: Session) {
        debug!(
            event_name = "session.replaced",
            event_domain = "session",
            user_id = session.user_id.as_str(),
            role_count = session.roles.len(),
            authenticated = session.is_authenticated(),
            "session replaced"
        );
        self.tx.send_replace(session);
    }

    /// Installs the token and identity obtained from sign-in.
    pub fn apply(&self, token: RefreshedToken) {
        self.replace(Session::from(token));
    }

    /// Installs a refreshed access token, keeping any roles and user id the
    /// refresh response did not carry.
    pub fn refresh_token(&self, token: RefreshedToken) {
        self.tx.send_modify(|session| {
            session.renew(token);
            debug!(
                event_name = "session.refreshed",
                event_domain = "session",
                user_id = session.user_id.as_str(),
                role_count = session.roles.len(),
                "session token refreshed"
            );
        });
    }

    /// Drops the token and roles; observers see a signed-out session.
    pub fn clear(&self) {
        let previous = self.tx.send_replace(Session::empty());
        if previous.is_authenticated() {
            info!(
                event_name = "session.cleared",
                event_domain = "session",
                user_id = previous.user_id.as_str(),
                "session cleared"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn token(value: &str, roles: &[i32]) -> RefreshedToken {
        RefreshedToken {
            access_token: value.to_string(),
            roles: Some(roles.iter().copied().collect()),
            user_id: Some("registrar".to_string()),
        }
    }

    #[test]
    fn starts_empty() {
        let store = SessionStore::new();
        assert_eq!(store.snapshot(), Session::empty());
        assert_eq!(store.access_token(), None);
    }

    #[test]
    fn clones_share_the_same_session() {
        let store = SessionStore::new();
        let other = store.clone();

        store.apply(token("abc", &[1, 2]));
        assert_eq!(other.access_token().as_deref(), Some("abc"));

        other.clear();
        let session = store.snapshot();
        assert_eq!(session.access_token, None);
        assert!(session.roles.is_empty());
        assert!(session.user_id.is_empty());
    }

    #[test]
    fn snapshots_do_not_go_stale_under_the_reader() {
        let store = SessionStore::new();
        store.apply(token("first", &[1]));
        let before = store.snapshot();

        store.apply(token("second", &[2]));
        assert_eq!(before.access_token.as_deref(), Some("first"));
        assert_eq!(store.access_token().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn refresh_without_identity_keeps_roles_and_notifies() {
        let store = SessionStore::new();
        store.apply(token("stale", &[1]));
        let mut rx = store.subscribe();

        store.refresh_token(RefreshedToken {
            access_token: "fresh".to_string(),
            roles: None,
            user_id: None,
        });
        rx.changed().await.expect("store dropped");

        let session = rx.borrow_and_update().clone();
        assert_eq!(session.access_token.as_deref(), Some("fresh"));
        assert_eq!(session.roles, BTreeSet::from([1]));
        assert_eq!(session.user_id, "registrar");
    }

    #[tokio::test]
    async fn subscribers_observe_replacements() {
        let store = SessionStore::new();
        let mut rx = store.subscribe();

        store.apply(token("abc", &[4]));
        rx.changed().await.expect("store dropped");
        assert_eq!(rx.borrow_and_update().access_token.as_deref(), Some("abc"));

        store.clear();
        rx.changed().await.expect("store dropped");
        assert!(!rx.borrow_and_update().is_authenticated());
    }
}
