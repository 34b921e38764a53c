//! Authentication status as seen by the navigation gate.

use std::sync::Arc;

use echoread_core::AuthStatus;
use tokio::sync::watch;

/// Shared handle publishing the identity provider's resolution.
///
/// Starts out resolving. Whoever talks to the identity provider calls
/// [`AuthHandle::resolve`] once the answer is known.
#[derive(Clone)]
pub struct AuthHandle {
    tx: Arc<watch::Sender<AuthStatus>>,
}

impl AuthHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(AuthStatus::RESOLVING);
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> AuthStatus {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthStatus> {
        self.tx.subscribe()
    }

    /// Mark auth as unresolved again, e.g. while a session is refreshed.
    pub fn begin_resolution(&self) {
        self.publish(AuthStatus::RESOLVING);
    }

    pub fn resolve(&self, is_authenticated: bool) {
        self.publish(AuthStatus::resolved(is_authenticated));
    }

    fn publish(&self, status: AuthStatus) {
        self.tx.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            tracing::debug!(?status, "Auth status changed");
            *current = status;
            true
        });
    }
}

impl Default for AuthHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_starts_resolving() {
        let auth = AuthHandle::new();
        assert_eq!(auth.current(), AuthStatus::RESOLVING);
    }

    #[test]
    fn test_resolve_notifies_subscribers() {
        let auth = AuthHandle::new();
        let mut rx = auth.subscribe();
        assert!(!rx.has_changed().unwrap());

        auth.resolve(true);
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow_and_update(), AuthStatus::resolved(true));

        auth.resolve(true);
        assert!(!rx.has_changed().unwrap());

        auth.begin_resolution();
        assert_eq!(*rx.borrow_and_update(), AuthStatus::RESOLVING);
    }
}
