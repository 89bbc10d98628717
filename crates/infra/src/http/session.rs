//! Shared session state observed by every in-flight request

use std::sync::Arc;

use gifscout_domain::{AuthState, GifScoutError, Result, Session, SessionToken};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Session held in a `watch` channel so waiters can await transitions
#[derive(Clone)]
pub struct SessionContext {
    tx: Arc<watch::Sender<Session>>,
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new(Session::unauthenticated())
    }
}

impl SessionContext {
    pub fn new(session: Session) -> Self {
        let (tx, _) = watch::channel(session);
        Self { tx: Arc::new(tx) }
    }

    pub fn snapshot(&self) -> Session {
        self.tx.borrow().clone()
    }

    pub fn auth_state(&self) -> AuthState {
        self.tx.borrow().auth_state()
    }

    pub fn id_token(&self) -> Option<String> {
        self.tx.borrow().id_token().map(str::to_owned)
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.tx.subscribe()
    }

    pub fn authenticate(&self, token: SessionToken) {
        self.tx.send_replace(Session::authenticated(token));
        info!(auth_state = %AuthState::Authenticated, "session transition");
    }

    pub fn clear(&self) {
        self.tx.send_replace(Session::unauthenticated());
        info!(auth_state = %AuthState::Unauthenticated, "session transition");
    }

    pub fn set_token(&self, id_token: Option<String>) {
        self.tx.send_modify(|session| session.set_token(id_token));
    }

    /// `Authenticated -> Reauthenticating`. Returns whether the state changed.
    pub fn begin_reauthentication(&self) -> bool {
        let changed = self.tx.send_if_modified(Session::begin_reauthentication);
        if changed {
            info!(auth_state = %AuthState::Reauthenticating, "session transition");
        }
        changed
    }

    pub fn force_reauthentication(&self) {
        self.tx.send_if_modified(|session| {
            let changed = session.auth_state() != AuthState::Reauthenticating;
            session.force_reauthentication();
            changed
        });
    }

    /// Resolve once the session leaves `Reauthenticating`.
    pub async fn settled(&self, cancel: &CancellationToken) -> Result<()> {
        let mut rx = self.tx.subscribe();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(GifScoutError::Cancelled),
            changed = rx.wait_for(|session| session.auth_state() != AuthState::Reauthenticating) => {
                changed
                    .map(|_| ())
                    .map_err(|_| GifScoutError::Internal("session channel closed".into()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn reauthentication_starts_only_from_authenticated() {
        let session = SessionContext::default();
        assert!(!session.begin_reauthentication());
        assert_eq!(session.auth_state(), AuthState::Unauthenticated);

        session.authenticate(SessionToken::new("t1"));
        assert!(session.begin_reauthentication());
        assert!(!session.begin_reauthentication());
        assert_eq!(session.auth_state(), AuthState::Reauthenticating);
        assert_eq!(session.id_token().as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn settled_waits_for_the_refresh_outcome() {
        let session = SessionContext::default();
        session.authenticate(SessionToken::new("old"));
        session.begin_reauthentication();

        let waiter = {
            let session = session.clone();
            tokio::spawn(async move { session.settled(&CancellationToken::new()).await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        session.authenticate(SessionToken::new("new"));
        waiter.await.unwrap().unwrap();
        assert_eq!(session.id_token().as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn settled_honours_cancellation() {
        let session = SessionContext::default();
        session.force_reauthentication();

        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(session.settled(&cancel).await.unwrap_err(), GifScoutError::Cancelled);
    }
}
