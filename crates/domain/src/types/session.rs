//! Authentication session model

use serde::{Deserialize, Serialize};

use crate::impl_domain_status_conversions;

/// Client authentication state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthState {
    #[default]
    Unauthenticated,
    Authenticated,
    Reauthenticating,
}

impl_domain_status_conversions!(AuthState {
    Unauthenticated => "unauthenticated",
    Authenticated => "authenticated",
    Reauthenticating => "reauthenticating",
});

/// Credentials returned by a session refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionToken {
    pub id_token: String,
}

impl SessionToken {
    pub fn new(id_token: impl Into<String>) -> Self {
        Self { id_token: id_token.into() }
    }
}

/// Token plus the state it is in
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Session {
    id_token: Option<String>,
    auth_state: AuthState,
}

impl Session {
    pub fn unauthenticated() -> Self {
        Self::default()
    }

    pub fn authenticated(token: SessionToken) -> Self {
        Self { id_token: Some(token.id_token), auth_state: AuthState::Authenticated }
    }

    pub fn id_token(&self) -> Option<&str> {
        self.id_token.as_deref()
    }

    pub fn auth_state(&self) -> AuthState {
        self.auth_state
    }

    /// Replace the token without touching the state.
    pub fn set_token(&mut self, id_token: Option<String>) {
        self.id_token = id_token;
    }

    /// Move `Authenticated -> Reauthenticating`. Returns whether the state changed.
    pub fn begin_reauthentication(&mut self) -> bool {
        if self.auth_state == AuthState::Authenticated {
            self.auth_state = AuthState::Reauthenticating;
            true
        } else {
            false
        }
    }

    /// Enter `Reauthenticating` regardless of the current state.
    pub fn force_reauthentication(&mut self) {
        self.auth_state = AuthState::Reauthenticating;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_session_is_unauthenticated() {
        let session = Session::default();
        assert_eq!(session.auth_state(), AuthState::Unauthenticated);
        assert_eq!(session.id_token(), None);
    }

    #[test]
    fn only_authenticated_sessions_begin_reauthentication() {
        let mut session = Session::authenticated(SessionToken::new("abc"));
        assert!(session.begin_reauthentication());
        assert_eq!(session.auth_state(), AuthState::Reauthenticating);
        assert!(!session.begin_reauthentication());

        let mut anonymous = Session::unauthenticated();
        assert!(!anonymous.begin_reauthentication());
        assert_eq!(anonymous.auth_state(), AuthState::Unauthenticated);
    }

    #[test]
    fn set_token_keeps_state() {
        let mut session = Session::authenticated(SessionToken::new("old"));
        session.set_token(Some("new".into()));
        assert_eq!(session.id_token(), Some("new"));
        assert_eq!(session.auth_state(), AuthState::Authenticated);
    }

    #[test]
    fn token_uses_camel_case_on_the_wire() {
        let token: SessionToken = serde_json::from_str(r#"{"idToken":"t-1"}"#).unwrap();
        assert_eq!(token, SessionToken::new("t-1"));
        assert_eq!("REAUTHENTICATING".parse::<AuthState>().unwrap(), AuthState::Reauthenticating);
    }
}
