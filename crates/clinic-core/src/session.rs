//! Authentication context.
//!
//! Holds the signed-in user for the lifetime of the app. Sign-in itself is
//! delegated to an [`AuthProvider`] (the hosted backend's auth endpoint);
//! this module only tracks the result and gates writes on it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Authentication errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AuthError {
    #[error("Not signed in")]
    NotSignedIn,

    #[error("Sign-in failed: {0}")]
    SignIn(String),

    #[error("Sign-out failed: {0}")]
    SignOut(String),
}

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Auth identity; also the key of the user's staff profile
    pub user_id: String,
    pub email: Option<String>,
    /// Bearer token for the hosted backend; `None` for local sessions
    pub access_token: Option<String>,
}

impl Session {
    /// A session for the local store, where there is no auth server.
    pub fn local(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
            access_token: None,
        }
    }
}

/// Something that can exchange credentials for a [`Session`].
pub trait AuthProvider {
    fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    fn sign_out(&self, session: &Session) -> Result<(), AuthError>;
}

/// Sign-in for the local store. There is no credential check: the
/// identifier passed as `email` becomes the user ID, and sign-out only drops
/// the session.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalAuth;

impl AuthProvider for LocalAuth {
    fn sign_in(&self, email: &str, _password: &str) -> Result<Session, AuthError> {
        let user_id = email.trim();
        if user_id.is_empty() {
            return Err(AuthError::SignIn("a staff identifier is required".into()));
        }
        Ok(Session::local(user_id))
    }

    fn sign_out(&self, _session: &Session) -> Result<(), AuthError> {
        Ok(())
    }
}

/// Current-user holder shared by every view.
#[derive(Debug, Default)]
pub struct AuthContext {
    session: Option<Session>,
}

impl AuthContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context that starts out signed in.
    pub fn with_session(session: Session) -> Self {
        Self {
            session: Some(session),
        }
    }

    pub fn sign_in<P: AuthProvider + ?Sized>(
        &mut self,
        provider: &P,
        email: &str,
        password: &str,
    ) -> Result<&Session, AuthError> {
        let session = provider.sign_in(email, password)?;
        tracing::info!(user_id = %session.user_id, "signed in");
        Ok(self.session.insert(session))
    }

    /// Clear the session. The local session is dropped even if the provider
    /// call fails.
    pub fn sign_out<P: AuthProvider + ?Sized>(&mut self, provider: &P) -> Result<(), AuthError> {
        match self.session.take() {
            Some(session) => {
                tracing::info!(user_id = %session.user_id, "signed out");
                provider.sign_out(&session)
            }
            None => Ok(()),
        }
    }

    pub fn current(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    /// The session, or [`AuthError::NotSignedIn`].
    pub fn require_user(&self) -> Result<&Session, AuthError> {
        self.session.as_ref().ok_or(AuthError::NotSignedIn)
    }

    pub fn user_id(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.user_id.as_str())
    }
}
