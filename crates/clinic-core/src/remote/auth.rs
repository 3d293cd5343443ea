//! Password sign-in against the backend's auth endpoint.

use reqwest::Method;
use serde::{Deserialize, Serialize};

use super::{RemoteError, RemoteResult, RestClient};
use crate::session::{AuthError, AuthProvider, Session};

#[derive(Serialize)]
struct PasswordGrant<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: AuthUser,
}

#[derive(Deserialize)]
struct AuthUser {
    id: String,
    email: Option<String>,
}

impl RestClient {
    /// Exchange email and password for a session.
    pub fn sign_in_with_password(&self, email: &str, password: &str) -> RemoteResult<Session> {
        let response = self.send(
            self.request(Method::POST, "/auth/v1/token")
                .query(&[("grant_type", "password")])
                .json(&PasswordGrant { email, password }),
        )?;
        let token: TokenResponse = response
            .json()
            .map_err(|e| RemoteError::ResponseParsing(e.to_string()))?;

        Ok(Session {
            user_id: token.user.id,
            email: token.user.email,
            access_token: Some(token.access_token),
        })
    }

    /// Revoke the session's token.
    pub fn sign_out_session(&self, session: &Session) -> RemoteResult<()> {
        let token = session.access_token.as_deref().unwrap_or(&self.anon_key);
        self.send(
            self.client
                .post(format!("{}/auth/v1/logout", self.base_url))
                .header("apikey", &self.anon_key)
                .bearer_auth(token),
        )?;
        Ok(())
    }
}

impl AuthProvider for RestClient {
    fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.sign_in_with_password(email, password)
            .map_err(|e| AuthError::SignIn(e.to_string()))
    }

    fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        self.sign_out_session(session)
            .map_err(|e| AuthError::SignOut(e.to_string()))
    }
}
