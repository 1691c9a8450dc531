//! Login, registration and logout.
//!
//! # Design
//! `SessionManager` is the only writer of the credential store. Its state
//! machine has two states:
//!
//! ```text
//! LoggedOut --login ok--> LoggedIn --logout--> LoggedOut
//! ```
//!
//! The state is never cached: it is read from the credential store, the
//! same place `TodoSynchronizer` takes its bearer token from, so the two
//! cannot disagree. A failed login changes nothing. There is no refresh or
//! expiry handling; an expired token only shows up when a later
//! authenticated call is rejected.

use std::fmt;
use std::sync::Arc;

use crate::client::ApiClient;
use crate::error::{ClientError, StoreError};
use crate::http::Transport;
use crate::store::CredentialStore;
use crate::types::Credentials;

/// Whether a session token is currently held.
#[derive(Clone, PartialEq, Eq)]
pub enum SessionState {
    LoggedOut,
    LoggedIn { token: String },
}

impl fmt::Debug for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::LoggedOut => write!(f, "LoggedOut"),
            SessionState::LoggedIn { .. } => write!(f, "LoggedIn {{ token: <redacted> }}"),
        }
    }
}

/// Owns the process-wide session.
pub struct SessionManager {
    client: ApiClient,
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
}

impl SessionManager {
    /// Open the session over `store`; a token persisted by an earlier
    /// process counts as logged in. Fails if the store cannot be read.
    pub fn new(
        client: ApiClient,
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, StoreError> {
        let restored = store.load()?.is_some();
        tracing::debug!(restored, "session opened");
        Ok(Self {
            client,
            transport,
            store,
        })
    }

    /// Current state, read from the credential store. An unreadable store
    /// counts as logged out, since no token could be sent either.
    pub fn state(&self) -> SessionState {
        match self.store.load() {
            Ok(Some(token)) => SessionState::LoggedIn { token },
            Ok(None) => SessionState::LoggedOut,
            Err(e) => {
                tracing::warn!(error = %e, "failed to read session token");
                SessionState::LoggedOut
            }
        }
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.state(), SessionState::LoggedIn { .. })
    }

    /// Create an account. Does not log in.
    pub fn register(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let credentials = credentials(username, password);
        let result = self
            .client
            .build_register(&credentials)
            .and_then(|req| self.transport.execute(req))
            .and_then(|resp| self.client.parse_register(resp));

        match result {
            Ok(()) => {
                tracing::info!(username, "registered");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(username, error = %e, "registration failed");
                Err(ClientError::from_api(&e, e.user_message()))
            }
        }
    }

    /// Exchange credentials for a token and persist it.
    pub fn login(&self, username: &str, password: &str) -> Result<String, ClientError> {
        let credentials = credentials(username, password);
        let token = self
            .client
            .build_login(&credentials)
            .and_then(|req| self.transport.execute(req))
            .and_then(|resp| self.client.parse_login(resp))
            .map_err(|e| {
                tracing::warn!(username, error = %e, "login failed");
                ClientError::from_api(&e, e.user_message())
            })?;

        self.store.save(&token).map_err(|e| {
            tracing::warn!(error = %e, "failed to persist session token");
            ClientError::storage(&e)
        })?;
        tracing::info!(username, "logged in");
        Ok(token)
    }

    /// Forget the token. No server call is made; calling this while logged
    /// out is harmless.
    pub fn logout(&self) -> Result<(), ClientError> {
        self.store.clear().map_err(|e| {
            tracing::warn!(error = %e, "failed to clear session token");
            ClientError::storage(&e)
        })?;
        tracing::info!("logged out");
        Ok(())
    }
}

fn credentials(username: &str, password: &str) -> Credentials {
    Credentials {
        username: username.to_string(),
        password: password.to_string(),
    }
}
