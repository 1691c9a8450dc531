//! Wiring for the presentation layer.
//!
//! `TodoApp` is the context object a host creates once and hands to its
//! screens. The session manager and the synchronizer share one transport and
//! one credential store, so a login is immediately visible to todo
//! operations.

use std::sync::Arc;

use crate::client::ApiClient;
use crate::config::Config;
use crate::error::StoreError;
use crate::http::{Transport, UreqTransport};
use crate::session::SessionManager;
use crate::store::CredentialStore;
use crate::sync::TodoSynchronizer;

pub struct TodoApp {
    pub session: SessionManager,
    pub todos: TodoSynchronizer,
}

impl TodoApp {
    /// Build from configuration with the `ureq` transport and the
    /// file-backed credential store.
    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        let store = config.credential_store()?;
        Self::with_parts(
            ApiClient::new(&config.base_url),
            Arc::new(UreqTransport::new()),
            Arc::new(store),
        )
    }

    pub fn with_parts(
        client: ApiClient,
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
    ) -> Result<Self, StoreError> {
        let session = SessionManager::new(client.clone(), transport.clone(), store.clone())?;
        let todos = TodoSynchronizer::new(client, transport, store);
        tracing::debug!(logged_in = session.is_logged_in(), "todo app ready");
        Ok(Self { session, todos })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCredentialStore;
    use crate::testing::ScriptedTransport;

    #[test]
    fn login_token_reaches_todo_requests() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(200, r#"{"data":{"token":"abc123"}}"#);
        transport.respond(200, "[]");
        let app = TodoApp::with_parts(
            ApiClient::new("http://localhost:3000"),
            transport.clone(),
            Arc::new(MemoryCredentialStore::new()),
        )
        .unwrap();

        app.session.login("alice", "secret").unwrap();
        app.todos.fetch_all().unwrap();

        let sent = transport.requests();
        assert_eq!(sent[1].header("authorization"), Some("Bearer abc123"));
    }

    #[test]
    fn logout_drops_credentials_from_todo_requests() {
        let transport = Arc::new(ScriptedTransport::new());
        transport.respond(401, r#"{"message":"No token provided"}"#);
        let app = TodoApp::with_parts(
            ApiClient::new("http://localhost:3000"),
            transport.clone(),
            Arc::new(MemoryCredentialStore::with_token("abc123")),
        )
        .unwrap();

        app.session.logout().unwrap();
        let _ = app.todos.fetch_all();

        assert_eq!(transport.requests()[0].header("authorization"), None);
    }
}
