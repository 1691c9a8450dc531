//! The authoritative in-memory todo list for the current session.
//!
//! # Design
//! The backend is the only source of truth. `fetch_all` replaces the whole
//! collection with the server's answer, and `create`/`remove` end with a
//! `fetch_all` instead of patching the list locally.
//!
//! Every operation takes `&self`, so one `TodoSynchronizer` can be shared
//! across threads and several operations may be in flight at once. There is
//! no de-duplication and no cancellation: whichever fetch completes last
//! overwrites the collection. A failed fetch leaves it untouched.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use crate::client::ApiClient;
use crate::error::{ApiError, ClientError};
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::store::CredentialStore;
use crate::types::{NewTodo, Todo};

pub const MISSING_FIELDS_MESSAGE: &str = "Both title and description are required.";
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch todos";
pub const LOAD_FAILED_MESSAGE: &str = "Failed to load todo";
pub const ADD_FAILED_MESSAGE: &str = "Failed to add todo";
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete todo";

pub struct TodoSynchronizer {
    client: ApiClient,
    transport: Arc<dyn Transport>,
    store: Arc<dyn CredentialStore>,
    todos: RwLock<Vec<Todo>>,
    in_flight: AtomicUsize,
}

/// Counts an operation as in flight until dropped.
struct Busy<'a>(&'a AtomicUsize);

impl<'a> Busy<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl TodoSynchronizer {
    pub fn new(
        client: ApiClient,
        transport: Arc<dyn Transport>,
        store: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            client,
            transport,
            store,
            todos: RwLock::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
        }
    }

    /// Snapshot of the collection, in server order.
    pub fn todos(&self) -> Vec<Todo> {
        self.todos
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// True while any operation is waiting on the network.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    /// Replace the collection with the server's list.
    pub fn fetch_all(&self) -> Result<Vec<Todo>, ClientError> {
        let _busy = Busy::enter(&self.in_flight);
        let token = self.token()?;
        let req = self.client.build_list_todos(token.as_deref());
        let todos = self
            .send(req)
            .and_then(|resp| self.client.parse_list_todos(resp))
            .map_err(|e| failure(&e, FETCH_FAILED_MESSAGE))?;

        tracing::debug!(count = todos.len(), "todo list refreshed");
        *self.todos.write().unwrap_or_else(PoisonError::into_inner) = todos.clone();
        Ok(todos)
    }

    /// Load one item for a detail view. The collection is not touched.
    pub fn fetch_one(&self, id: &str) -> Result<Todo, ClientError> {
        let _busy = Busy::enter(&self.in_flight);
        let token = self.token()?;
        let req = self.client.build_get_todo(token.as_deref(), id);
        self.send(req)
            .and_then(|resp| self.client.parse_get_todo(resp))
            .map_err(|e| failure(&e, LOAD_FAILED_MESSAGE))
    }

    /// Create an item, then refresh the collection.
    ///
    /// Only emptiness is checked locally; whitespace-only fields go to the
    /// server as-is.
    pub fn create(&self, title: &str, description: &str) -> Result<(), ClientError> {
        if title.is_empty() || description.is_empty() {
            return Err(ClientError::validation(MISSING_FIELDS_MESSAGE));
        }
        let _busy = Busy::enter(&self.in_flight);
        let token = self.token()?;
        let input = NewTodo {
            title: title.to_string(),
            description: description.to_string(),
        };
        self.client
            .build_create_todo(token.as_deref(), &input)
            .and_then(|req| self.send(req))
            .and_then(|resp| self.client.parse_create_todo(resp))
            .map_err(|e| failure(&e, ADD_FAILED_MESSAGE))?;

        self.fetch_all().map(|_| ())
    }

    /// Delete an item, then refresh the collection. Membership is not
    /// checked locally; unknown ids are the server's call.
    pub fn remove(&self, id: &str) -> Result<(), ClientError> {
        let _busy = Busy::enter(&self.in_flight);
        let token = self.token()?;
        let req = self.client.build_delete_todo(token.as_deref(), id);
        self.send(req)
            .and_then(|resp| self.client.parse_delete_todo(resp))
            .map_err(|e| failure(&e, DELETE_FAILED_MESSAGE))?;

        self.fetch_all().map(|_| ())
    }

    fn token(&self) -> Result<Option<String>, ClientError> {
        self.store.load().map_err(|e| {
            tracing::warn!(error = %e, "failed to read session token");
            ClientError::storage(&e)
        })
    }

    fn send(&self, req: HttpRequest) -> Result<HttpResponse, ApiError> {
        if req.header("authorization").is_none() {
            tracing::debug!(path = %req.path, "no session token, sending unauthenticated");
        }
        self.transport.execute(req)
    }
}

fn failure(err: &ApiError, message: &str) -> ClientError {
    tracing::warn!(error = %err, "{message}");
    ClientError::from_api(err, message)
}
