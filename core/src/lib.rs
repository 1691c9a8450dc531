//! Session-authenticated todo synchronization for the mobile client.
//!
//! # Overview
//! Logs a user in against the todo backend, keeps the session token in a
//! durable credential store, and mirrors the user's todo list in memory.
//! Rendering is left to the host; it calls into `TodoApp` and displays the
//! state and typed errors it gets back.
//!
//! # Design
//! - `ApiClient` is stateless and sans-IO: `build_*` produces an
//!   `HttpRequest`, `parse_*` consumes an `HttpResponse`.
//! - A `Transport` executes requests; `UreqTransport` is the default.
//! - `CredentialStore` persists the token; `SessionManager` is its only
//!   writer, `TodoSynchronizer` reads it for every request.
//! - Mutations are always followed by a full refresh from the backend.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod store;
pub mod sync;
pub mod types;

#[cfg(test)]
mod testing;

pub use app::TodoApp;
pub use client::ApiClient;
pub use config::Config;
pub use error::{ApiError, ClientError, ConfigError, ErrorKind, StoreError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport, UreqTransport};
pub use session::{SessionManager, SessionState};
pub use store::{CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use sync::TodoSynchronizer;
pub use types::{Credentials, NewTodo, Todo};
