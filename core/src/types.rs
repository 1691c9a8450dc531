//! Wire DTOs for the todo backend.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.

use serde::{Deserialize, Serialize};

/// A single todo item returned by the API. The id is assigned by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    pub description: String,
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
}

/// Request payload for both registration and login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Successful login payload: `{ "data": { "token": "..." } }`.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LoginResponse {
    pub data: LoginData,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LoginData {
    pub token: String,
}

/// The list endpoint answers with either a bare array or `{ "data": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum TodoList {
    Bare(Vec<Todo>),
    Wrapped { data: Vec<Todo> },
}

impl From<TodoList> for Vec<Todo> {
    fn from(list: TodoList) -> Self {
        match list {
            TodoList::Bare(todos) | TodoList::Wrapped { data: todos } => todos,
        }
    }
}

/// The single-item endpoints answer with either the item or `{ "data": item }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum TodoItem {
    Bare(Todo),
    Wrapped { data: Todo },
}

impl From<TodoItem> for Todo {
    fn from(item: TodoItem) -> Self {
        match item {
            TodoItem::Bare(todo) | TodoItem::Wrapped { data: todo } => todo,
        }
    }
}

/// Error body sent by the backend alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ServerMessage {
    pub message: Option<String>,
}
