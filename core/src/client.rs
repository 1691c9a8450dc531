//! Stateless HTTP request builder and response parser for the todo backend.
//!
//! # Design
//! `ApiClient` holds only a `base_url` and carries no mutable state between
//! calls. Each endpoint is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! A `Transport` executes the round-trip in between, keeping this layer
//! deterministic and free of I/O.
//!
//! Authenticated builders take the session token as `Option<&str>`. With no
//! token the request is still built, without credentials, and the backend
//! is left to reject it.

use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Credentials, LoginResponse, NewTodo, ServerMessage, Todo, TodoItem, TodoList};

/// Synchronous, stateless client for the todo backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_register(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/api/auth/register", None, credentials)
    }

    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/api/auth/login", None, credentials)
    }

    pub fn build_list_todos(&self, token: Option<&str>) -> HttpRequest {
        self.request(HttpMethod::Get, "/api/todos", token)
    }

    pub fn build_get_todo(&self, token: Option<&str>, id: &str) -> HttpRequest {
        self.request(HttpMethod::Get, &format!("/api/todos/{id}"), token)
    }

    pub fn build_create_todo(
        &self,
        token: Option<&str>,
        input: &NewTodo,
    ) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Post, "/api/todos", token, input)
    }

    pub fn build_delete_todo(&self, token: Option<&str>, id: &str) -> HttpRequest {
        self.request(HttpMethod::Delete, &format!("/api/todos/{id}"), token)
    }

    pub fn parse_register(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    /// Extract the session token from a login response.
    pub fn parse_login(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response)?;
        let login: LoginResponse = parse_body(&response)?;
        Ok(login.data.token)
    }

    pub fn parse_list_todos(&self, response: HttpResponse) -> Result<Vec<Todo>, ApiError> {
        check_status(&response)?;
        let list: TodoList = parse_body(&response)?;
        Ok(list.into())
    }

    pub fn parse_get_todo(&self, response: HttpResponse) -> Result<Todo, ApiError> {
        check_status(&response)?;
        let item: TodoItem = parse_body(&response)?;
        Ok(item.into())
    }

    /// Only the status matters; the created item in the body is not needed
    /// because callers refresh the whole list afterwards.
    pub fn parse_create_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_delete_todo(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    fn request(&self, method: HttpMethod, path: &str, token: Option<&str>) -> HttpRequest {
        let mut headers = Vec::new();
        if let Some(token) = token {
            headers.push(("authorization".to_string(), format!("Bearer {token}")));
        }
        HttpRequest {
            method,
            path: format!("{}{path}", self.base_url),
            headers,
            body: None,
        }
    }

    fn json_request<T: serde::Serialize>(
        &self,
        method: HttpMethod,
        path: &str,
        token: Option<&str>,
        payload: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut req = self.request(method, path, token);
        req.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        req.body = Some(body);
        Ok(req)
    }
}

/// Map non-2xx statuses to `ApiError::Status`, keeping the server's message.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    let message = serde_json::from_str::<ServerMessage>(&response.body)
        .ok()
        .and_then(|m| m.message)
        .filter(|m| !m.is_empty());
    Err(ApiError::Status {
        status: response.status,
        message,
    })
}

fn parse_body<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}
