//! In-memory stand-in for the todo backend.
//!
//! Implements registration, login with opaque bearer tokens, and per-user
//! todo lists kept in insertion order. Every error carries a JSON
//! `{ "message": ... }` body, like the real service.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Todo {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub description: String,
}

#[derive(Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct NewTodo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Default)]
pub struct Backend {
    /// username -> password
    users: HashMap<String, String>,
    /// token -> username
    sessions: HashMap<String, String>,
    /// (owner, item) in insertion order
    todos: Vec<(String, Todo)>,
}

pub type Db = Arc<RwLock<Backend>>;

/// Error response with a JSON message body.
struct ApiFailure {
    status: StatusCode,
    message: &'static str,
}

impl ApiFailure {
    fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Backend::default()));
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/todos", get(list_todos).post(create_todo))
        .route("/api/todos/{id}", get(get_todo).delete(delete_todo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn register(
    State(db): State<Db>,
    Json(input): Json<Credentials>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiFailure> {
    if input.username.is_empty() || input.password.is_empty() {
        return Err(ApiFailure::new(
            StatusCode::BAD_REQUEST,
            "Username and password are required",
        ));
    }
    let mut db = db.write().await;
    if db.users.contains_key(&input.username) {
        return Err(ApiFailure::new(
            StatusCode::BAD_REQUEST,
            "Username already exists",
        ));
    }
    tracing::info!(username = %input.username, "user registered");
    db.users.insert(input.username, input.password);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered successfully" })),
    ))
}

async fn login(
    State(db): State<Db>,
    Json(input): Json<Credentials>,
) -> Result<Json<serde_json::Value>, ApiFailure> {
    let mut db = db.write().await;
    match db.users.get(&input.username) {
        Some(password) if *password == input.password => {}
        _ => {
            return Err(ApiFailure::new(
                StatusCode::UNAUTHORIZED,
                "Invalid credentials",
            ))
        }
    }
    let token = Uuid::new_v4().simple().to_string();
    db.sessions.insert(token.clone(), input.username);
    Ok(Json(json!({ "data": { "token": token } })))
}

/// Resolve the bearer token in `headers` to a username.
fn authenticate(db: &Backend, headers: &HeaderMap) -> Result<String, ApiFailure> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| ApiFailure::new(StatusCode::UNAUTHORIZED, "No token provided"))?;
    db.sessions
        .get(token)
        .cloned()
        .ok_or_else(|| ApiFailure::new(StatusCode::UNAUTHORIZED, "Invalid token"))
}

async fn list_todos(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<Vec<Todo>>, ApiFailure> {
    let db = db.read().await;
    let user = authenticate(&db, &headers)?;
    let todos = db
        .todos
        .iter()
        .filter(|(owner, _)| *owner == user)
        .map(|(_, todo)| todo.clone())
        .collect();
    Ok(Json(todos))
}

async fn create_todo(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<NewTodo>,
) -> Result<(StatusCode, Json<Todo>), ApiFailure> {
    let mut db = db.write().await;
    let user = authenticate(&db, &headers)?;
    if input.title.is_empty() || input.description.is_empty() {
        return Err(ApiFailure::new(
            StatusCode::BAD_REQUEST,
            "Title and description are required",
        ));
    }
    let todo = Todo {
        id: Uuid::new_v4().simple().to_string(),
        title: input.title,
        description: input.description,
    };
    db.todos.push((user, todo.clone()));
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn get_todo(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Todo>, ApiFailure> {
    let db = db.read().await;
    let user = authenticate(&db, &headers)?;
    db.todos
        .iter()
        .find(|(owner, todo)| *owner == user && todo.id == id)
        .map(|(_, todo)| Json(todo.clone()))
        .ok_or_else(|| ApiFailure::new(StatusCode::NOT_FOUND, "Todo not found"))
}

async fn delete_todo(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiFailure> {
    let mut db = db.write().await;
    let user = authenticate(&db, &headers)?;
    let index = db
        .todos
        .iter()
        .position(|(owner, todo)| *owner == user && todo.id == id)
        .ok_or_else(|| ApiFailure::new(StatusCode::NOT_FOUND, "Todo not found"))?;
    db.todos.remove(index);
    Ok(Json(json!({ "message": "Todo deleted" })))
}
