//! In-process fake of the task API for integration tests.
//!
//! Serves the same routes as the real server on `127.0.0.1:0`, keeps its
//! data in memory, counts every request it receives, and can be told to
//! fail the next request.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, patch, post, put};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde_json::{Map, Value, json};

use taskdeck::api::ApiClient;

const TIMESTAMP: &str = "2024-01-01T00:00:00.000Z";

/// A failure to return for the next request instead of handling it.
#[derive(Debug, Clone)]
pub struct Failure {
    /// HTTP status to answer with.
    pub status: u16,
    /// Raw response body; `None` sends an empty body.
    pub body: Option<String>,
}

impl Failure {
    /// A failure carrying `{"message": ...}`.
    pub fn with_message(status: u16, message: &str) -> Self {
        Self {
            status,
            body: Some(json!({ "message": message }).to_string()),
        }
    }

    /// A failure with no body, so the client falls back to its own text.
    pub const fn bare(status: u16) -> Self {
        Self { status, body: None }
    }
}

#[derive(Default)]
struct Backend {
    /// username -> (email, password)
    users: HashMap<String, (String, String)>,
    todos: Vec<Value>,
    tags: Vec<Value>,
    next_id: u64,
    fail_next: Option<Failure>,
}

impl Backend {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

/// Shared state of the fake server.
#[derive(Default)]
pub struct FakeApi {
    backend: Mutex<Backend>,
    requests: AtomicUsize,
    populate_tags: AtomicBool,
}

/// A running fake server.
pub struct FakeServer {
    /// Base URL, e.g. `http://127.0.0.1:54321`.
    pub url: String,
    /// Server state, for seeding and inspection.
    pub api: Arc<FakeApi>,
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

impl FakeServer {
    /// A client pointed at this server.
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&self.url).unwrap()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.api.requests.load(Ordering::SeqCst)
    }

    /// Makes the next request fail with `failure`.
    pub fn fail_next(&self, failure: Failure) {
        self.api.backend.lock().fail_next = Some(failure);
    }

    /// Returns tags inline inside `GET /todo` results instead of by id.
    pub fn populate_tags(&self, on: bool) {
        self.api.populate_tags.store(on, Ordering::SeqCst);
    }

    /// Registers an account directly, bypassing the HTTP signup.
    pub fn add_user(&self, username: &str, password: &str) {
        self.api.backend.lock().users.insert(
            username.to_string(),
            (format!("{username}@example.com"), password.to_string()),
        );
    }

    /// Number of tasks stored for all users.
    pub fn task_count(&self) -> usize {
        self.api.backend.lock().todos.len()
    }

    /// Title of the stored task with `id`.
    pub fn stored_title(&self, id: &str) -> Option<String> {
        self.api
            .backend
            .lock()
            .todos
            .iter()
            .find(|t| t["_id"] == id)
            .and_then(|t| t["title"].as_str().map(str::to_string))
    }
}

/// Token the fake server issues for `username`.
pub fn token_for(username: &str) -> String {
    format!("tok-{username}")
}

/// Starts a fresh fake server on an ephemeral port.
pub async fn start() -> FakeServer {
    let api = Arc::new(FakeApi::default());

    let app = Router::new()
        .route("/user/signup", post(sign_up))
        .route("/user/signin", post(sign_in))
        .route("/todo", get(list_todos))
        .route("/todo/add-todo", post(add_todo))
        .route("/todo/stats", get(stats))
        .route("/todo/batch/completed", delete(delete_completed))
        .route("/todo/status/{status}", get(todos_by_status))
        .route("/todo/{id}", put(update_todo).delete(delete_todo))
        .route("/todo/{id}/toggle-complete", patch(toggle_todo))
        .route("/tag", get(list_tags).post(add_tag))
        .route("/tag/{id}", put(update_tag).delete(delete_tag))
        .route("/tag/{id}/todos", get(todos_by_tag))
        .layer(middleware::from_fn_with_state(Arc::clone(&api), gate))
        .with_state(Arc::clone(&api));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeServer {
        url: format!("http://{addr}"),
        api,
        handle,
    }
}

type Shared = State<Arc<FakeApi>>;

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn not_found(what: &str) -> Response {
    reply(StatusCode::NOT_FOUND, json!({ "message": format!("{what} not found") }))
}

async fn gate(State(api): Shared, request: Request, next: Next) -> Response {
    api.requests.fetch_add(1, Ordering::SeqCst);
    let failure = api.backend.lock().fail_next.take();
    match failure {
        Some(Failure { status, body }) => {
            let status = StatusCode::from_u16(status).unwrap();
            match body {
                Some(body) => (status, [(header::CONTENT_TYPE, "application/json")], body)
                    .into_response(),
                None => status.into_response(),
            }
        }
        None => next.run(request).await,
    }
}

/// The user id behind the bearer token, if it names a known user.
fn caller(api: &FakeApi, headers: &HeaderMap) -> Option<String> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let username = raw.strip_prefix("Bearer tok-")?;
    api.backend
        .lock()
        .users
        .contains_key(username)
        .then(|| format!("user-{username}"))
}

macro_rules! authorize {
    ($api:expr, $headers:expr) => {
        match caller(&$api, &$headers) {
            Some(user) => user,
            None => {
                return reply(StatusCode::UNAUTHORIZED, json!({ "message": "Unauthorized" }));
            }
        }
    };
}

fn text(body: &Value, key: &str) -> String {
    body[key].as_str().unwrap_or_default().to_string()
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

async fn sign_up(State(api): Shared, Json(body): Json<Value>) -> Response {
    let username = text(&body, "username");
    let mut backend = api.backend.lock();
    if backend.users.contains_key(&username) {
        return reply(StatusCode::BAD_REQUEST, json!({ "message": "User already exists" }));
    }
    backend
        .users
        .insert(username, (text(&body, "email"), text(&body, "password")));
    reply(StatusCode::CREATED, json!({ "message": "You are signed up !" }))
}

async fn sign_in(State(api): Shared, Json(body): Json<Value>) -> Response {
    let username = text(&body, "username");
    let backend = api.backend.lock();
    match backend.users.get(&username) {
        Some((email, password)) if *password == text(&body, "password") => reply(
            StatusCode::OK,
            json!({
                "message": "Login successful",
                "token": token_for(&username),
                "user": {
                    "_id": format!("user-{username}"),
                    "username": username,
                    "email": email,
                }
            }),
        ),
        _ => reply(StatusCode::UNAUTHORIZED, json!({ "message": "Invalid credentials" })),
    }
}

// ---------------------------------------------------------------------------
// Todos
// ---------------------------------------------------------------------------

fn owned_todos(backend: &Backend, user: &str) -> Vec<Value> {
    backend
        .todos
        .iter()
        .filter(|t| t["userId"] == user)
        .cloned()
        .collect()
}

fn with_inline_tags(backend: &Backend, mut todos: Vec<Value>) -> Vec<Value> {
    for todo in &mut todos {
        let tag_id = todo["tagId"].as_str().map(str::to_string);
        if let Some(tag) = tag_id.and_then(|id| backend.tags.iter().find(|t| t["_id"] == id)) {
            todo["tagId"] = tag.clone();
        }
    }
    todos
}

async fn list_todos(
    State(api): Shared,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let user = authorize!(api, headers);
    let backend = api.backend.lock();
    let mut todos = owned_todos(&backend, &user);
    if let Some(completed) = query.get("completed") {
        let want = completed == "true";
        todos.retain(|t| t["completed"] == want);
    }
    if let Some(tag) = query.get("tag") {
        todos.retain(|t| t["tagId"] == tag.as_str());
    }
    if api.populate_tags.load(Ordering::SeqCst) {
        todos = with_inline_tags(&backend, todos);
    }
    let count = todos.len();
    reply(
        StatusCode::OK,
        json!({ "todos": todos, "count": count, "total": count, "page": 1, "totalPages": 1 }),
    )
}

async fn add_todo(State(api): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let user = authorize!(api, headers);
    let title = text(&body, "title");
    if title.trim().is_empty() {
        return reply(StatusCode::BAD_REQUEST, json!({ "message": "Title is required" }));
    }
    let mut backend = api.backend.lock();
    let id = backend.next_id("todo");
    let todo = json!({
        "_id": id,
        "title": title,
        "description": body.get("description").cloned().unwrap_or(Value::Null),
        "dueDate": body.get("dueDate").cloned().unwrap_or(Value::Null),
        "tagId": body.get("tagId").cloned().unwrap_or(Value::Null),
        "userId": user,
        "completed": body["completed"].as_bool().unwrap_or(false),
        "createdAt": TIMESTAMP,
        "updatedAt": TIMESTAMP,
    });
    backend.todos.push(todo.clone());
    reply(StatusCode::CREATED, json!({ "message": "Todo created", "todo": todo }))
}

fn find_todo<'a>(backend: &'a mut Backend, user: &str, id: &str) -> Option<&'a mut Value> {
    backend
        .todos
        .iter_mut()
        .find(|t| t["_id"] == id && t["userId"] == user)
}

async fn update_todo(
    State(api): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let user = authorize!(api, headers);
    let mut backend = api.backend.lock();
    let Some(todo) = find_todo(&mut backend, &user, &id) else {
        return not_found("Todo");
    };
    let fields: Map<String, Value> = body.as_object().cloned().unwrap_or_default();
    for (key, value) in fields {
        if ["title", "description", "dueDate", "tagId", "completed"].contains(&key.as_str()) {
            todo[key] = value;
        }
    }
    reply(StatusCode::OK, json!({ "message": "Todo updated", "todo": todo }))
}

async fn delete_todo(State(api): Shared, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let user = authorize!(api, headers);
    let mut backend = api.backend.lock();
    let before = backend.todos.len();
    backend
        .todos
        .retain(|t| !(t["_id"] == id.as_str() && t["userId"] == user.as_str()));
    if backend.todos.len() == before {
        return not_found("Todo");
    }
    reply(StatusCode::OK, json!({ "message": "Todo deleted" }))
}

async fn toggle_todo(State(api): Shared, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let user = authorize!(api, headers);
    let mut backend = api.backend.lock();
    let Some(todo) = find_todo(&mut backend, &user, &id) else {
        return not_found("Todo");
    };
    let flipped = !todo["completed"].as_bool().unwrap_or(false);
    todo["completed"] = Value::Bool(flipped);
    reply(StatusCode::OK, json!({ "message": "Todo toggled", "todo": todo }))
}

async fn delete_completed(State(api): Shared, headers: HeaderMap) -> Response {
    let user = authorize!(api, headers);
    let mut backend = api.backend.lock();
    let before = backend.todos.len();
    backend
        .todos
        .retain(|t| !(t["userId"] == user.as_str() && t["completed"] == true));
    let deleted = before - backend.todos.len();
    reply(
        StatusCode::OK,
        json!({ "message": format!("{deleted} completed todos deleted"), "deletedCount": deleted }),
    )
}

async fn stats(State(api): Shared, headers: HeaderMap) -> Response {
    let user = authorize!(api, headers);
    let backend = api.backend.lock();
    let todos = owned_todos(&backend, &user);
    let total = todos.len();
    let completed = todos.iter().filter(|t| t["completed"] == true).count();
    let rate = if total == 0 {
        0.0
    } else {
        #[allow(clippy::cast_precision_loss)]
        let rate = completed as f64 * 100.0 / total as f64;
        rate
    };
    let tag_stats: Vec<Value> = backend
        .tags
        .iter()
        .filter(|tag| tag["userId"] == user.as_str())
        .map(|tag| {
            let tagged: Vec<&Value> = todos.iter().filter(|t| t["tagId"] == tag["_id"]).collect();
            let done = tagged.iter().filter(|t| t["completed"] == true).count();
            json!({
                "_id": { "name": tag["name"], "color": tag["color"] },
                "total": tagged.len(),
                "completed": done,
                "pending": tagged.len() - done,
            })
        })
        .collect();
    reply(
        StatusCode::OK,
        json!({
            "total": total,
            "completed": completed,
            "pending": total - completed,
            "completionRate": rate,
            "tagStats": tag_stats,
        }),
    )
}

async fn todos_by_status(
    State(api): Shared,
    headers: HeaderMap,
    Path(status): Path<String>,
) -> Response {
    let user = authorize!(api, headers);
    let want = match status.as_str() {
        "completed" => true,
        "pending" => false,
        _ => return reply(StatusCode::BAD_REQUEST, json!({ "message": "Invalid status" })),
    };
    let backend = api.backend.lock();
    let mut todos = owned_todos(&backend, &user);
    todos.retain(|t| t["completed"] == want);
    let count = todos.len();
    reply(StatusCode::OK, json!({ "todos": todos, "count": count }))
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

async fn list_tags(State(api): Shared, headers: HeaderMap) -> Response {
    let user = authorize!(api, headers);
    let backend = api.backend.lock();
    let tags: Vec<Value> = backend
        .tags
        .iter()
        .filter(|t| t["userId"] == user.as_str())
        .cloned()
        .collect();
    reply(StatusCode::OK, json!({ "tags": tags }))
}

async fn add_tag(State(api): Shared, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    let user = authorize!(api, headers);
    let name = text(&body, "name");
    if name.trim().is_empty() {
        return reply(StatusCode::BAD_REQUEST, json!({ "message": "Tag name is required" }));
    }
    let mut backend = api.backend.lock();
    if backend
        .tags
        .iter()
        .any(|t| t["userId"] == user.as_str() && t["name"] == name.as_str())
    {
        return reply(StatusCode::BAD_REQUEST, json!({ "message": "Tag already exists" }));
    }
    let id = backend.next_id("tag");
    let color = body["color"].as_str().unwrap_or("#8B5CF6").to_string();
    let tag = json!({
        "_id": id,
        "name": name,
        "color": color,
        "userId": user,
        "createdAt": TIMESTAMP,
    });
    backend.tags.push(tag.clone());
    reply(StatusCode::CREATED, json!({ "message": "Tag created", "tag": tag }))
}

async fn update_tag(
    State(api): Shared,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let user = authorize!(api, headers);
    let mut backend = api.backend.lock();
    let Some(tag) = backend
        .tags
        .iter_mut()
        .find(|t| t["_id"] == id.as_str() && t["userId"] == user.as_str())
    else {
        return not_found("Tag");
    };
    for key in ["name", "color"] {
        if let Some(value) = body.get(key) {
            tag[key] = value.clone();
        }
    }
    reply(StatusCode::OK, json!({ "message": "Tag updated", "tag": tag }))
}

/// Deletes the tag and detaches it from the caller's tasks.
async fn delete_tag(State(api): Shared, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let user = authorize!(api, headers);
    let mut backend = api.backend.lock();
    let before = backend.tags.len();
    backend
        .tags
        .retain(|t| !(t["_id"] == id.as_str() && t["userId"] == user.as_str()));
    if backend.tags.len() == before {
        return not_found("Tag");
    }
    for todo in &mut backend.todos {
        if todo["tagId"] == id.as_str() {
            todo["tagId"] = Value::Null;
        }
    }
    reply(StatusCode::OK, json!({ "message": "Tag deleted" }))
}

async fn todos_by_tag(State(api): Shared, headers: HeaderMap, Path(id): Path<String>) -> Response {
    let user = authorize!(api, headers);
    let backend = api.backend.lock();
    let Some(tag) = backend
        .tags
        .iter()
        .find(|t| t["_id"] == id.as_str() && t["userId"] == user.as_str())
        .cloned()
    else {
        return not_found("Tag");
    };
    let todos: Vec<Value> = owned_todos(&backend, &user)
        .into_iter()
        .filter(|t| t["tagId"] == id.as_str())
        .collect();
    reply(StatusCode::OK, json!({ "tag": tag, "todos": todos }))
}
