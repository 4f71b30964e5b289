//! In-process stub of the school-management REST API.
//!
//! Collections live in memory as raw JSON. Every request's `Authorization`
//! header is recorded, and a configurable delay or one-shot failure can be
//! injected ahead of the handlers.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use axum::extract::{Multipart, Path, Request, State};
use axum::http::{Method, StatusCode};
use axum::http::header::AUTHORIZATION;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post, put};
use axum::Router;
use schooldesk::config::ClientConfig;
use schooldesk::net::ApiClient;
use schooldesk::session::{MemoryStore, SessionStore};
use serde_json::{Value, json};

pub const PASSWORD: &str = "secret1";

#[derive(Default)]
pub struct StubState {
    pub classes: Vec<Value>,
    pub students: Vec<Value>,
    pub teachers: Vec<Value>,
    /// `Authorization` header of every request, in arrival order.
    pub auth_headers: Vec<Option<String>>,
    /// `(method, path)` of every request, in arrival order.
    pub requests: Vec<(String, String)>,
    pub delay: Duration,
    /// Answer the next request with this status and message.
    pub fail_next: Option<(u16, String)>,
    /// Answer the next `GET` with this status and message.
    pub fail_next_get: Option<(u16, String)>,
    pub registered: Vec<String>,
    next_id: u64,
}

#[derive(Clone, Default)]
pub struct Stub {
    state: Arc<Mutex<StubState>>,
}

impl Stub {
    pub fn with<T>(&self, f: impl FnOnce(&mut StubState) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    fn next_id(&self, prefix: &str) -> String {
        self.with(|s| {
            s.next_id += 1;
            format!("{prefix}{}", s.next_id)
        })
    }

    /// Bind on an ephemeral port and serve until the test ends.
    pub async fn serve(&self) -> String {
        let app = router(self.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }
}

/// Session over in-memory storage plus a client for `base_url`.
pub fn client(base_url: &str) -> (SessionStore, ApiClient, Arc<MemoryStore>) {
    let storage = Arc::new(MemoryStore::new());
    let session = SessionStore::restore(storage.clone());
    let config = ClientConfig::from_lookup(|_| None).with_base_url(base_url);
    let api = ApiClient::new(&config, session.token_source()).unwrap();
    (session, api, storage)
}

// =============================================================================
// ROUTER
// =============================================================================

fn router(stub: Stub) -> Router {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/api/classes", get(list_classes).post(create_class))
        .route("/api/classes/{id}", put(update_class).delete(delete_class))
        .route("/api/students", get(list_students).post(create_student))
        .route("/api/students/import/csv", post(import_students))
        .route("/api/students/{id}", put(update_student).delete(delete_student))
        .route("/api/teachers", get(list_teachers).post(create_teacher))
        .route("/api/teachers/{id}", put(update_teacher).delete(delete_teacher))
        .layer(middleware::from_fn_with_state(stub.clone(), observe))
        .with_state(stub)
}

async fn observe(State(stub): State<Stub>, request: Request, next: Next) -> Response {
    let header = request.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok()).map(str::to_owned);
    let (delay, failure) = stub.with(|s| {
        s.auth_headers.push(header);
        s.requests.push((request.method().to_string(), request.uri().path().to_owned()));
        let failure = match s.fail_next.take() {
            Some(failure) => Some(failure),
            None if request.method() == Method::GET => s.fail_next_get.take(),
            None => None,
        };
        (s.delay, failure)
    });
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    if let Some((status, message)) = failure {
        let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        return (status, Json(json!({ "message": message }))).into_response();
    }
    next.run(request).await
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
}

// =============================================================================
// AUTH
// =============================================================================

async fn login(Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    if body["password"] != PASSWORD {
        return bad_request("Invalid credentials");
    }
    let user = json!({ "_id": "u1", "name": "Ada", "email": email, "role": "admin" });
    Json(json!({ "token": format!("tok-{email}"), "user": user })).into_response()
}

async fn register(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_owned();
    if body["role"] != "student" {
        return bad_request("unexpected role");
    }
    let taken = stub.with(|s| {
        if s.registered.contains(&email) {
            true
        } else {
            s.registered.push(email.clone());
            false
        }
    });
    if taken {
        return bad_request("Email already registered");
    }
    (StatusCode::CREATED, Json(json!({ "message": "User registered" }))).into_response()
}

// =============================================================================
// COLLECTIONS
// =============================================================================

#[derive(Clone, Copy)]
enum Kind {
    Classes,
    Students,
    Teachers,
}

impl Kind {
    fn list<'a>(self, s: &'a mut StubState) -> &'a mut Vec<Value> {
        match self {
            Self::Classes => &mut s.classes,
            Self::Students => &mut s.students,
            Self::Teachers => &mut s.teachers,
        }
    }

    fn list_body(self, items: Vec<Value>) -> Value {
        match self {
            Self::Classes => json!({ "classes": items }),
            Self::Students => json!({ "students": items }),
            Self::Teachers => Value::Array(items),
        }
    }

    fn item_body(self, item: Value) -> Value {
        match self {
            Self::Classes => json!({ "class": item }),
            Self::Students => json!({ "student": item }),
            Self::Teachers => item,
        }
    }

    fn id_prefix(self) -> &'static str {
        match self {
            Self::Classes => "c",
            Self::Students => "s",
            Self::Teachers => "t",
        }
    }
}

fn list(stub: &Stub, kind: Kind) -> Response {
    let items = stub.with(|s| kind.list(s).clone());
    Json(kind.list_body(items)).into_response()
}

fn create(stub: &Stub, kind: Kind, mut body: Value) -> Response {
    if body["name"].as_str().is_none_or(str::is_empty) {
        return bad_request("Name is required");
    }
    body["_id"] = Value::String(stub.next_id(kind.id_prefix()));
    stub.with(|s| kind.list(s).push(body.clone()));
    (StatusCode::CREATED, Json(kind.item_body(body))).into_response()
}

fn update(stub: &Stub, kind: Kind, id: &str, mut body: Value) -> Response {
    body["_id"] = Value::String(id.to_owned());
    let found = stub.with(|s| match kind.list(s).iter_mut().find(|v| v["_id"] == id) {
        Some(slot) => {
            *slot = body.clone();
            true
        }
        None => false,
    });
    if !found {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "Not found" }))).into_response();
    }
    Json(kind.item_body(body)).into_response()
}

fn delete(stub: &Stub, kind: Kind, id: &str) -> Response {
    stub.with(|s| kind.list(s).retain(|v| v["_id"] != id));
    Json(json!({ "message": "Deleted" })).into_response()
}

async fn list_classes(State(stub): State<Stub>) -> Response {
    list(&stub, Kind::Classes)
}

async fn create_class(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    create(&stub, Kind::Classes, body)
}

async fn update_class(State(stub): State<Stub>, Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    update(&stub, Kind::Classes, &id, body)
}

async fn delete_class(State(stub): State<Stub>, Path(id): Path<String>) -> Response {
    delete(&stub, Kind::Classes, &id)
}

async fn list_students(State(stub): State<Stub>) -> Response {
    list(&stub, Kind::Students)
}

async fn create_student(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    create(&stub, Kind::Students, body)
}

async fn update_student(State(stub): State<Stub>, Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    update(&stub, Kind::Students, &id, body)
}

async fn delete_student(State(stub): State<Stub>, Path(id): Path<String>) -> Response {
    delete(&stub, Kind::Students, &id)
}

async fn list_teachers(State(stub): State<Stub>) -> Response {
    list(&stub, Kind::Teachers)
}

async fn create_teacher(State(stub): State<Stub>, Json(body): Json<Value>) -> Response {
    create(&stub, Kind::Teachers, body)
}

async fn update_teacher(State(stub): State<Stub>, Path(id): Path<String>, Json(body): Json<Value>) -> Response {
    update(&stub, Kind::Teachers, &id, body)
}

async fn delete_teacher(State(stub): State<Stub>, Path(id): Path<String>) -> Response {
    delete(&stub, Kind::Teachers, &id)
}

/// One student per non-empty CSV line after the `name,...` header.
async fn import_students(State(stub): State<Stub>, mut multipart: Multipart) -> Response {
    let mut count = 0_u64;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }
        let Ok(text) = field.text().await else {
            return bad_request("unreadable upload");
        };
        for line in text.lines().skip(1).filter(|l| !l.trim().is_empty()) {
            let name = line.split(',').next().unwrap_or_default().trim().to_owned();
            let id = stub.next_id("s");
            stub.with(|s| s.students.push(json!({ "_id": id, "name": name })));
            count += 1;
        }
    }
    if count == 0 {
        return bad_request("No file uploaded");
    }
    Json(json!({ "count": count })).into_response()
}
