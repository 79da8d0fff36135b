//! In-process stand-in for the portal API.
//!
//! Serves the same routes as the real backend on an ephemeral port and
//! records every request so tests can assert on what the client sent.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::{
    Router,
    body::Bytes,
    extract::{Form, Multipart, Query, Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::{Next, from_fn_with_state},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use sonic_rs::{JsonValueTrait, json};

use geoportal::{
    config::Config,
    models::file::UploadFile,
    repositories::session::{MemoryStorage, SessionStore},
    state::AppState,
};

/// A request as seen by the fake backend.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
}

impl Recorded {
    pub fn route(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

#[derive(Default)]
pub struct BackendState {
    pub users: Mutex<HashMap<String, String>>,
    pub requests: Mutex<Vec<Recorded>>,
    pub search_bodies: Mutex<Vec<String>>,
    pub reject_logins: AtomicBool,
    pub fail_uploads: AtomicBool,
    pub analysis_count: AtomicU32,
}

pub struct FakeBackend {
    pub url: String,
    pub state: Arc<BackendState>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let state = Arc::new(BackendState::default());

        let app = Router::new()
            .route("/auth/register", post(register))
            .route("/auth/token", post(token))
            .route("/users/me", get(me))
            .route("/upload/", post(upload))
            .route("/search/", post(search))
            .route("/search/by-coordinates", post(search_by_coordinates))
            .route("/search/history", get(history))
            .layer(from_fn_with_state(state.clone(), record))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            state,
        }
    }

    /// A client state talking to this backend with an in-memory session.
    pub fn client(&self) -> AppState {
        let config = Config::default().with_api_url(&self.url).unwrap();
        AppState::with_session_store(&config, SessionStore::in_memory()).unwrap()
    }

    /// Like [`FakeBackend::client`], also handing out the raw storage so a
    /// test can tamper with persisted entries.
    pub fn client_with_storage(&self) -> (AppState, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let config = Config::default().with_api_url(&self.url).unwrap();
        let state =
            AppState::with_session_store(&config, SessionStore::new(storage.clone())).unwrap();
        (state, storage)
    }

    pub fn add_user(&self, username: &str, password: &str) {
        self.state
            .users
            .lock()
            .unwrap()
            .insert(username.to_string(), password.to_string());
    }

    pub fn has_user(&self, username: &str) -> bool {
        self.state.users.lock().unwrap().contains_key(username)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn routes(&self) -> Vec<String> {
        self.requests().iter().map(Recorded::route).collect()
    }

    pub fn last_search_body(&self) -> Option<String> {
        self.state.search_bodies.lock().unwrap().last().cloned()
    }
}

/// A URL nothing listens on.
pub async fn unreachable_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub fn png(name: &str) -> UploadFile {
    UploadFile::new(
        name,
        "image/png",
        vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0],
    )
}

fn json_response<T: serde::Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        sonic_rs::to_string(&body).unwrap(),
    )
        .into_response()
}

fn header_value(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn record(State(state): State<Arc<BackendState>>, req: Request, next: Next) -> Response {
    let recorded = Recorded {
        method: req.method().to_string(),
        path: req.uri().path().to_string(),
        query: req.uri().query().map(str::to_string),
        authorization: header_value(req.headers(), header::AUTHORIZATION),
        content_type: header_value(req.headers(), header::CONTENT_TYPE),
    };
    state.requests.lock().unwrap().push(recorded);
    next.run(req).await
}

fn token_for(username: &str) -> String {
    format!("token-{}", username)
}

fn bearer_user(state: &BackendState, headers: &HeaderMap) -> Option<String> {
    let token = header_value(headers, header::AUTHORIZATION)?;
    let username = token.strip_prefix("Bearer token-")?;
    state
        .users
        .lock()
        .unwrap()
        .contains_key(username)
        .then(|| username.to_string())
}

fn unauthorized() -> Response {
    json_response(StatusCode::UNAUTHORIZED, json!({"detail": "Invalid token"}))
}

async fn register(State(state): State<Arc<BackendState>>, body: Bytes) -> Response {
    let payload: sonic_rs::Value = sonic_rs::from_slice(&body).unwrap();
    let username = payload.get("username").and_then(|v| v.as_str()).unwrap().to_string();
    let password = payload.get("password").and_then(|v| v.as_str()).unwrap().to_string();

    let mut users = state.users.lock().unwrap();
    if users.contains_key(&username) {
        return json_response(
            StatusCode::BAD_REQUEST,
            json!({"detail": "Username already registered"}),
        );
    }
    users.insert(username.clone(), password);

    json_response(
        StatusCode::OK,
        json!({"access_token": token_for(&username), "token_type": "bearer"}),
    )
}

async fn token(
    State(state): State<Arc<BackendState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let username = form.get("username").cloned().unwrap_or_default();
    let password = form.get("password").cloned().unwrap_or_default();
    let grant_ok = form.get("grant_type").map(String::as_str) == Some("password");

    let known = state.users.lock().unwrap().get(&username) == Some(&password);
    if state.reject_logins.load(Ordering::SeqCst) || !known || !grant_ok {
        return json_response(
            StatusCode::UNAUTHORIZED,
            json!({"detail": "Incorrect username or password"}),
        );
    }

    json_response(
        StatusCode::OK,
        json!({"access_token": token_for(&username), "token_type": "bearer"}),
    )
}

async fn me(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    let Some(username) = bearer_user(&state, &headers) else {
        return unauthorized();
    };

    json_response(
        StatusCode::OK,
        json!({
            "id": 1,
            "username": username,
            "created_at": "2024-05-01T10:00:00.000"
        }),
    )
}

async fn upload(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if bearer_user(&state, &headers).is_none() {
        return unauthorized();
    }
    if state.fail_uploads.load(Ordering::SeqCst) {
        return json_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"detail": "Error processing file: storage unavailable"}),
        );
    }

    let mut single = false;
    let mut stored = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let _ = field.bytes().await.unwrap();
        match name.as_str() {
            "file" => single = true,
            "files" => stored.push(file_name),
            _ => {}
        }
    }

    if single {
        let count = state.analysis_count.fetch_add(1, Ordering::SeqCst) + 1;
        return json_response(
            StatusCode::OK,
            json!({"objects_count": 3, "analysis_count": count}),
        );
    }

    let items: Vec<sonic_rs::Value> = stored
        .iter()
        .enumerate()
        .map(|(i, name)| json!({"id": i + 1, "filename": name, "status": "completed"}))
        .collect();
    json_response(StatusCode::OK, items)
}

async fn search(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if bearer_user(&state, &headers).is_none() {
        return unauthorized();
    }
    let raw = String::from_utf8(body.to_vec()).unwrap();
    state.search_bodies.lock().unwrap().push(raw.clone());
    let payload: sonic_rs::Value = sonic_rs::from_str(&raw).unwrap();

    if payload.get("uploaded_files").is_some() {
        return json_response(
            StatusCode::OK,
            json!({"results": [{
                "filename": "similar.jpg",
                "download_url": "http://storage.local/similar.jpg",
                "latitude": 55.7558,
                "longitude": 37.6173,
                "address": "Red Square, Moscow",
                "created_at": "2023-08-14T09:30:00Z"
            }]}),
        );
    }

    json_response(
        StatusCode::OK,
        json!([{
            "filename": "kremlin.jpg",
            "address": "Kremlin, Moscow",
            "distance_km": 0.4
        }]),
    )
}

async fn search_by_coordinates(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    if bearer_user(&state, &headers).is_none() {
        return unauthorized();
    }
    for key in ["latitude", "longitude", "radius_km"] {
        if !params.contains_key(key) {
            return json_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({"detail": [{"loc": ["query", key], "msg": "field required"}]}),
            );
        }
    }

    json_response(
        StatusCode::OK,
        json!([
            {
                "filename": "a.jpg",
                "latitude": 55.75,
                "longitude": 37.61,
                "created_at": "2024-01-02T03:04:05.123456",
                "distance_km": 0.2
            },
            {
                "filename": "b.jpg",
                "latitude": 55.76,
                "longitude": 37.62,
                "distance_km": 0.9
            }
        ]),
    )
}

async fn history(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    if bearer_user(&state, &headers).is_none() {
        return unauthorized();
    }

    json_response(
        StatusCode::OK,
        json!([{
            "id": 7,
            "query_type": "coords",
            "params": {"latitude": 55.75, "longitude": 37.61, "radius_km": 1.0},
            "results_count": 2,
            "created_at": "2024-02-03T04:05:06"
        }]),
    )
}
