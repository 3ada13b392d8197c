//! Shared helpers: token minting and an in-process mock backend

#![allow(dead_code)]

use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use marine_axis::auth::MemoryStore;
use marine_axis::{App, Config};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Login with this address gets no refresh token back
pub const NO_REFRESH_EMAIL: &str = "kiosk@marine-axis.test";

static TOKEN_SEQ: AtomicUsize = AtomicUsize::new(0);

/// Mint a token the way the backend does; `expires_in` may be negative
pub fn token_for(role: &str, expires_in: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = json!({
        "id": "user-1",
        "email": "ops@marine-axis.test",
        "role": role,
        "iat": now,
        "exp": now + expires_in,
        "jti": TOKEN_SEQ.fetch_add(1, Ordering::SeqCst),
    });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"backend-secret"),
    )
    .expect("Failed to create token")
}

pub struct MockState {
    pub accepted_token: Mutex<String>,
    pub refresh_ok: AtomicBool,
    pub refresh_calls: AtomicUsize,
    pub provider_calls: AtomicUsize,
    pub seen_tokens: Mutex<Vec<String>>,
}

impl MockState {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            accepted_token: Mutex::new(token_for("admin", 3600)),
            refresh_ok: AtomicBool::new(true),
            refresh_calls: AtomicUsize::new(0),
            provider_calls: AtomicUsize::new(0),
            seen_tokens: Mutex::new(Vec::new()),
        })
    }

    pub fn accepted(&self) -> String {
        self.accepted_token.lock().unwrap().clone()
    }

    pub fn refreshes(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn authorized(&self, headers: &HeaderMap) -> bool {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string);
        if let Some(t) = &token {
            self.seen_tokens.lock().unwrap().push(t.clone());
        }
        token.as_deref() == Some(self.accepted().as_str())
    }
}

type Reply = (StatusCode, Json<Value>);

fn unauthorized(message: &str) -> Reply {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "success": false, "message": message })),
    )
}

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Reply {
    if body["password"] != "correct-horse" {
        return unauthorized("Invalid credentials");
    }
    let mut data = json!({
        "accessToken": state.accepted(),
        "refreshToken": "refresh-1",
        "user": { "id": "user-1", "name": "Ops Admin", "email": body["email"], "role": "admin" }
    });
    // Some deployments issue access tokens only
    if body["email"] == NO_REFRESH_EMAIL {
        data.as_object_mut().unwrap().remove("refreshToken");
    }
    (
        StatusCode::OK,
        Json(json!({ "success": true, "data": data })),
    )
}

async fn refresh(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Reply {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);
    if !state.refresh_ok.load(Ordering::SeqCst) || body["refreshToken"].as_str().is_none() {
        return unauthorized("Refresh token expired");
    }
    let fresh = token_for("admin", 3600);
    *state.accepted_token.lock().unwrap() = fresh.clone();
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": { "accessToken": fresh, "refreshToken": "refresh-2" }
        })),
    )
}

async fn logout() -> Reply {
    (StatusCode::OK, Json(json!({ "success": true })))
}

async fn providers(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Reply {
    state.provider_calls.fetch_add(1, Ordering::SeqCst);
    if !state.authorized(&headers) {
        return unauthorized("Token expired");
    }
    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": {
                "data": [
                    { "id": "p1", "name": "Harbour Tugs", "status": "active" },
                    { "id": "p2", "name": "Deep Blue Divers", "status": "pending" }
                ],
                "page": 1, "limit": 10, "total": 2
            }
        })),
    )
}

async fn always_unauthorized() -> Reply {
    unauthorized("Token revoked")
}

async fn jobs(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Reply {
    if !state.authorized(&headers) {
        return unauthorized("Token expired");
    }
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "message": "Database unavailable" })),
    )
}

async fn stats(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Reply {
    if !state.authorized(&headers) {
        return unauthorized("Token expired");
    }
    (
        StatusCode::OK,
        Json(json!({ "success": true, "data": { "providers": 12, "jobs": 40 } })),
    )
}

/// Start the mock backend on an ephemeral port and return its base URL
pub async fn spawn_backend(state: Arc<MockState>) -> String {
    let app = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/refresh", post(refresh))
        .route("/auth/logout", post(logout))
        .route("/providers", get(providers))
        .route("/always-unauthorized", get(always_unauthorized))
        .route("/jobs", get(jobs))
        .route("/dashboard/stats", get(stats))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock backend");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// App pointed at `base_url` with an in-memory session store
pub async fn app_for(base_url: &str) -> App {
    let mut config = Config::default();
    config.api.base_url = base_url.to_string();
    config.api.timeout_secs = 5;
    App::with_store(config, Arc::new(MemoryStore::new()))
        .await
        .expect("Failed to build app")
}
