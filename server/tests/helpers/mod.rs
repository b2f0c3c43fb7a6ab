//! Reusable test helpers for HTTP integration tests.
//!
//! Provides `TestApp` for building and sending requests through the full axum router
//! over an in-memory store, plus utilities for seeding rows and JWT generation.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{self, Method, Request, Response};
use axum::Router;
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use studyhub_server::api::{create_router, AppState};
use studyhub_server::auth::jwt;
use studyhub_server::config::Config;
use studyhub_server::permissions::Role;
use studyhub_server::store::{encode_row, MemoryStore, Table, TableStore};
use tower::ServiceExt;
use uuid::Uuid;

/// Full application router backed by a fresh [`MemoryStore`].
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
    pub config: Arc<Config>,
}

impl TestApp {
    /// Create a new test app with an empty store.
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let config = Config::default_for_test();
        let state = AppState::new(store.clone(), config.clone());

        Self {
            router: create_router(state),
            store,
            config: Arc::new(config),
        }
    }

    /// Build an HTTP request with the given method and URI.
    pub fn request(method: Method, uri: &str) -> http::request::Builder {
        Request::builder().method(method).uri(uri)
    }

    /// Send a request through the router via `tower::ServiceExt::oneshot`.
    pub async fn oneshot(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot request failed")
    }

    /// Send a JSON request as `token`'s owner.
    pub async fn send_json(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Response<Body> {
        let mut builder = Self::request(method, uri);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.oneshot(req).await
    }
}

/// Generate a valid access token for a user.
pub fn generate_access_token(config: &Config, user_id: Uuid) -> String {
    jwt::generate_access_token(user_id, None, &config.jwt_secret, 900)
        .expect("Failed to generate access token")
}

/// Insert an account row and return its id.
pub async fn create_account(store: &MemoryStore, name: &str, created_at: DateTime<Utc>) -> Uuid {
    let id = Uuid::new_v4();
    let row = encode_row(&json!({
        "id": id,
        "name": name,
        "email": format!("{}@uni.edu", name.to_lowercase()),
        "institution": "State University",
        "phone": null,
        "created_at": created_at,
    }))
    .unwrap();
    store.insert(Table::Accounts, row).await.expect("Failed to insert account");
    id
}

/// Insert a role row for `user_id`.
pub async fn grant_role(store: &MemoryStore, user_id: Uuid, role: Role) {
    let row = encode_row(&json!({ "user_id": user_id, "role": role })).unwrap();
    store.insert(Table::UserRoles, row).await.expect("Failed to insert role");
}

/// Create an account holding `role` and return it with a token.
pub async fn create_user_with_role(app: &TestApp, name: &str, role: Role) -> (Uuid, String) {
    let id = create_account(&app.store, name, Utc::now()).await;
    grant_role(&app.store, id, role).await;
    let token = generate_access_token(&app.config, id);
    (id, token)
}

/// Insert a pending complaint and return its id.
pub async fn create_pending_complaint(store: &MemoryStore, subject: &str, created_at: DateTime<Utc>) -> Uuid {
    let id = Uuid::new_v4();
    let row = encode_row(&json!({
        "id": id,
        "email": "student@uni.edu",
        "phone": "555-0100",
        "subject": subject,
        "message": "Something is wrong",
        "status": "pending",
        "created_at": created_at,
        "admin_reply": null,
        "replied_at": null,
        "replied_by": null,
    }))
    .unwrap();
    store.insert(Table::Complaints, row).await.expect("Failed to insert complaint");
    id
}

/// Parse a response body as JSON.
pub async fn body_to_json(response: Response<Body>) -> Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to collect response body")
        .to_bytes();
    serde_json::from_slice(&bytes).unwrap_or_else(|e| {
        let preview = String::from_utf8_lossy(&bytes);
        panic!("Failed to parse response as JSON: {e}\nBody: {preview}")
    })
}
