//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - An app wired to the in-memory repository and blob store
//! - User registration and token helpers
//! - JSON and multipart request helpers

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use pawlog_api::app::{build_router, AppState};
use pawlog_api::config::Config;
use pawlog_shared::blob::MemoryBlobStore;
use pawlog_shared::store::{memory::MemoryRepository, Repositories};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

pub const BOUNDARY: &str = "pawlog-test-boundary";

/// Test context containing all necessary resources
pub struct TestContext {
    pub app: axum::Router,
    pub state: AppState,
    pub blobs: Arc<MemoryBlobStore>,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_vars(&[]).await
    }

    /// Builds the app with extra environment-style overrides
    pub async fn with_vars(extra: &[(&str, &str)]) -> Self {
        let mut vars: Vec<(String, String)> = [
            ("DATABASE_URL", "postgresql://unused/test"),
            ("JWT_SECRET", "test-secret-key-at-least-32-bytes-long"),
            ("BLOB_STORE_ENDPOINT", "https://blobs.example.com"),
            ("BLOB_STORE_BUCKET", "media"),
            ("PASSWORD_HASH_MEMORY_KIB", "1024"),
            ("PASSWORD_HASH_ITERATIONS", "1"),
            ("PASSWORD_HASH_PARALLELISM", "1"),
        ]
        .iter()
        .chain(extra.iter())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        vars.reverse(); // later entries win

        let config = Config::from_lookup(|key| {
            vars.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        })
        .expect("Failed to build test config");

        let repos = Repositories::from_backend(Arc::new(MemoryRepository::new()));
        let blobs = Arc::new(MemoryBlobStore::new());

        let state = AppState::new(config, repos, blobs.clone())
            .await
            .expect("Failed to build app state");

        Self {
            app: build_router(state.clone()),
            state,
            blobs,
        }
    }

    /// Sends a request and returns the status with the parsed JSON body
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if body.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&body).into_owned())
            })
        };

        (status, json)
    }

    pub async fn post_json(&self, uri: &str, token: Option<&str>, body: Value) -> (StatusCode, Value) {
        self.send(json_request(Method::POST, uri, token, Some(body))).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(json_request(Method::GET, uri, token, None)).await
    }

    /// Registers a user and returns its id
    pub async fn register(&self, email: &str) -> String {
        let (status, body) = self
            .post_json(
                "/api/user",
                None,
                json!({
                    "firstName": "Test",
                    "lastName": "User",
                    "email": email,
                    "password": "password123"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "register failed: {}", body);

        body["id"].as_str().expect("id should be a string").to_string()
    }

    /// Obtains a bearer token through the verify endpoint
    pub async fn token_for(&self, email: &str) -> String {
        let (status, body) = self
            .post_json(
                "/api/user/verify",
                None,
                json!({ "email": email, "password": "password123" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "verify failed: {}", body);

        body["token"].as_str().expect("token should be a string").to_string()
    }

    /// Registers a user and returns `(id, token)`
    pub async fn signed_in(&self, email: &str) -> (String, String) {
        let id = self.register(email).await;
        let token = self.token_for(email).await;
        (id, token)
    }

    pub async fn create_animal(&self, token: &str, name: &str) -> String {
        let (status, body) = self
            .post_json(
                "/api/animal",
                Some(token),
                json!({ "name": name, "hoursTrained": 0 }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create animal failed: {}", body);

        body["id"].as_str().unwrap().to_string()
    }
}

pub fn json_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Builds a multipart upload with `type`, `id` and `file` parts
pub fn upload_request(
    kind: &str,
    id: &str,
    file_name: &str,
    bytes: &[u8],
    token: Option<&str>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in [("type", kind), ("id", id)] {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: image/png\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/file/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        );

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    builder.body(Body::from(body)).unwrap()
}
