#![allow(dead_code)]

use std::{
    fs,
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, StatusCode},
};
use datapresenter::config::Config;
use datapresenter::db::PresenterStorage;
use datapresenter::router::{PresenterState, presenter_router};
use serde_json::Value;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "correct horse battery";

/// A router over a throwaway SQLite file, removed on drop.
pub struct TestApp {
    pub app: Router,
    pub storage: PresenterStorage,
    path: PathBuf,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestApp {
    pub async fn new(seed: bool) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before UNIX_EPOCH")
            .as_nanos();

        let mut path = std::env::temp_dir();
        path.push(format!(
            "datapresenter-test-{}-{}.sqlite",
            std::process::id(),
            nanos
        ));

        let database_url = format!("sqlite:{}", path.display());
        let storage = datapresenter::db::open(&database_url, seed)
            .await
            .expect("failed to open test database");

        let mut cfg = Config::default();
        cfg.basic.database_url = database_url;
        cfg.jwt.key = "integration-test-signing-key-0123456789".to_string();
        cfg.auth.bcrypt_cost = 4;

        let state = PresenterState::new(storage.clone(), &cfg);
        Self {
            app: presenter_router(state),
            storage,
            path,
        }
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.send(builder.body(body).expect("failed to build request"))
            .await
    }

    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let resp = self.app.clone().oneshot(req).await.expect("request failed");
        let status = resp.status();
        let headers = resp.headers().clone();
        let bytes = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Register a fresh account and return its bearer token.
    pub async fn register(&self, username: &str) -> String {
        let resp = self
            .request(
                "POST",
                "/api/auth/register",
                None,
                Some(serde_json::json!({
                    "username": username,
                    "email": format!("{username}@example.com"),
                    "password": TEST_PASSWORD,
                })),
            )
            .await;
        assert_eq!(resp.status, StatusCode::OK, "register failed: {}", resp.body);
        resp.body["token"]
            .as_str()
            .expect("token missing from register response")
            .to_string()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

pub fn error_code(resp: &TestResponse) -> &str {
    resp.body["error"]["code"].as_str().unwrap_or_default()
}

pub fn error_message(resp: &TestResponse) -> &str {
    resp.body["error"]["message"].as_str().unwrap_or_default()
}
