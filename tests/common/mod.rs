#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64::prelude::*;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tower::ServiceExt;

use userbase::{
    build_app,
    config::{AppConfig, JwtConfig},
    users::dto::UserResponse,
    AppState,
};

pub const PASSWORD: &str = "correct-horse-battery";

pub fn test_config() -> AppConfig {
    AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        database_url: None,
        max_connections: 1,
        jwt: JwtConfig {
            secret: "integration-secret".into(),
            issuer: "userbase-tests".into(),
            audience: "userbase-tests".into(),
            ttl_minutes: 5,
        },
        default_role: "prodigy".into(),
        privileged_roles: vec!["mentor".into()],
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl TestResponse {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    pub fn json<T: DeserializeOwned>(&self) -> T {
        serde_json::from_slice(&self.body)
            .unwrap_or_else(|e| panic!("invalid json body {:?}: {e}", self.text()))
    }
}

/// A router over a fresh in-memory store, torn down with [`TestApp::close`].
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let state = AppState::in_memory(test_config());
        Self {
            router: build_app(state.clone()),
            state,
        }
    }

    pub async fn close(self) {
        self.state.shutdown().await;
    }

    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let res = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("router is infallible");
        let status = res.status();
        let body = to_bytes(res.into_body(), usize::MAX)
            .await
            .expect("read body")
            .to_vec();
        TestResponse { status, body }
    }

    pub async fn call(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut req = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => req
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => req.body(Body::empty()),
        };
        self.send(req.expect("valid request")).await
    }

    /// Sends `body` verbatim, with `content_type` if one is given.
    pub async fn call_raw(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        content_type: Option<&str>,
        body: &str,
    ) -> TestResponse {
        let mut req = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(content_type) = content_type {
            req = req.header(header::CONTENT_TYPE, content_type);
        }
        let req = req.body(Body::from(body.to_owned())).expect("valid request");
        self.send(req).await
    }

    pub async fn post_signup(&self, body: Value) -> TestResponse {
        self.call(Method::POST, "/signup", None, Some(body)).await
    }

    /// Signs up `username` with [`PASSWORD`] and returns the created user.
    pub async fn signup(&self, username: &str, role: &str) -> UserResponse {
        let res = self
            .post_signup(json!({
                "name": format!("{username} tester"),
                "username": username,
                "email": format!("{username}@example.com"),
                "password": PASSWORD,
                "role": role,
            }))
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "signup failed: {}", res.text());
        res.json()
    }

    pub async fn login(&self, username: &str, password: &str) -> TestResponse {
        let req = Request::builder()
            .method(Method::POST)
            .uri("/login")
            .header(header::AUTHORIZATION, basic_header(username, password))
            .body(Body::empty())
            .expect("valid request");
        self.send(req).await
    }
}

pub fn basic_header(username: &str, password: &str) -> String {
    format!(
        "Basic {}",
        BASE64_STANDARD.encode(format!("{username}:{password}"))
    )
}

pub fn route_not_found_body() -> Value {
    json!({ "message": "Route not found" })
}
