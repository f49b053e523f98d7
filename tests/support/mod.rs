#![allow(dead_code)]

//! Shared helpers for the HTTP integration tests.
//!
//! Builds the full application in-process against an in-memory SQLite
//! database and the in-memory session cache, then drives the router directly
//! with `oneshot` so no socket is bound.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tower::ServiceExt;

use userhub::auth::hashing::hash_password;
use userhub::auth::jwt::TokenIssuer;
use userhub::auth::user::{NewUser, Role};
use userhub::config::{AppConfig, AuthConfig, DatabaseConfig};
use userhub::domain::UserId;
use userhub::startup::build_application;
use userhub::storage::{SqlxUserRepository, UserRepository};

pub const ADMIN_EMAIL: &str = "root@example.com";
pub const ADMIN_PASSWORD: &str = "RootPassw0rd!";

pub struct TestApp {
    pub router: Router,
    pub repository: Arc<SqlxUserRepository>,
    pub issuer: TokenIssuer,
}

pub fn test_config() -> AppConfig {
    AppConfig {
        database: DatabaseConfig { url: "sqlite://:memory:".to_string(), ..Default::default() },
        auth: AuthConfig {
            access_secret: "integration-access-secret-0123456789".to_string(),
            refresh_secret: "integration-refresh-secret-0123456789".to_string(),
            access_ttl_seconds: 900,
            refresh_ttl_seconds: 3600,
        },
        ..Default::default()
    }
}

pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(test_config()).await
}

pub async fn setup_test_app_with(config: AppConfig) -> TestApp {
    let issuer = TokenIssuer::new(&config.auth);
    let application = build_application(&config).await.expect("build application");

    TestApp {
        router: application.router,
        repository: Arc::new(SqlxUserRepository::new(application.pool.clone())),
        issuer,
    }
}

pub async fn send_request(
    app: &TestApp,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {}", token));
    }

    let request = if let Some(json) = body {
        let bytes = serde_json::to_vec(&json).expect("serialize body");
        builder
            .header("content-type", "application/json")
            .body(Body::from(bytes))
            .expect("build request")
    } else {
        builder.body(Body::empty()).expect("build request")
    };

    app.router.clone().oneshot(request).await.expect("request")
}

pub async fn read_json<T: DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("read body");
    serde_json::from_slice(&bytes).expect("parse json")
}

/// Register an account through the API and return the response body
/// (`user` + `tokens`).
pub async fn register(app: &TestApp, email: &str, password: &str, name: &str) -> Value {
    let response = send_request(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "email": email, "password": password, "name": name })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED, "register {}", email);
    read_json(response).await
}

pub async fn login(app: &TestApp, email: &str, password: &str) -> Response<Body> {
    send_request(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": password })),
    )
    .await
}

pub fn access_token(body: &Value) -> String {
    body["tokens"]["accessToken"].as_str().expect("accessToken").to_string()
}

pub fn refresh_token(body: &Value) -> String {
    body["tokens"]["refreshToken"].as_str().expect("refreshToken").to_string()
}

pub fn user_id(body: &Value) -> String {
    body["user"]["id"].as_str().expect("user id").to_string()
}

/// Seed an admin account directly in storage (registration only ever creates
/// regular users) and log it in through the API.
pub async fn seed_admin(app: &TestApp) -> String {
    let password_hash = hash_password(ADMIN_PASSWORD).expect("hash admin password");
    app.repository
        .create_user(NewUser {
            id: UserId::new(),
            email: ADMIN_EMAIL.to_string(),
            name: "Root".to_string(),
            password_hash,
            role: Role::Admin,
        })
        .await
        .expect("seed admin");

    let response = login(app, ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK, "admin login");
    let body: Value = read_json(response).await;
    access_token(&body)
}
