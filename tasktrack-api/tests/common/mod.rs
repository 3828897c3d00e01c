//! Common test utilities for integration tests
//!
//! - Router construction over a per-test database
//! - JSON request helpers
//! - User registration shortcuts
//!
//! Tests receive their `PgPool` from `#[sqlx::test]`, which creates a fresh
//! database from DATABASE_URL and applies the migrations.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use sqlx::PgPool;
use tasktrack_api::app::{build_router, AppState};
use tasktrack_api::config::{ApiConfig, Config, DatabaseConfig, JwtConfig};
use tasktrack_shared::models::setting::Setting;
use tower::ServiceExt;

/// Secret seeded into the `jwt_secret` row
pub const SEEDED_SECRET: &str = "integration-test-seeded-secret";

/// Password used by [`TestApp::register`]
pub const PASSWORD: &str = "secret1";

/// Test context: a router over a freshly migrated and seeded database
pub struct TestApp {
    pub db: PgPool,
    pub app: axum::Router,
}

/// Decoded response
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// A registered user and their token
pub struct TestUser {
    pub id: i64,
    pub token: String,
    pub is_admin: bool,
}

pub fn test_config(fallback_secret: Option<&str>) -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            static_dir: None,
        },
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 5,
        },
        jwt: JwtConfig {
            fallback_secret: fallback_secret.map(str::to_string),
        },
    }
}

impl TestApp {
    /// Seeds default settings and builds the router
    pub async fn new(db: PgPool) -> Self {
        Setting::seed_defaults(&db, SEEDED_SECRET).await.unwrap();
        Self::without_seed(db, Some("integration-test-env-secret"))
    }

    /// Builds the router over an unseeded database
    pub fn without_seed(db: PgPool, fallback_secret: Option<&str>) -> Self {
        let state = AppState::new(db.clone(), test_config(fallback_secret));
        Self {
            db,
            app: build_router(state),
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
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.app.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, token: &str) -> TestResponse {
        self.request("GET", uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request("POST", uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> TestResponse {
        self.request("PUT", uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> TestResponse {
        self.request("DELETE", uri, Some(token), None).await
    }

    /// Registers `username` with email `<username>@example.com`
    pub async fn register(&self, username: &str) -> TestUser {
        let response = self
            .post(
                "/api/auth/register",
                None,
                json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": PASSWORD,
                }),
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::CREATED,
            "registration failed: {}",
            response.body
        );

        TestUser {
            id: response.body["user"]["id"].as_i64().unwrap(),
            token: response.body["token"].as_str().unwrap().to_string(),
            is_admin: response.body["user"]["isAdmin"].as_bool().unwrap(),
        }
    }

    pub async fn create_task(&self, token: &str, title: &str) -> i64 {
        let response = self
            .post("/api/tasks", Some(token), json!({ "title": title }))
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        response.body["id"].as_i64().unwrap()
    }
}
