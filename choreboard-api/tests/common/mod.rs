//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - Test database setup (migrated on connect)
//! - In-process app router
//! - Identity header helpers (the tests play the role of the auth proxy)
//! - Request/response helpers
//!
//! The suite requires a running PostgreSQL database and is skipped when
//! DATABASE_URL is not set.

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use choreboard_api::app::{build_router, AppState};
use choreboard_api::config::{ApiConfig, Config, DatabaseConfig};
use choreboard_api::middleware::identity::USER_ID_HEADER;
use choreboard_shared::db::migrations::run_migrations;
use sqlx::PgPool;
use tower::Service as _;
use uuid::Uuid;

/// Test context holding the database pool and the app under test
pub struct TestContext {
    pub db: PgPool,
    pub app: Router,
}

impl TestContext {
    /// Creates a new test context, or None when DATABASE_URL is not set
    pub async fn new() -> anyhow::Result<Option<Self>> {
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping integration test");
            return Ok(None);
        };

        let db = PgPool::connect(&url).await?;
        run_migrations(&db).await?;

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url,
                max_connections: 5,
            },
        };

        let state = AppState::new(db.clone(), config);
        let app = build_router(state);

        Ok(Some(TestContext { db, app }))
    }

    /// Sends a request through the router and returns the response
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().call(request).await.unwrap()
    }
}

/// Generates a unique user id for a test
pub fn unique_user_id(name: &str) -> String {
    format!("test|{}-{}", name, Uuid::new_v4())
}

/// Builds a request carrying the identity headers the auth proxy would set
pub fn authed_request(
    method: &str,
    uri: &str,
    user_id: &str,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(USER_ID_HEADER, user_id)
        .header("x-auth-first-name", "Test")
        .header(header::CONTENT_TYPE, "application/json");

    match body {
        Some(json) => builder.body(Body::from(json.to_string())).unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Reads a response body as JSON
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Registers a user via session sync and returns their record
pub async fn sync_user(ctx: &TestContext, user_id: &str) -> serde_json::Value {
    let response = ctx
        .send(authed_request("POST", "/v1/auth/session", user_id, None))
        .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    body_json(response).await
}

/// Creates a home for `user_id` and returns the created home
pub async fn create_home(ctx: &TestContext, user_id: &str, name: &str) -> serde_json::Value {
    let response = ctx
        .send(authed_request(
            "POST",
            "/v1/homes",
            user_id,
            Some(serde_json::json!({ "name": name })),
        ))
        .await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    body_json(response).await["home"].clone()
}
