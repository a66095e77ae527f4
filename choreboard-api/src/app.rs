//! Application state and router builder
//!
//! This module defines the shared application state and provides a
//! function to build the Axum router with all routes and middleware.
//!
//! # Example
//!
//! ```no_run
//! use choreboard_api::{app::{build_router, AppState}, config::Config};
//! use sqlx::PgPool;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let pool = PgPool::connect(&config.database.url).await?;
//! let state = AppState::new(pool, config);
//! let app = build_router(state);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; Arc
/// keeps the clone cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                    # Health check (public)
/// └── /v1/                       # API v1 (identity required)
///     ├── POST /auth/session     # Upsert caller from resolved identity
///     ├── GET  /users/me         # Current user
///     ├── /homes/
///     │   ├── POST /             # Create home
///     │   ├── GET  /:id          # Home with members
///     │   ├── POST /:id/join     # Join home
///     │   └── GET  /:id/ranking  # Members by points
///     └── /tasks/
///         ├── POST  /            # Create task
///         ├── GET   /            # Tasks of caller's home
///         ├── GET   /my          # Tasks assigned to caller
///         ├── PATCH /:id         # Partial update (creator only)
///         └── POST  /:id/complete # Complete (assignee only)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
/// 4. Identity resolution (v1 routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::middleware::identity;
    use crate::routes;

    // Health check (public, no identity)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new().route("/session", post(routes::auth::sync_session));

    let user_routes = Router::new().route("/me", get(routes::users::me));

    let home_routes = Router::new()
        .route("/", post(routes::homes::create_home))
        .route("/:id", get(routes::homes::get_home))
        .route("/:id/join", post(routes::homes::join_home))
        .route("/:id/ranking", get(routes::homes::get_ranking));

    let task_routes = Router::new()
        .route(
            "/",
            post(routes::tasks::create_task).get(routes::tasks::list_tasks),
        )
        .route("/my", get(routes::tasks::my_tasks))
        .route("/:id", patch(routes::tasks::update_task))
        .route("/:id/complete", post(routes::tasks::complete_task));

    // All v1 routes require a proxy-resolved identity
    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/homes", home_routes)
        .nest("/tasks", task_routes)
        .layer(axum::middleware::from_fn(identity::identity_layer));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
