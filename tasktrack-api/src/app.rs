/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use tasktrack_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = tasktrack_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    config::Config,
    middleware::auth::{admin_layer, jwt_auth_layer},
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tasktrack_shared::auth::jwt::TokenService;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Token issuer/verifier reading the live secret from `db`
    pub tokens: TokenService,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        let tokens = TokenService::new(Arc::new(db.clone()), config.jwt.fallback_secret.clone());

        Self {
            db,
            config: Arc::new(config),
            tokens,
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET /health, GET /api/health      # public
/// ├── /api/auth/                        # public
/// │   ├── POST /register
/// │   └── POST /login
/// ├── /api/tasks/                       # bearer token
/// │   ├── GET    /        POST /
/// │   └── GET    /:id     PUT /:id     DELETE /:id
/// └── /api/settings/                    # bearer token
///     ├── GET    /        POST /        (POST: admin)
///     └── GET    /:key    POST|PUT|DELETE /:key (admin)
/// ```
///
/// When `STATIC_DIR` is configured, any other path is served from that
/// directory with `index.html` as the fallback.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    // Reads are open to any authenticated user; writes additionally need admin
    let admin_only = || axum::middleware::from_fn_with_state(state.clone(), admin_layer);
    let settings_routes = Router::new()
        .route(
            "/",
            get(routes::settings::list_settings)
                .merge(post(routes::settings::create_setting).route_layer(admin_only())),
        )
        .route(
            "/:key",
            get(routes::settings::get_setting).merge(
                post(routes::settings::create_setting_at_key)
                    .put(routes::settings::update_setting)
                    .delete(routes::settings::delete_setting)
                    .route_layer(admin_only()),
            ),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/tasks", task_routes)
        .nest("/settings", settings_routes);

    let cors = if state.config.api.allows_any_origin() {
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
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    let mut router = Router::new()
        .merge(health_routes)
        .nest("/api", api_routes);

    if let Some(dir) = state.config.api.static_dir.as_ref() {
        tracing::info!(static_dir = %dir.display(), "Serving frontend bundle");
        router = router.fallback_service(
            ServeDir::new(dir).not_found_service(ServeFile::new(dir.join("index.html"))),
        );
    }

    router
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
