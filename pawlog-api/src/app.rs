/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use pawlog_api::{app::{build_router, AppState}, config::Config};
/// use pawlog_shared::blob::MemoryBlobStore;
/// use pawlog_shared::store::{memory::MemoryRepository, Repositories};
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let repos = Repositories::from_backend(Arc::new(MemoryRepository::new()));
/// let state = AppState::new(config, repos, Arc::new(MemoryBlobStore::new())).await?;
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError};
use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use chrono::Duration as TokenDuration;
use pawlog_shared::{
    auth::{jwt::TokenService, middleware::authorize, session::SessionService},
    blob::{BlobStore, BlobUploadCoordinator},
    error::ServiceResult,
    linker::ResourceLinker,
    pagination::Paginator,
    store::Repositories,
};
use std::{sync::Arc, time::Duration};
use tower_http::{
    cors::CorsLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Every service is built once here and holds its repositories by `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<Config>,

    pub repos: Repositories,

    pub tokens: Arc<TokenService>,

    pub sessions: SessionService,

    pub linker: ResourceLinker,

    pub paginator: Paginator,

    pub uploads: BlobUploadCoordinator,
}

impl AppState {
    /// Creates new application state
    pub async fn new(
        config: Config,
        repos: Repositories,
        blobs: Arc<dyn BlobStore>,
    ) -> ServiceResult<Self> {
        let tokens = Arc::new(TokenService::with_ttl(
            &config.jwt.secret,
            TokenDuration::seconds(config.jwt.ttl_seconds),
        ));
        let sessions =
            SessionService::new(repos.users.clone(), tokens.clone(), config.password).await?;

        Ok(Self {
            linker: ResourceLinker::new(repos.clone(), config.password),
            paginator: Paginator::new(repos.clone()),
            uploads: BlobUploadCoordinator::new(repos.clone(), blobs),
            sessions,
            tokens,
            repos,
            config: Arc::new(config),
        })
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// GET /                         # Banner (public)
/// /api
/// ├── GET  /health              # Health check (public)
/// ├── POST /user                # Register (public)
/// ├── POST /user/login          # Credential check (public)
/// ├── POST /user/verify         # Credential check + token (public)
/// ├── POST /animal              # Create animal (bearer token)
/// ├── POST /training            # Create training log (bearer token)
/// ├── GET  /admin/:kind         # users | animals | training listings (bearer token)
/// └── POST /file/upload         # Upload and attach (bearer token if UPLOAD_REQUIRE_AUTH)
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Request timeout (tower-http TimeoutLayer)
/// 4. Authorization gate (per-route basis)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/user", post(routes::users::create_user))
        .route("/user/login", post(routes::users::login))
        .route("/user/verify", post(routes::users::verify));

    let protected_routes = Router::new()
        .route("/animal", post(routes::animals::create_animal))
        .route("/training", post(routes::training::create_training_log))
        .route("/admin/:kind", get(routes::admin::list))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_identity,
        ));

    let mut upload_routes = Router::new()
        .route("/file/upload", post(routes::files::upload))
        .layer(DefaultBodyLimit::max(state.config.api.upload_max_bytes));

    if state.config.api.upload_require_auth {
        upload_routes = upload_routes.layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_identity,
        ));
    }

    let api_routes = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(upload_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.is_empty() {
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
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(Duration::from_secs(3600))
    };

    Router::new()
        .route("/", get(routes::health::banner))
        .nest("/api", api_routes)
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.api.request_timeout_seconds,
        )))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Authorization gate layer
///
/// Verifies the `Authorization: Bearer` token and injects the caller's
/// `Identity` into request extensions for `Extension<Identity>` extractors.
async fn require_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let identity = authorize(header_value, &state.tokens)?;
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}
