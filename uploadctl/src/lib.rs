//! # uploadctl: Upload authorization for workspaces, typebots and users
//!
//! `uploadctl` hands out presigned upload URLs for an S3-compatible bucket. Before signing, it
//! works out where the file belongs and whether the caller may write there.
//!
//! ## Overview
//!
//! Clients never receive storage credentials. To upload a file they ask this service for a
//! presigned `PUT` URL, describing the destination with one of four shapes:
//!
//! - a **block** of a typebot (`workspaceId`, `typebotId`, `blockId`, optional `itemId`)
//! - a **typebot** (`workspaceId`, `typebotId`, `fileName`)
//! - the caller's own **user** space (`userId`, `fileName`)
//! - a **workspace** (`workspaceId`, `fileName`)
//!
//! The shape decides both the storage key (always under `public/`) and the permission check.
//! Workspace uploads need a non-guest membership. Typebot and block uploads need a `WRITE` or
//! `FULL_ACCESS` collaboration, or write access to the owning workspace. Denied access is reported
//! as "not found" so the API does not reveal which workspaces and typebots exist.
//!
//! ## Architecture
//!
//! The HTTP layer is [Axum](https://github.com/tokio-rs/axum). Lookups go through the
//! [`db::AccessStore`] trait, backed by PostgreSQL in production. Signing goes through
//! [`storage::UploadUrlSigner`], backed by `aws-sdk-s3`. The operation itself,
//! [`uploads::generate_upload_url`], depends only on those two traits.
//!
//! - **API layer** ([`api`]): `POST /api/v1/uploads/presigned-url`
//! - **Authentication** ([`auth`]): bearer API tokens and session JWT cookies, plus the write
//!   permission predicates
//! - **Database layer** ([`db`]): repositories over workspaces, typebots and API tokens
//! - **Storage** ([`storage`]): presigned URL generation
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use uploadctl::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = uploadctl::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     uploadctl::telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         let _ = tokio::signal::ctrl_c().await;
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! The application requires a PostgreSQL database and runs migrations on startup. See
//! [`migrator`].

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod storage;
pub mod telemetry;
pub mod types;
pub mod uploads;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use crate::config::CorsOrigin;
use crate::db::{AccessStore, PgAccessStore};
use crate::openapi::ApiDoc;
use crate::storage::{S3UploadSigner, UploadUrlSigner};
use axum::http::HeaderValue;
use axum::{
    Json, Router, http,
    routing::{get, post},
};
use axum_prometheus::PrometheusMetricLayer;
use bon::Builder;
pub use config::Config;
use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument, warn};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{TypebotId, UserId, WorkspaceId};

/// Application state shared across all request handlers.
///
/// - `config`: Application configuration loaded from environment/files
/// - `store`: Workspace, typebot and API token lookups
/// - `signer`: Presigned URL generator, absent when storage credentials are not configured
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .store(Arc::new(PgAccessStore::new(pool)))
///     .maybe_signer(signer)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn AccessStore>,
    pub signer: Option<Arc<dyn UploadUrlSigner>>,
}

/// Get the uploadctl database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Connect to PostgreSQL with the configured pool settings and run migrations.
#[instrument(skip_all)]
async fn setup_database(config: &Config) -> anyhow::Result<PgPool> {
    let settings = &config.database.pool;
    let optional_secs = |secs: u64| (secs > 0).then(|| Duration::from_secs(secs));

    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .idle_timeout(optional_secs(settings.idle_timeout_secs))
        .max_lifetime(optional_secs(settings.max_lifetime_secs))
        .connect(&config.database.url)
        .await?;

    migrator().run(&pool).await?;
    info!("Database migrations applied");

    Ok(pool)
}

/// Build the presigned URL signer, or `None` when storage is not configured yet.
fn setup_signer(config: &Config) -> anyhow::Result<Option<Arc<dyn UploadUrlSigner>>> {
    if let Err(e) = config.s3.ensure_configured() {
        warn!("{e}. Upload URL requests will fail until it is configured.");
        return Ok(None);
    }
    let signer = S3UploadSigner::from_config(&config.s3)?;
    Ok(Some(Arc::new(signer)))
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.auth.security.cors;
    let mut origins = Vec::new();
    for origin in &cors_config.allowed_origins {
        let header_value = match origin {
            CorsOrigin::Wildcard => "*".parse::<HeaderValue>()?,
            CorsOrigin::Url(url) => url.as_str().trim_end_matches('/').parse::<HeaderValue>()?,
        };
        origins.push(header_value);
    }

    let mut cors = CorsLayer::new()
        .allow_methods([http::Method::POST, http::Method::OPTIONS])
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
        .allow_credentials(cors_config.allow_credentials);

    // A literal "*" must go through `Any`, tower-http rejects it inside an origin list
    cors = if cors_config.allowed_origins.iter().any(|o| matches!(o, CorsOrigin::Wildcard)) {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        cors.allow_origin(origins)
    };

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
///
/// - Upload API routes under `/api/v1`
/// - `/healthz`, OpenAPI JSON and the Scalar UI
/// - Optional Prometheus metrics at `/internal/metrics`
/// - CORS and tracing layers
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let api_routes = Router::new()
        .route("/uploads/presigned-url", post(api::handlers::uploads::generate_upload_url))
        .with_state(state.clone());

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/api/v1", api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    let mut router = router.layer(create_cors_layer(&state.config)?);

    if state.config.enable_metrics {
        let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();
        router = router
            .route("/internal/metrics", get(|| async move { metric_handle.render() }))
            .layer(prometheus_layer);
    }

    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// The running service: router, state and the database pool to close on shutdown.
///
/// 1. **Create**: [`Application::new`] connects to the database, runs migrations, builds the
///    signer and the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: When the shutdown signal resolves, in-flight requests finish, the pool is
///    closed and telemetry is flushed
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting uploadctl with configuration: {:#?}", config);

        let pool = setup_database(&config).await?;
        let signer = setup_signer(&config)?;

        let app_state = AppState::builder()
            .config(config.clone())
            .store(Arc::new(PgAccessStore::new(pool.clone())))
            .maybe_signer(signer)
            .build();

        let router = build_router(&app_state)?;

        Ok(Self { router, config, pool })
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("uploadctl listening on http://{}", bind_addr);

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        info!("Shutting down telemetry...");
        telemetry::shutdown_telemetry();

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::db::in_memory::InMemoryAccessStore;
    use crate::test_utils::{create_test_config, create_test_server, create_test_state};
    use axum::http::StatusCode;

    #[test_log::test(tokio::test)]
    async fn test_healthz() {
        let server = create_test_server(create_test_state(InMemoryAccessStore::new()));

        let response = server.get("/healthz").await;
        response.assert_status_ok();
        response.assert_text("OK");
    }

    #[test_log::test(tokio::test)]
    async fn test_openapi_json_and_docs() {
        let server = create_test_server(create_test_state(InMemoryAccessStore::new()));

        let response = server.get("/api-docs/openapi.json").await;
        response.assert_status_ok();
        assert!(response.text().contains("/uploads/presigned-url"));

        server.get("/docs").await.assert_status_ok();
    }

    #[test_log::test(tokio::test)]
    async fn test_metrics_route_only_when_enabled() {
        let server = create_test_server(create_test_state(InMemoryAccessStore::new()));
        server.get("/internal/metrics").await.assert_status(StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_signer_skipped_without_credentials() {
        let config = Config::default();
        assert!(setup_signer(&config).unwrap().is_none());

        assert!(setup_signer(&create_test_config()).unwrap().is_some());
    }

    #[test]
    fn test_cors_layer_from_config() {
        let mut config = create_test_config();
        assert!(create_cors_layer(&config).is_ok());

        config.auth.security.cors.allowed_origins = vec![CorsOrigin::Url(url::Url::parse("https://app.example.com").unwrap())];
        config.auth.security.cors.allow_credentials = true;
        assert!(create_cors_layer(&config).is_ok());
    }
}
