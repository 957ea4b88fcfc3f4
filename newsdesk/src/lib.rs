//! # newsdesk: CRUD service for news articles, categories and comments
//!
//! `newsdesk` exposes a uniform admin CRUD API for every resource plus a read-only reader API
//! for published content.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for the HTTP layer.
//! Records are JSON documents kept in a [`db::store::RecordStore`]: either the in-process
//! [`db::store::MemoryStore`] (the default, handy for development and tests) or
//! [`db::store::PgStore`] on an external PostgreSQL database.
//!
//! ### Request Flow
//!
//! Admin requests (`/api/v1/admin/{news,categories,comments}`) reach the generic
//! [`api::resource`] controller. It decodes the query or body, runs the resource's request
//! validator, and calls the resource's [`services::Service`]. Services apply the domain rules
//! (slugs, publish stamps, reference checks) in their `validate_data` hook before handing the
//! fields to a typed [`db::handlers::Records`] repository, which talks to the store.
//!
//! Public requests (`/api/v1/news/*`, `/api/v1/categories/*`, `/api/v1/comments/*`) go through
//! the handlers in [`api::handlers`], which call the read queries on the services directly.
//!
//! Every response, successful or not, uses the [`api::envelope`] shape.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use newsdesk::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = newsdesk::config::Args::parse();
//!     let config = Config::load(&args)?;
//!     newsdesk::telemetry::init_telemetry(config.log_format)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.
pub mod api;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod services;
pub mod telemetry;
pub mod text;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use std::sync::Arc;

use axum::{
    Json, Router,
    http::{self, HeaderValue, Method},
    routing::{get, post},
};
use bon::Builder;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::api::envelope::{self, NOT_FOUND};
use crate::api::models::{
    articles::{self, ArticleCreate, ArticleUpdate, ArticleView},
    categories::{self, CategoryCreate, CategoryUpdate, CategoryView},
    comments::{self, CommentCreate, CommentUpdate, CommentView},
    validation::validate_payload,
};
use crate::api::resource::{ResourceController, ResourceRouter};
use crate::config::{CorsOrigin, DatabaseConfig};
use crate::db::{
    handlers::Records,
    models::{articles::Article, categories::Category, comments::Comment},
    store::{MemoryStore, PgStore, RecordStore},
};
use crate::openapi::ApiDoc;
use crate::services::{ArticleService, CategoryService, CommentService};
pub use config::Config;

/// Application state shared across all request handlers.
///
/// # Example
///
/// ```ignore
/// let state = AppState::builder()
///     .config(config)
///     .articles(articles)
///     .categories(categories)
///     .comments(comments)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub config: Config,
    pub articles: ArticleService,
    pub categories: CategoryService,
    pub comments: CommentService,
}

impl AppState {
    /// State with every service wired to the same store.
    pub fn with_store(config: Config, store: Arc<dyn RecordStore>) -> Self {
        let articles = Records::<Article>::new(store.clone());
        let categories = Records::<Category>::new(store.clone());
        let comments = Records::<Comment>::new(store.clone());

        AppState::builder()
            .articles(ArticleService::new(articles.clone(), categories.clone()))
            .categories(CategoryService::new(categories, articles.clone()))
            .comments(CommentService::new(comments, articles))
            .config(config)
            .build()
    }
}

/// Get the newsdesk database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Open the configured record store. The pool is returned for PostgreSQL so it can be closed on
/// shutdown.
#[instrument(skip_all)]
async fn setup_store(config: &Config) -> anyhow::Result<(Arc<dyn RecordStore>, Option<PgPool>)> {
    match &config.database {
        DatabaseConfig::Memory => {
            info!("Using in-memory store; data will be lost on shutdown");
            Ok((Arc::new(MemoryStore::new()), None))
        }
        DatabaseConfig::External { url, pool: settings } => {
            info!("Using external database");
            let pool = PgPoolOptions::new()
                .max_connections(settings.max_connections)
                .min_connections(settings.min_connections)
                .acquire_timeout(settings.acquire_timeout())
                .idle_timeout(settings.idle_timeout())
                .max_lifetime(settings.max_lifetime())
                .connect(url)
                .await?;
            migrator().run(&pool).await?;
            Ok((Arc::new(PgStore::new(pool.clone())), Some(pool)))
        }
    }
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors_config = &config.cors;

    let allow_origin = if cors_config.allowed_origins.contains(&CorsOrigin::Wildcard) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in &cors_config.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.origin().ascii_serialization().parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([http::header::CONTENT_TYPE, http::header::ACCEPT, http::header::AUTHORIZATION])
        .allow_credentials(cors_config.allow_credentials)
        .expose_headers(vec![http::header::LOCATION]);

    if let Some(max_age) = cors_config.max_age {
        cors = cors.max_age(std::time::Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Admin CRUD routes for every resource, relative to `/api/v1/admin`.
fn admin_routes(state: &AppState) -> Router<AppState> {
    let news = ResourceRouter::new(ResourceController::<Article, ArticleView>::new(
        Arc::new(state.articles.clone()),
        articles::FILTERS,
        validate_payload::<ArticleCreate>,
        validate_payload::<ArticleUpdate>,
    ))
    .with_status_toggle()
    .into_router()
    .route("/{id}/toggle-featured", post(api::handlers::articles::toggle_featured));

    let categories = ResourceRouter::new(ResourceController::<Category, CategoryView>::new(
        Arc::new(state.categories.clone()),
        categories::FILTERS,
        validate_payload::<CategoryCreate>,
        validate_payload::<CategoryUpdate>,
    ))
    .with_status_toggle()
    .into_router();

    let comments = ResourceRouter::new(ResourceController::<Comment, CommentView>::new(
        Arc::new(state.comments.clone()),
        comments::FILTERS,
        validate_payload::<CommentCreate>,
        validate_payload::<CommentUpdate>,
    ))
    .with_status_toggle()
    .into_router();

    Router::new()
        .nest("/news", news)
        .nest("/categories", categories)
        .nest("/comments", comments)
}

/// Reader-facing routes, relative to `/api/v1`.
fn public_routes() -> Router<AppState> {
    use api::handlers::{articles, categories, comments};

    Router::new()
        // News
        .route("/news/published", get(articles::published))
        .route("/news/featured", get(articles::featured))
        .route("/news/popular", get(articles::popular))
        .route("/news/archive/{year}/{month}", get(articles::archive))
        .route("/news/slug/{slug}", get(articles::by_slug))
        .route("/news/{id}/related", get(articles::related))
        // Categories
        .route("/categories/active", get(categories::active))
        .route("/categories/tree", get(categories::tree))
        .route("/categories/with-news-count", get(categories::with_news_count))
        .route("/categories/slug/{slug}", get(categories::by_slug))
        // Comments
        .route("/comments/approved/{news_id}", get(comments::approved))
}

/// Build the main application router with all endpoints and middleware.
///
/// This function constructs the complete Axum router with:
/// - Admin CRUD routes under `/api/v1/admin`
/// - Public reader routes under `/api/v1`
/// - OpenAPI JSON and the interactive reference (when `enable_docs` is set)
/// - CORS configuration
/// - Tracing middleware
///
/// # Errors
///
/// Returns an error if CORS configuration is invalid.
#[instrument(skip_all)]
pub fn build_router(state: &AppState) -> anyhow::Result<Router> {
    let mut router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .nest("/api/v1/admin", admin_routes(state))
        .nest("/api/v1", public_routes())
        .fallback(|| async { envelope::not_found(NOT_FOUND) })
        .with_state(state.clone());

    if state.config.enable_docs {
        router = router
            .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
            .merge(Scalar::with_url("/docs", ApiDoc::openapi()));
    }

    // Create CORS layer from config
    let cors_layer = create_cors_layer(&state.config)?;
    let router = router.layer(cors_layer);

    // Add tracing layer
    let router = router.layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// Main application struct that owns all resources and the HTTP router.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] opens the store (running migrations for PostgreSQL) and
///    builds the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts handling requests
/// 3. **Shutdown**: When the shutdown signal is received, in-flight requests finish and the
///    database pool is closed
pub struct Application {
    router: Router,
    config: Config,
    pool: Option<PgPool>,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting newsdesk with configuration: {:#?}", config);

        let (store, pool) = setup_store(&config).await?;
        let app_state = AppState::with_store(config.clone(), store);
        let router = build_router(&app_state)?;

        Ok(Self {
            router,
            config,
            pool,
        })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Newsdesk listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        // Run the server with graceful shutdown
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        if let Some(pool) = self.pool {
            info!("Closing database connections...");
            pool.close().await;
        }

        Ok(())
    }
}
