#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web API server for the crime watch dashboard.
//!
//! Serves the dashboard's data as JSON: the filtered incidents, KPIs,
//! rankings, proximity alerts, police coverage and map layers. The incident
//! CSV is held in a shared [`DatasetCache`] and reloaded once it expires.

mod handlers;
pub mod interactive;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use crime_watch_config::{ConfigError, DashboardConfig};
use crime_watch_dataset::DatasetError;
use crime_watch_dataset::cache::DatasetCache;
use crime_watch_proximity::ProximityError;
use thiserror::Error;

/// Default bind address when `BIND_ADDR` is unset.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1";

/// Default port when `PORT` is unset or invalid.
pub const DEFAULT_PORT: u16 = 8080;

/// Errors a request can fail with.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A control value was rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The reference point or radius was rejected.
    #[error(transparent)]
    Proximity(#[from] ProximityError),

    /// The incident dataset could not be loaded.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// The blocking thread pool could not run the dataset reload.
    #[error(transparent)]
    Blocking(#[from] actix_web::error::BlockingError),
}

/// Shared application state.
pub struct AppState {
    /// Dashboard configuration.
    pub config: Arc<DashboardConfig>,
    /// Shared incident dataset.
    pub cache: Arc<DatasetCache>,
}

impl AppState {
    /// Builds the state for `config`, with an empty dataset cache.
    #[must_use]
    pub fn new(config: DashboardConfig) -> Self {
        let cache = DatasetCache::from_config(&config);
        Self {
            config: Arc::new(config),
            cache: Arc::new(cache),
        }
    }
}

/// Registers the `/api` routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/config", web::get().to(handlers::config))
            .route("/categories", web::get().to(handlers::categories))
            .route("/incidents", web::get().to(handlers::incidents))
            .route("/summary", web::get().to(handlers::summary))
            .route("/rankings", web::get().to(handlers::rankings))
            .route("/alerts", web::get().to(handlers::alerts))
            .route("/coverage", web::get().to(handlers::coverage))
            .route("/layers", web::get().to(handlers::layers)),
    );
}

/// Reads `BIND_ADDR` and `PORT`, falling back to the defaults.
#[must_use]
pub fn bind_address() -> (String, u16) {
    bind_address_from(
        std::env::var("BIND_ADDR").ok(),
        std::env::var("PORT").ok().as_deref(),
    )
}

/// Resolves the bind address from optional raw values. An unparseable
/// port falls back to [`DEFAULT_PORT`].
#[must_use]
pub fn bind_address_from(bind_addr: Option<String>, port: Option<&str>) -> (String, u16) {
    let bind_addr = bind_addr.unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
    let port = port.and_then(|p| p.parse().ok()).unwrap_or(DEFAULT_PORT);
    (bind_addr, port)
}

/// Starts the API server with the configuration from the environment.
///
/// The caller is responsible for initialising logging and providing the
/// async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the configuration cannot be
/// loaded, or if the HTTP server fails to bind or encounters a runtime
/// error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    let config = DashboardConfig::load().map_err(std::io::Error::other)?;
    serve(config).await
}

/// Starts the API server with an already loaded configuration.
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn serve(config: DashboardConfig) -> std::io::Result<()> {
    log::info!(
        "Serving incidents from {} (cache TTL {}s)",
        config.data_path.display(),
        config.cache_ttl_secs
    );

    let state = web::Data::new(AppState::new(config));

    if let Err(e) = state.cache.get() {
        log::warn!("Dataset not loadable yet, will retry on first request: {e}");
    }

    let (bind_addr, port) = bind_address();
    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await
}
