//! HTTP server module for the FORMU REST API
//!
//! Serves the concept-graph endpoints over the read-only corpus:
//! - Concept listings, search and batch detail with parsed variables
//! - Forward and reverse dependency queries backed by the in-memory index
//! - Range listings with the definitive/transitory filter
//! - Payroll aggregation per period
//! - Index cache refresh/stats and a health probe
//!
//! The dependency index is built before the listener binds, so the first
//! request never sees a partially built index; a scheduled task rebuilds it
//! on the configured interval.

pub mod config;
pub mod error;
pub mod handlers;
pub mod state;

#[cfg(test)]
mod tests;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    routing::{get, post},
};
use formu::SqliteStore;
use formu::index::DependencyIndex;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};

pub use config::ServerConfig;
use state::AppState;

/// Start the FORMU HTTP server.
pub async fn start_server(config: ServerConfig) -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!(
        "Starting FORMU server on {}:{} over {}",
        config.host,
        config.port,
        config.database.display()
    );

    let store = Arc::new(SqliteStore::open(&config.database)?);
    info!(
        connections = store.connection_count(),
        "concept store ready"
    );
    let state = AppState::from_parts(
        store.clone(),
        store,
        config.cache_expiration_minutes,
    );

    // First build happens before the listener binds: requests never observe
    // an uninitialized index, only an empty not-ready one if this fails.
    match build_index(state.index.clone()).await {
        Ok(()) => info!("dependency index ready"),
        Err(e) => error!(error = %e, "initial index build failed; serving with empty index"),
    }

    spawn_scheduled_refresh(state.index.clone(), config.cache_expiration_minutes);

    if config.cors_all {
        warn!("CORS enabled for all origins (development mode)");
    }

    let app = create_app(state, &config);
    let addr = SocketAddr::from((config.host, config.port));
    info!("FORMU API listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router.
pub fn create_app(state: AppState, config: &ServerConfig) -> Router {
    let cors = if config.cors_all {
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE])
            .allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|origin| match origin.parse::<HeaderValue>() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %origin, "ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE])
            .allow_origin(origins)
    };

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/conceptos", get(handlers::list_concepts))
        .route("/api/conceptos/buscar", get(handlers::search_concepts))
        .route("/api/conceptos/batch", post(handlers::concept_batch))
        .route("/api/conceptos/cache/refresh", post(handlers::refresh_cache))
        .route("/api/conceptos/cache/stats", get(handlers::cache_stats))
        .route("/api/conceptos/rango/{lo}/{hi}", get(handlers::range_listing))
        .route("/api/conceptos/{code}", get(handlers::concept_detail))
        .route(
            "/api/conceptos/{code}/dependencias",
            get(handlers::concept_dependencies),
        )
        .route(
            "/api/conceptos/{code}/dependientes",
            get(handlers::concept_dependents),
        )
        .route("/api/liquidacion", get(handlers::payroll_totals))
        .route("/api/liquidacion/tipos", get(handlers::liquidation_types))
        .route("/api/liquidacion/legajos", get(handlers::payroll_employees))
        .route("/api/liquidacion/anios", get(handlers::payroll_years))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

async fn build_index(index: Arc<DependencyIndex>) -> anyhow::Result<()> {
    tokio::task::spawn_blocking(move || index.build()).await??;
    Ok(())
}

/// Rebuild the index on a fixed interval. Failures keep the previous
/// snapshot and are only logged; readers are never blocked beyond the
/// snapshot swap.
fn spawn_scheduled_refresh(index: Arc<DependencyIndex>, minutes: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(minutes.max(1) * 60));
        // The first tick fires immediately and the index was just built.
        interval.tick().await;
        loop {
            interval.tick().await;
            info!("scheduled dependency index refresh");
            let rebuild = index.clone();
            match tokio::task::spawn_blocking(move || rebuild.build()).await {
                Ok(Ok(stats)) => {
                    info!(entries = stats.entries, "scheduled refresh finished")
                }
                Ok(Err(e)) => error!(error = %e, "scheduled refresh failed"),
                Err(e) => error!(error = %e, "scheduled refresh task failed"),
            }
        }
    });
}
