//! # Restaurant KPI API
//!
//! Read-only aggregation layer between the scraped TripAdvisor table on Supabase and the
//! static dashboard.
//!
//!
//!
//! # Endpoints
//! - `/`: dashboard page from the static directory
//! - `/api/restaurants`: every row, ordered by city
//! - `/api/kpis`: per-city count, average, reviews, best and worst rating
//! - `/api/bubble-chart`: average, reviews and count per city
//! - `/api/pie-chart`: count per city
//! - `/api/line-chart`: average per city, sorted by city
//!
//! Any failure talking to Supabase or decoding a row is a 500 with `{"error": message}`.
//!
//!
//!
//! # Request Flow
//! - Every API request does one full table scan
//! - The scan is folded in memory into the requested view
//! - Nothing is cached, two requests may see different snapshots
//!
//!
//!
//! # Environment
//! Read from the process, after merging a `.env` file from the working directory or a parent
//! (process variables win).
//! - `RUST_PORT`: listening port, default 5000
//! - `SUPABASE_URL`: project URL, required
//! - `SUPABASE_ANON_KEY`: anon key, required, falls back to `/run/secrets/SUPABASE_ANON_KEY`
//! - `RESTAURANT_TABLE`: default `restaurant`
//! - `STATIC_DIR`: default `static`
//! - `RUST_LOG`: tracing filter, e.g. `server=debug,tower_http=debug`
use std::{future::pending, sync::Arc, time::Duration};

use axum::{
    Router,
    http::{Method, header::CONTENT_TYPE},
    routing::get,
};
#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};
use tokio::{net::TcpListener, signal::ctrl_c};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod aggregate;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod routes;
pub mod service;
pub mod state;

use config::Config;
use error::StartupError;
use routes::{
    bubble_chart_handler, kpis_handler, line_chart_handler, pie_chart_handler,
    restaurants_handler,
};
use state::AppState;

pub async fn start_server() -> Result<(), StartupError> {
    // before the subscriber so RUST_LOG may come from .env
    let dotenv = dotenvy::dotenv();

    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) => debug!("No .env file loaded: {e}"),
    }

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = AppState::new(config)?;

    info!("Starting server...");
    let app = app(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");

    Ok(())
}

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let static_dir = state.config.static_dir.clone();

    Router::new()
        .route_service("/", ServeFile::new(static_dir.join("index.html")))
        .route("/api/restaurants", get(restaurants_handler))
        .route("/api/kpis", get(kpis_handler))
        .route("/api/bubble-chart", get(bubble_chart_handler))
        .route("/api/pie-chart", get(pie_chart_handler))
        .route("/api/line-chart", get(line_chart_handler))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
            pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                pending::<()>().await;
            }
        }

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
