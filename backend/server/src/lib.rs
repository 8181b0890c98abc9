//! Documentation of a baby-names and parenting backend.
//!
//!
//!
//! # General Infrastructure
//! - Frontend talks to this service through a reverse proxy
//! - The proxy authenticates sessions and forwards the caller as `x-user-id` / `x-user-role`
//! - Names and posts live in Redis, name text search in Meilisearch
//! - `STORAGE=memory` runs everything in process, no containers needed
//!
//!
//!
//! # Name Pipeline
//!
//! Every write that carries a name runs it through [`lexicon::derive`] before anything is persisted:
//! - cleaned display name and URL slug
//! - metadata (length, first and last letter)
//! - letter analysis (vowel and consonant counts, per-letter traits)
//! - numerology number and traits
//!
//! Popularity is kept by the store. Views and search appearances raise counters and recompute the score, while
//! admin trend updates overwrite the trend only.
//!
//!
//!
//! # Response Envelope
//!
//! Success:
//! ```json
//! { "success": true, "statusCode": 200, "request": { "ip": "…", "method": "GET", "url": "/api/names/count" },
//!   "message": "…", "data": { } }
//! ```
//!
//! Failure:
//! ```json
//! { "success": false, "statusCode": 404, "message": "Name not found", "data": null }
//! ```
//!
//! `request.ip` is omitted in production.
//!
//!
//!
//! # Setup
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
//!
//! Run locally against in-memory storage.
//! ```sh
//! RUST_LOG=info cargo run -p nursery
//! ```
//!
//! Run against Redis + Meilisearch.
//! ```sh
//! STORAGE=redis REDIS_URL=redis://127.0.0.1:6379 MEILI_URL=http://127.0.0.1:7700 cargo run -p nursery
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{
        HeaderName, HeaderValue, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

pub mod auth;
pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod response;
pub mod routes;
pub mod search;
pub mod state;
pub mod store;
pub mod utils;

use auth::{ROLE_HEADER, USER_ID_HEADER};
use config::Config;
use error::AppError;
use state::AppState;

pub async fn start_server() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load()?;

    info!("Initializing state...");
    let state = AppState::new(config).await?;

    info!("Starting server...");
    let address = format!("0.0.0.0:{}", state.config.port);
    let app = app(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutting down...");
    Ok(())
}

pub fn app(state: Arc<AppState>) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins()
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            CONTENT_TYPE,
            AUTHORIZATION,
            HeaderName::from_static(USER_ID_HEADER),
            HeaderName::from_static(ROLE_HEADER),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60));

    routes::router()
        .fallback(route_not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn route_not_found() -> AppError {
    AppError::NotFound("route not found".into())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        ctrl_c().await.expect("Failed to install Ctrl+C handler");

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        signal(SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
