pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod preview;
pub mod rate_limit;
pub mod scoring;
pub mod search;
pub mod state;
pub mod upstream;
pub mod worker;

use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing_subscriber::EnvFilter;

use crate::config::{Args, Config};
use crate::handlers::{health_handler, metrics_handler, preview_handler, reconcile_handler};
use crate::state::AppState;
use crate::upstream::HttpTransport;

// creating the router with routes
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/reconcile", get(reconcile_handler).post(reconcile_handler))
        .route("/{entity_type}/{discogs_id}/preview", get(preview_handler))
        .layer(CorsLayer::permissive()) // OpenRefine calls from the browser
        .with_state(state)
}

pub async fn run(args: Args) -> error::Result<()> {
    let config = Config::from_args(args)?;
    init_tracing(&config);

    let addr = config.addr;
    let transport = Arc::new(HttpTransport::new(reqwest::Client::new()));
    let state = AppState::new(config, transport);
    let app = router(state.clone());

    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Reconciliation service listening");
    tracing::info!("Forwarding to Discogs at {}", state.config.api_base);
    if let Some(user) = &state.config.discogs_user {
        tracing::info!("Using Discogs credentials of {user}");
    }

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
