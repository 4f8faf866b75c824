use std::{env, sync::Arc};

mod core;
pub mod error_handler;
mod routes;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;
use tracing::info;

use crate::{
    core::app_state::AppState,
    error_handler::AppError,
    routes::{
        add_qa::add_qa_route::add_qa_route, health_route::health_route,
        ingest::ingest_route::ingest_route, query::query_route::query_route,
    },
};

pub async fn start() -> Result<(), AppError> {
    let host_url = env::var("API_ADDRESS").map_err(|_| AppError::MissingEnv("API_ADDRESS"))?;

    let state = Arc::new(AppState::from_env()?);

    // Provision the collection once, before serving traffic.
    state
        .facade
        .ensure_collection()
        .await
        .map_err(|e| AppError::Config(e.to_string()))?;

    let app = Router::new()
        .route("/api/v1/query", post(query_route))
        .route("/api/v1/add", post(add_qa_route))
        .route("/api/v1/ingest", post(ingest_route))
        .route("/health", get(health_route))
        .with_state(state);

    // Bind to address
    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!("Listening on {host_url}");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    Ok(())
}

/// Returns a future that resolves when Ctrl+C is pressed
async fn shutdown_signal() {
    // Wait for the Ctrl+C signal
    if signal::ctrl_c().await.is_err() {
        tracing::error!("Failed to listen for shutdown signal");
    }
}
