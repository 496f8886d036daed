use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/trending", get(handlers::all_trending))
        .route("/api/trending/:region", get(handlers::region_trending))
        .route("/api/trending/:region/:category", get(handlers::category_trending))
        .route("/api/query", post(handlers::query))
        .route("/admin/clear-cache", post(handlers::clear_cache))
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Serves the API on `addr` until the process is stopped.
pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> nh_core::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("🌐 Listening on http://{}", addr);
    axum::serve(listener, create_app(state)).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::{create_app, serve, AppState};
    pub use nh_core::{Error, Result};
}
