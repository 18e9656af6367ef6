//! HTTP surface
//!
//! An axum router over one shared [`StructureService`].
//!
//! # Endpoints
//!
//! - `GET /assets/*address` - asset bytes, conditional on `If-None-Match`
//! - `GET /api/entry?url=&uid=&sid=&version=` - assembled entry
//! - `GET /api/menu?path=` - top-level menu and section tree
//! - `GET /api/toc?url=&uid=&sid=&version=` - nested table of contents
//! - `GET /api/redirects` - `sid -> url` map
//! - `GET /api/health` - liveness plus the current version

use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::services::StructureService;

mod asset_routes;
mod entry_routes;
mod http_error;

pub use http_error::HttpError;

/// Application state shared across all endpoints
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<StructureService>,
}

impl AppState {
    pub fn new(service: Arc<StructureService>) -> Self {
        Self { service }
    }
}

/// Create the application router with every endpoint module merged in
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(asset_routes::routes(state.clone()))
        .merge(entry_routes::routes(state))
        .layer(TraceLayer::new_for_http())
}

/// Bind `addr` and serve until the process is stopped
pub async fn serve(service: Arc<StructureService>, addr: &str) -> anyhow::Result<()> {
    let app = create_router(AppState::new(service));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("structure server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
