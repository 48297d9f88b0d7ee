//! plic-gw library - Pakistan Localization Image Checker gateway
//!
//! Serves the checker UI and forwards each submitted image, with a fixed
//! review prompt, to an external multimodal model.

pub mod api;
pub mod error;
pub mod extract;
pub mod gateway;
pub mod presentation;
pub mod prompt;
pub mod provider;
pub mod verdict;

pub use crate::error::{AnalysisError, ApiError, ApiResult};
pub use crate::gateway::AnalysisGateway;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<AnalysisGateway>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Request body limit applied to every route
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(gateway: AnalysisGateway, max_body_bytes: usize) -> Self {
        Self {
            gateway: Arc::new(gateway),
            startup_time: Utc::now(),
            max_body_bytes,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let body_limit = state.max_body_bytes;

    Router::new()
        .merge(api::ui_routes())
        .merge(api::analysis_routes())
        .route("/api/catalog", get(api::get_catalog))
        .route("/api/buildinfo", get(api::get_build_info))
        .merge(api::health_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
