//! Analysis endpoint
//!
//! POST /api/analyze-image (alias POST /api/analyses)
//!
//! Body: `{ source, encodedImageOrUrl, displayName? }`. Success returns the
//! `AnalysisResult`; failure returns `{ "error": message, "code": ... }`.

use axum::{
    extract::{rejection::JsonRejection, State},
    routing::post,
    Json, Router,
};
use plic_common::{AnalysisRequest, AnalysisResult};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Build analysis routes
pub fn analysis_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/analyze-image",
            post(create_analysis).fallback(method_not_allowed),
        )
        .route(
            "/api/analyses",
            post(create_analysis).fallback(method_not_allowed),
        )
}

/// POST /api/analyze-image
pub async fn create_analysis(
    State(state): State<AppState>,
    payload: Result<Json<AnalysisRequest>, JsonRejection>,
) -> ApiResult<Json<AnalysisResult>> {
    let Json(request) = payload.map_err(|rejection| {
        tracing::info!(error = %rejection.body_text(), "Rejected analysis body");
        ApiError::from(rejection)
    })?;

    let result = state.gateway.analyze(&request).await.map_err(|e| {
        tracing::warn!(code = e.code(), error = %e, "Analysis failed");
        ApiError::from(e)
    })?;

    Ok(Json(result))
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
