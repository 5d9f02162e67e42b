//! Analysis API router.
//!
//! Returns a composable `Router` that can be mounted on any axum server.
//! Routes are nested under `/api/`.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::pipeline::LesionAnalyzer;

/// Request body ceiling — matches the preprocess byte bound, so oversized
/// uploads are refused at the edge instead of mid-pipeline.
const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// Build the analysis API router.
pub fn analysis_router(analyzer: Arc<LesionAnalyzer>) -> Router {
    let ctx = ApiContext::new(analyzer);

    Router::new()
        .route("/api/analyze", post(endpoints::analyze::analyze))
        .route("/api/health", get(endpoints::health::check))
        .with_state(ctx)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
