//! `GET /api/health` — liveness plus pipeline availability snapshot.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;
use crate::config;

#[derive(Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub catalog: &'static str,
    pub classes: usize,
    pub model_loaded: bool,
    pub narrator_available: bool,
}

pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: config::APP_VERSION,
        catalog: ctx.analyzer.catalog().variant().name(),
        classes: ctx.analyzer.catalog().len(),
        model_loaded: ctx.analyzer.model_loaded(),
        narrator_available: ctx.analyzer.narrator_available(),
    })
}
