//! Health and registry inspection endpoints.

use axum::Json;
use axum::extract::State;
use review_window_core::app::PendingCompletion;
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    /// Completions waiting for their window to close.
    pub pending: usize,
}

/// `GET /health`
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: "review-window",
        pending: state.scheduler().registry().len(),
    })
}

/// `GET /pending`: every scheduled completion, earliest first.
pub async fn pending_handler(State(state): State<AppState>) -> Json<Vec<PendingCompletion>> {
    Json(state.scheduler().registry().pending())
}
