//! Health check endpoint

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub service: &'static str,
    pub recognizer: &'static str,
    /// Whether the recognizer backend answered its availability probe
    pub recognizer_available: bool,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let ocr = state.ocr();
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        service: "ocr-server",
        recognizer: ocr.recognizer_name(),
        recognizer_available: ocr.recognizer_available().await,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
