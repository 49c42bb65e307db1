use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::controllers::audio::AudioController;
use crate::domain::audio::AudioServiceApi;

pub async fn health() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn health_ready(State(controller): State<Arc<AudioController>>) -> impl IntoResponse {
    match tokio::fs::create_dir_all(controller.output_dir()).await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "output_dir": "writable",
                "model": controller.audio_service().model_id(),
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Output directory is not writable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "not_ready",
                    "output_dir": "unavailable",
                    "model": controller.audio_service().model_id(),
                })),
            )
        }
    }
}
