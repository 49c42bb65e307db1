pub mod request_id;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::controllers::{audio::AudioController, health, job::JobController};
use crate::infrastructure::config::Config;

pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};

/// Build the application router with all routes configured
pub fn create_router(
    audio_controller: Arc<AudioController>,
    job_controller: Arc<JobController>,
) -> Router {
    let audio_routes = Router::new()
        .route("/api/audio/simple", post(AudioController::generate_simple))
        .route("/api/audio/script", post(AudioController::generate_script))
        .route("/api/audio/files/:file_name", get(AudioController::download))
        .route("/api/models", get(AudioController::list_models))
        .route("/health/ready", get(health::health_ready))
        .with_state(audio_controller);

    let job_routes = Router::new()
        .route("/api/jobs", get(JobController::list_jobs))
        .route(
            "/api/jobs/:job_id",
            get(JobController::get_job).delete(JobController::delete_job),
        )
        .with_state(job_controller);

    Router::new()
        .route("/health", get(health::health))
        .merge(audio_routes)
        .merge(job_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_id_middleware))
                .layer(CorsLayer::permissive()),
        )
}

/// Start the HTTP server
pub async fn start_http_server(
    config: Arc<Config>,
    audio_controller: Arc<AudioController>,
    job_controller: Arc<JobController>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(audio_controller, job_controller);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
