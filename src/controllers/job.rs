use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::job::{Job, JobService, JobServiceApi},
    error::AppResult,
};

pub struct JobController {
    job_service: Arc<JobService>,
}

impl JobController {
    pub fn new(job_service: Arc<JobService>) -> Self {
        Self { job_service }
    }

    /// GET /api/jobs - Generation history, newest first
    pub async fn list_jobs(State(controller): State<Arc<JobController>>) -> Json<Vec<Job>> {
        Json(controller.job_service.list_jobs().await)
    }

    /// GET /api/jobs/:job_id - One history entry
    pub async fn get_job(
        State(controller): State<Arc<JobController>>,
        Path(job_id): Path<Uuid>,
    ) -> AppResult<Json<Job>> {
        let job = controller.job_service.get_job(job_id).await?;
        Ok(Json(job))
    }

    /// DELETE /api/jobs/:job_id - Delete a finished job and its output file
    pub async fn delete_job(
        State(controller): State<Arc<JobController>>,
        Path(job_id): Path<Uuid>,
    ) -> AppResult<StatusCode> {
        controller.job_service.delete_job(job_id).await?;
        Ok(StatusCode::NO_CONTENT)
    }
}
