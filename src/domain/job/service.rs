use super::{error::JobServiceError, Job, JobRepository};
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

pub struct JobService {
    job_repo: Arc<dyn JobRepository>,
}

impl JobService {
    pub fn new(job_repo: Arc<dyn JobRepository>) -> Self {
        Self { job_repo }
    }
}

#[async_trait]
pub trait JobServiceApi: Send + Sync {
    async fn list_jobs(&self) -> Vec<Job>;

    async fn get_job(&self, job_id: Uuid) -> Result<Job, JobServiceError>;

    /// Remove a finished job from history together with its output file
    async fn delete_job(&self, job_id: Uuid) -> Result<Job, JobServiceError>;
}

#[async_trait]
impl JobServiceApi for JobService {
    async fn list_jobs(&self) -> Vec<Job> {
        self.job_repo.find_all()
    }

    async fn get_job(&self, job_id: Uuid) -> Result<Job, JobServiceError> {
        self.job_repo
            .find_by_id(job_id)
            .ok_or(JobServiceError::NotFound)
    }

    async fn delete_job(&self, job_id: Uuid) -> Result<Job, JobServiceError> {
        let job = self.get_job(job_id).await?;
        if !job.is_finished() {
            return Err(JobServiceError::InProgress);
        }

        let job = self
            .job_repo
            .delete(job_id)
            .ok_or(JobServiceError::NotFound)?;

        if let Some(output_file) = &job.output_file {
            match tokio::fs::remove_file(output_file).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::warn!(
                        job_id = %job_id,
                        output_file = %output_file.display(),
                        "Output file already gone"
                    );
                }
                Err(e) => {
                    return Err(JobServiceError::Other(anyhow::Error::new(e).context(
                        format!("failed to remove {}", output_file.display()),
                    )))
                }
            }
        }

        tracing::info!(job_id = %job_id, "Job deleted");

        Ok(job)
    }
}
