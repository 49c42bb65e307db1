use crate::error::AppError;

#[derive(Debug, thiserror::Error)]
pub enum JobServiceError {
    #[error("job not found")]
    NotFound,
    #[error("job is still running")]
    InProgress,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<JobServiceError> for AppError {
    fn from(err: JobServiceError) -> Self {
        match err {
            JobServiceError::NotFound => AppError::NotFound("Job not found".to_string()),
            JobServiceError::InProgress => {
                AppError::Conflict("Job is still running and cannot be deleted".to_string())
            }
            JobServiceError::Other(e) => AppError::Internal(format!("{:#}", e)),
        }
    }
}
