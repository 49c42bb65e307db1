pub mod error;
pub mod model;
pub mod service;

pub use error::JobServiceError;
pub use model::{Job, JobStatus};
pub use service::{JobService, JobServiceApi};

use uuid::Uuid;

/// Storage for generation history
pub trait JobRepository: Send + Sync {
    /// Insert or replace the job with the same id
    fn save(&self, job: &Job);
    fn find_by_id(&self, id: Uuid) -> Option<Job>;
    /// All jobs, newest first
    fn find_all(&self) -> Vec<Job>;
    fn delete(&self, id: Uuid) -> Option<Job>;
}
