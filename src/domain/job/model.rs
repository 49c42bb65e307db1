use crate::domain::audio::ScriptPart;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// History record of one script generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub status: JobStatus,
    pub script_parts: Vec<ScriptPart>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub total_parts: usize,
    /// Parts processed so far, whatever their outcome
    pub completed_parts: usize,
}

impl Job {
    pub fn new(script_parts: Vec<ScriptPart>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            status: JobStatus::Pending,
            total_parts: script_parts.len(),
            script_parts,
            output_file: None,
            error: None,
            created_at: now,
            updated_at: now,
            completed_parts: 0,
        }
    }

    pub fn start(&mut self) {
        self.status = JobStatus::Processing;
        self.touch();
    }

    pub fn advance(&mut self) {
        self.completed_parts = (self.completed_parts + 1).min(self.total_parts);
        self.touch();
    }

    pub fn complete(&mut self, output_file: PathBuf) {
        self.status = JobStatus::Completed;
        self.output_file = Some(output_file);
        self.touch();
    }

    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.error = Some(error.into());
        self.touch();
    }

    /// Completed and failed jobs no longer change
    pub fn is_finished(&self) -> bool {
        matches!(self.status, JobStatus::Completed | JobStatus::Failed)
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
