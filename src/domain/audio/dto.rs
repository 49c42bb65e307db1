use super::model::{ModelDescriptor, ScriptPart};
use super::service::{FailedPart, GeneratedAudio};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request for POST /api/audio/simple
#[derive(Debug, Serialize, Deserialize)]
pub struct SimpleAudioRequest {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
}

/// Request for POST /api/audio/script
#[derive(Debug, Serialize, Deserialize)]
pub struct ScriptRequest {
    pub script: Vec<ScriptPart>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AudioGenerationResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<Uuid>,
    pub output_file: String,
    pub file_name: String,
    pub duration_seconds: f64,
    #[serde(default)]
    pub failed_parts: Vec<FailedPart>,
    pub debug_info: Vec<String>,
}

impl AudioGenerationResponse {
    pub fn from_generated(message: &str, generated: GeneratedAudio) -> Self {
        let file_name = generated
            .output_file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            success: true,
            message: message.to_string(),
            job_id: generated.job_id,
            output_file: generated.output_file.display().to_string(),
            file_name,
            duration_seconds: generated.duration.as_secs_f64(),
            failed_parts: generated.failed_parts,
            debug_info: generated.debug_info,
        }
    }
}

/// Response for GET /api/models
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    pub active_model: String,
    pub models: Vec<ModelDescriptor>,
}
