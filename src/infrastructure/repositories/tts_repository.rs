use async_trait::async_trait;
use std::path::PathBuf;

/// One fragment's synthesis call, with optional stitching context
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentRequest {
    pub text: String,
    pub voice_id: String,
    pub previous_text: Option<String>,
    pub next_text: Option<String>,
    /// Request ids of earlier fragments, oldest first
    pub previous_request_ids: Vec<String>,
    /// Also write the raw response bytes here before returning
    pub output_file: Option<PathBuf>,
}

/// Audio bytes plus the id the service assigned to the request
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisResult {
    pub audio: Vec<u8>,
    pub request_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SynthesisError {
    #[error("invalid synthesis configuration: {0}")]
    Configuration(String),

    /// The service rejected the request, or the call could not be completed
    #[error("Failed to generate audio: {payload}")]
    Failure {
        status: Option<u16>,
        payload: String,
        request_body: String,
        debug_info: Vec<String>,
    },
}

/// Repository for text-to-speech synthesis calls.
///
/// One call converts one fragment; implementations handle provider specific
/// request shaping, transport retries and rate limiting.
#[async_trait]
pub trait TtsRepository: Send + Sync {
    /// Synthesize one fragment.
    ///
    /// # Errors
    /// On failure the raw error payload is appended to `debug_info` and a
    /// `SynthesisError::Failure` carrying the outbound request body is returned.
    async fn synthesize(
        &self,
        request: SegmentRequest,
        debug_info: &mut Vec<String>,
    ) -> Result<SynthesisResult, SynthesisError>;

    /// Identifier of the active model
    fn model_id(&self) -> &str;
}
