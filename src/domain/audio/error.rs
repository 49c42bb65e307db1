use crate::error::AppError;
use crate::infrastructure::repositories::SynthesisError;

#[derive(Debug, thiserror::Error)]
pub enum AudioServiceError {
    /// Every fragment was empty or failed
    #[error("No audio segments were generated")]
    NoAudioGenerated { debug_info: Vec<String> },
    #[error(transparent)]
    Synthesis(#[from] SynthesisError),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<AudioServiceError> for AppError {
    fn from(err: AudioServiceError) -> Self {
        match err {
            AudioServiceError::NoAudioGenerated { debug_info } => AppError::NoAudioGenerated(debug_info),
            AudioServiceError::Invalid(msg) => AppError::BadRequest(msg),
            AudioServiceError::Synthesis(e) => {
                let message = e.to_string();
                match e {
                    SynthesisError::Failure { debug_info, .. } => {
                        AppError::ExternalService(message, debug_info)
                    }
                    SynthesisError::Configuration(_) => AppError::Internal(message),
                }
            }
            AudioServiceError::Other(e) => AppError::Internal(format!("{:#}", e)),
        }
    }
}
