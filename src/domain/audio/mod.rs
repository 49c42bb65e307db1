pub mod dto;
pub mod error;
pub mod model;
pub mod service;

pub use error::AudioServiceError;
pub use model::{find_model, ModelDescriptor, ScriptPart, VoiceSettings, MODELS};
pub use service::{AudioService, AudioServiceApi, FailedPart, GeneratedAudio};
