pub mod elevenlabs_tts_repository;
pub mod job_repository;
pub mod tts_repository;

pub use elevenlabs_tts_repository::ElevenLabsTtsRepository;
pub use job_repository::InMemoryJobRepository;
pub use tts_repository::{SegmentRequest, SynthesisError, SynthesisResult, TtsRepository};
