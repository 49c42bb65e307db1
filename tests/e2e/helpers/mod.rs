use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use test_context::AsyncTestContext;
use tokio::net::TcpListener;
use voiceover_stitch::{
    controllers::{audio::AudioController, job::JobController},
    domain::{
        audio::{AudioService, VoiceSettings},
        job::{JobRepository, JobService},
    },
    infrastructure::{
        audio::Mp3Codec,
        http::create_router,
        repositories::{ElevenLabsTtsRepository, InMemoryJobRepository},
        retry::RetryPolicy,
    },
};

pub mod api_client;
pub mod fake_elevenlabs;

use api_client::TestClient;
use fake_elevenlabs::FakeElevenLabs;

pub const TEST_API_KEY: &str = "test-elevenlabs-key";
pub const DEFAULT_VOICE: &str = "test-default-voice";

/// Retries fast enough to keep transport failure tests short
pub fn fast_retry_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(5),
    }
}

/// ElevenLabs client talking to `base_url` with the given model
pub fn tts_repository(base_url: &str, model_id: &str) -> ElevenLabsTtsRepository {
    ElevenLabsTtsRepository::new(
        TEST_API_KEY.to_string(),
        base_url.to_string(),
        model_id,
        VoiceSettings::default(),
    )
    .expect("Failed to create ElevenLabs repository")
    .with_retry_policy(fast_retry_policy())
}

/// Audio service talking to `base_url` with the given model
pub fn audio_service(base_url: &str, model_id: &str) -> AudioService {
    audio_service_with_jobs(base_url, model_id, Arc::new(InMemoryJobRepository::new()))
}

pub fn audio_service_with_jobs(
    base_url: &str,
    model_id: &str,
    job_repo: Arc<dyn JobRepository>,
) -> AudioService {
    AudioService::new(
        Arc::new(tts_repository(base_url, model_id)),
        Arc::new(Mp3Codec::new()),
        job_repo,
        DEFAULT_VOICE.to_string(),
    )
}

pub struct TestContext {
    pub client: TestClient,
    pub elevenlabs: FakeElevenLabs,
    pub output_dir: PathBuf,
    _output: TempDir,
}

impl AsyncTestContext for TestContext {
    fn setup() -> impl std::future::Future<Output = Self> + Send {
        async {
            let elevenlabs = FakeElevenLabs::start().await;
            let output = tempfile::tempdir().expect("Failed to create output dir");
            let output_dir = output.path().join("output");

            let job_repo: Arc<dyn JobRepository> = Arc::new(InMemoryJobRepository::new());
            let audio_service = Arc::new(audio_service_with_jobs(
                &elevenlabs.base_url,
                "eleven_multilingual_v2",
                job_repo.clone(),
            ));
            let audio_controller = Arc::new(
                AudioController::new(audio_service, output_dir.clone())
                    .expect("Failed to create audio controller"),
            );
            let job_controller = Arc::new(JobController::new(Arc::new(JobService::new(job_repo))));
            let app = create_router(audio_controller, job_controller);

            // Start server
            let listener = TcpListener::bind("127.0.0.1:0")
                .await
                .expect("Failed to bind listener");
            let addr = listener.local_addr().expect("Failed to get local addr");
            let base_url = format!("http://{}", addr);

            tokio::spawn(async move {
                axum::serve(listener, app).await.unwrap();
            });

            let client = TestClient::new(&base_url);

            Self {
                client,
                elevenlabs,
                output_dir,
                _output: output,
            }
        }
    }

    fn teardown(self) -> impl std::future::Future<Output = ()> + Send {
        async {
            // Output directory is removed when the TempDir drops
        }
    }
}
