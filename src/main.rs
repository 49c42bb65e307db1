use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use voiceover_stitch::controllers::audio::AudioController;
use voiceover_stitch::controllers::job::JobController;
use voiceover_stitch::domain::audio::AudioService;
use voiceover_stitch::domain::job::JobService;
use voiceover_stitch::infrastructure::audio::Mp3Codec;
use voiceover_stitch::infrastructure::config::{Config, LogFormat};
use voiceover_stitch::infrastructure::http::start_http_server;
use voiceover_stitch::infrastructure::repositories::{ElevenLabsTtsRepository, InMemoryJobRepository};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration, rejecting unknown models before anything else runs
    let config = Config::from_env()?;

    init_logging(&config);

    tracing::info!(
        "Starting voiceover-stitch on {}:{}",
        config.host,
        config.port
    );
    tracing::info!(
        model = %config.model_id,
        default_voice = %config.default_voice_id,
        base_url = %config.elevenlabs_base_url,
        output_dir = %config.output_dir.display(),
        stability = config.voice_settings.stability,
        similarity_boost = config.voice_settings.similarity_boost,
        style = config.voice_settings.style,
        "Synthesis configuration loaded"
    );

    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    tracing::info!("Instantiating repositories...");
    let tts_repo = Arc::new(ElevenLabsTtsRepository::from_config(&config)?);
    let codec = Arc::new(Mp3Codec::new());
    let job_repo = Arc::new(InMemoryJobRepository::new());

    tracing::info!("Instantiating services...");
    let audio_service = Arc::new(AudioService::new(
        tts_repo,
        codec,
        job_repo.clone(),
        config.default_voice_id.clone(),
    ));
    let job_service = Arc::new(JobService::new(job_repo));

    tracing::info!("Instantiating controllers...");
    let audio_controller = Arc::new(AudioController::new(
        audio_service,
        config.output_dir.clone(),
    )?);
    let job_controller = Arc::new(JobController::new(job_service));

    start_http_server(config, audio_controller, job_controller).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "voiceover_stitch=debug,tower_http=debug".into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
