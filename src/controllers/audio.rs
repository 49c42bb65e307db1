use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use regex::Regex;
use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    domain::audio::{
        dto::{AudioGenerationResponse, ModelsResponse, ScriptRequest, SimpleAudioRequest},
        service::GENERATED_FILE_PATTERN,
        AudioService, AudioServiceApi, MODELS,
    },
    error::{AppError, AppResult},
};

/// Longest text accepted for a single fragment, in characters
const MAX_TEXT_LENGTH: usize = 10_000;

pub struct AudioController {
    audio_service: Arc<AudioService>,
    output_dir: PathBuf,
    file_pattern: Regex,
}

impl AudioController {
    pub fn new(audio_service: Arc<AudioService>, output_dir: PathBuf) -> Result<Self, regex::Error> {
        Ok(Self {
            audio_service,
            output_dir,
            file_pattern: Regex::new(GENERATED_FILE_PATTERN)?,
        })
    }

    pub fn audio_service(&self) -> &AudioService {
        &self.audio_service
    }

    pub fn output_dir(&self) -> &std::path::Path {
        &self.output_dir
    }

    /// POST /api/audio/simple - Convert one text to speech
    pub async fn generate_simple(
        State(controller): State<Arc<AudioController>>,
        Json(request): Json<SimpleAudioRequest>,
    ) -> AppResult<Json<AudioGenerationResponse>> {
        validate_text(&request.text)?;

        let generated = controller
            .audio_service
            .generate_simple_audio(
                &request.text,
                request.voice_id.as_deref(),
                &controller.output_dir,
            )
            .await?;

        Ok(Json(AudioGenerationResponse::from_generated(
            "Audio generation successful",
            generated,
        )))
    }

    /// POST /api/audio/script - Convert a multi-part script into one stitched file
    pub async fn generate_script(
        State(controller): State<Arc<AudioController>>,
        Json(request): Json<ScriptRequest>,
    ) -> AppResult<Json<AudioGenerationResponse>> {
        if request.script.is_empty() {
            return Err(AppError::BadRequest("Script cannot be empty".to_string()));
        }
        for part in &request.script {
            validate_text(&part.text)?;
        }

        tracing::info!(parts = request.script.len(), "Script audio request");

        let generated = controller
            .audio_service
            .generate_full_audio(&request.script, &controller.output_dir)
            .await?;

        let message = if generated.failed_parts.is_empty() {
            "Audio generation successful".to_string()
        } else {
            format!(
                "Audio generation successful with {} failed part(s)",
                generated.failed_parts.len()
            )
        };

        Ok(Json(AudioGenerationResponse::from_generated(&message, generated)))
    }

    /// GET /api/models - Known models and the active one
    pub async fn list_models(
        State(controller): State<Arc<AudioController>>,
    ) -> Json<ModelsResponse> {
        Json(ModelsResponse {
            active_model: controller.audio_service.model_id().to_string(),
            models: MODELS.to_vec(),
        })
    }

    /// GET /api/audio/files/:file_name - Download a generated file
    pub async fn download(
        State(controller): State<Arc<AudioController>>,
        Path(file_name): Path<String>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        if !controller.file_pattern.is_match(&file_name) {
            return Err(AppError::BadRequest(format!("Invalid file name: {}", file_name)));
        }

        let path = controller.output_dir.join(&file_name);
        let audio = tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AppError::NotFound(file_name.clone()),
            _ => AppError::Internal(format!("failed to read {}: {}", path.display(), e)),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(controller.audio_service.content_type()),
        );
        let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file_name))
            .map_err(|e| AppError::Internal(e.to_string()))?;
        headers.insert(header::CONTENT_DISPOSITION, disposition);

        Ok((StatusCode::OK, headers, Body::from(audio)))
    }
}

fn validate_text(text: &str) -> AppResult<()> {
    if text.chars().count() > MAX_TEXT_LENGTH {
        return Err(AppError::BadRequest(format!(
            "Text must be {} characters or less",
            MAX_TEXT_LENGTH
        )));
    }
    Ok(())
}
