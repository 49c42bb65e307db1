use super::tts_repository::{SegmentRequest, SynthesisError, SynthesisResult, TtsRepository};
use crate::domain::audio::model::{find_model, known_model_ids, ModelDescriptor, VoiceSettings};
use crate::infrastructure::config::Config;
use crate::infrastructure::retry::{retry, RetryPolicy};
use async_trait::async_trait;
use serde::Serialize;

/// The service only honours the three most recent request ids
const MAX_PREVIOUS_REQUEST_IDS: usize = 3;
const REQUEST_ID_HEADER: &str = "request-id";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RequestVoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
}

/// JSON body of `POST /text-to-speech/{voice_id}`
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TextToSpeechBody {
    pub text: String,
    pub model_id: String,
    pub voice_settings: RequestVoiceSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_request_ids: Option<Vec<String>>,
}

/// ElevenLabs implementation of TTS repository
pub struct ElevenLabsTtsRepository {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: &'static ModelDescriptor,
    voice_settings: VoiceSettings,
    retry_policy: RetryPolicy,
}

impl ElevenLabsTtsRepository {
    /// Fails with `SynthesisError::Configuration` when `model_id` is not a known model
    pub fn new(
        api_key: String,
        base_url: String,
        model_id: &str,
        voice_settings: VoiceSettings,
    ) -> Result<Self, SynthesisError> {
        let model = find_model(model_id).ok_or_else(|| {
            SynthesisError::Configuration(format!(
                "Invalid model_id: {}. Must be one of [{}]",
                model_id,
                known_model_ids()
            ))
        })?;

        Ok(Self {
            http_client: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            voice_settings,
            retry_policy: RetryPolicy::default(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, SynthesisError> {
        Self::new(
            config.elevenlabs_api_key.clone(),
            config.elevenlabs_base_url.clone(),
            &config.model_id,
            config.voice_settings,
        )
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Build the request body, adding style and stitching fields only when
    /// the active model supports them
    pub fn build_request_body(&self, request: &SegmentRequest) -> TextToSpeechBody {
        let mut body = TextToSpeechBody {
            text: request.text.clone(),
            model_id: self.model.id.to_string(),
            voice_settings: RequestVoiceSettings {
                stability: self.voice_settings.stability,
                similarity_boost: self.voice_settings.similarity_boost,
            },
            style: None,
            previous_text: None,
            next_text: None,
            previous_request_ids: None,
        };

        if self.model.supports_style {
            body.style = Some(self.voice_settings.style);
        }

        if self.model.supports_stitching {
            body.previous_text = request.previous_text.clone();
            body.next_text = request.next_text.clone();

            let ids = &request.previous_request_ids;
            if !ids.is_empty() {
                let start = ids.len().saturating_sub(MAX_PREVIOUS_REQUEST_IDS);
                body.previous_request_ids = Some(ids[start..].to_vec());
            }
        }

        body
    }

    /// Send the request, retrying only transport failures
    async fn send(
        &self,
        voice_id: &str,
        body: &TextToSpeechBody,
    ) -> Result<(reqwest::StatusCode, reqwest::header::HeaderMap, Vec<u8>), String> {
        let url = format!("{}/text-to-speech/{}", self.base_url, voice_id);
        let url = url.as_str();

        retry(&self.retry_policy, "elevenlabs_text_to_speech", move || async move {
            let response = self
                .http_client
                .post(url)
                .header("Accept", "application/json")
                .header("xi-api-key", &self.api_key)
                .json(body)
                .send()
                .await?;

            let status = response.status();
            let headers = response.headers().clone();
            let audio = response.bytes().await?;

            Ok::<_, reqwest::Error>((status, headers, audio.to_vec()))
        })
        .await
        .map_err(|exhausted| {
            format!(
                "ElevenLabs call failed after {} attempts: {}",
                exhausted.attempts, exhausted.last_error
            )
        })
    }
}

#[async_trait]
impl TtsRepository for ElevenLabsTtsRepository {
    async fn synthesize(
        &self,
        request: SegmentRequest,
        debug_info: &mut Vec<String>,
    ) -> Result<SynthesisResult, SynthesisError> {
        let start_time = std::time::Instant::now();
        let body = self.build_request_body(&request);
        let request_body = serde_json::to_string(&body).unwrap_or_default();

        tracing::info!(
            model = %self.model.id,
            voice = %request.voice_id,
            text_length = request.text.len(),
            text_preview = %request.text.chars().take(200).collect::<String>(),
            has_previous_text = body.previous_text.is_some(),
            has_next_text = body.next_text.is_some(),
            previous_request_ids = body.previous_request_ids.as_ref().map(Vec::len).unwrap_or(0),
            "Calling ElevenLabs text-to-speech"
        );

        let (status, headers, audio) = match self.send(&request.voice_id, &body).await {
            Ok(response) => response,
            Err(payload) => {
                debug_info.push(payload.clone());
                return Err(SynthesisError::Failure {
                    status: None,
                    payload,
                    request_body,
                    debug_info: debug_info.clone(),
                });
            }
        };

        if status != reqwest::StatusCode::OK {
            let payload = String::from_utf8_lossy(&audio).into_owned();
            tracing::error!(
                status = status.as_u16(),
                payload = %payload,
                model = %self.model.id,
                voice = %request.voice_id,
                "ElevenLabs text-to-speech rejected the request"
            );
            debug_info.push(payload.clone());
            return Err(SynthesisError::Failure {
                status: Some(status.as_u16()),
                payload,
                request_body,
                debug_info: debug_info.clone(),
            });
        }

        let Some(request_id) = headers
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
        else {
            let payload = format!("response is missing the {} header", REQUEST_ID_HEADER);
            debug_info.push(payload.clone());
            return Err(SynthesisError::Failure {
                status: Some(status.as_u16()),
                payload,
                request_body,
                debug_info: debug_info.clone(),
            });
        };

        if let Some(output_file) = &request.output_file {
            if let Err(e) = tokio::fs::write(output_file, &audio).await {
                let payload = format!("failed to write {}: {}", output_file.display(), e);
                debug_info.push(payload.clone());
                return Err(SynthesisError::Failure {
                    status: Some(status.as_u16()),
                    payload,
                    request_body,
                    debug_info: debug_info.clone(),
                });
            }
        }

        tracing::info!(
            provider = "elevenlabs",
            model = %self.model.id,
            request_id = %request_id,
            latency_ms = start_time.elapsed().as_millis() as u64,
            audio_size_bytes = audio.len(),
            "TTS synthesis completed"
        );

        // Rate limiting courtesy, successful calls only
        tokio::time::sleep(self.model.wait_time).await;

        Ok(SynthesisResult { audio, request_id })
    }

    fn model_id(&self) -> &str {
        self.model.id
    }
}
