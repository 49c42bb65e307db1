use axum::{
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// MPEG1 Layer III, 128kbps, 44.1kHz, stereo: 417 bytes per frame
pub const FRAME_LEN: usize = 417;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub voice_id: String,
    pub api_key: Option<String>,
    pub body: Value,
    /// Id handed back to the caller, if the call succeeded
    pub request_id: Option<String>,
}

impl RecordedRequest {
    pub fn text(&self) -> &str {
        self.body["text"].as_str().unwrap_or_default()
    }

    pub fn previous_request_ids(&self) -> Vec<String> {
        self.body["previous_request_ids"]
            .as_array()
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| id.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Clone, Default)]
struct FakeState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// Stand-in for the ElevenLabs text-to-speech endpoint.
///
/// Texts starting with `FAIL` get a 400 validation error, texts starting with
/// `NOID` get audio without a `request-id` header; anything else gets
/// `mock_audio_bytes` filled with the first byte of the text.
pub struct FakeElevenLabs {
    pub base_url: String,
    state: FakeState,
}

impl FakeElevenLabs {
    pub async fn start() -> Self {
        let state = FakeState::default();
        let app = Router::new()
            .route("/v1/text-to-speech/:voice_id", post(text_to_speech))
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake ElevenLabs listener");
        let addr = listener.local_addr().expect("Failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}/v1", addr),
            state,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn request_for(&self, text: &str) -> RecordedRequest {
        self.requests()
            .into_iter()
            .find(|request| request.text() == text)
            .unwrap_or_else(|| panic!("No request recorded for text {:?}", text))
    }
}

async fn text_to_speech(
    State(state): State<FakeState>,
    Path(voice_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let text = body["text"].as_str().unwrap_or_default().to_string();
    let api_key = headers
        .get("xi-api-key")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let mut requests = state.requests.lock().unwrap();
    let request_id = format!("req-{}", requests.len() + 1);
    let succeeds = !text.starts_with("FAIL");
    let sends_id = succeeds && !text.starts_with("NOID");

    requests.push(RecordedRequest {
        voice_id,
        api_key,
        body,
        request_id: sends_id.then(|| request_id.clone()),
    });
    drop(requests);

    if !succeeds {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "detail": {
                    "status": "invalid_text",
                    "message": format!("Rejected text: {}", text)
                }
            })),
        )
            .into_response();
    }

    let mut response = mock_audio_bytes(text.as_bytes()[0]).into_response();
    response
        .headers_mut()
        .insert("content-type", HeaderValue::from_static("audio/mpeg"));
    if sends_id {
        response.headers_mut().insert(
            "request-id",
            HeaderValue::from_str(&request_id).unwrap(),
        );
    }
    response
}

pub fn audio_frame(fill: u8) -> Vec<u8> {
    let mut frame = vec![0xFF, 0xFB, 0x90, 0x00];
    frame.resize(FRAME_LEN, fill);
    frame
}

/// The audio frames a decoded response contributes to the output
pub fn expected_frames(fill: u8) -> Vec<u8> {
    [audio_frame(fill), audio_frame(fill)].concat()
}

/// A small but realistic MP3 response: ID3v2 tag, Xing frame, two audio frames
pub fn mock_audio_bytes(fill: u8) -> Vec<u8> {
    let mut id3 = b"ID3".to_vec();
    id3.extend_from_slice(&[4, 0, 0, 0, 0, 0, 12]);
    id3.resize(10 + 12, 0);

    let mut xing = audio_frame(0);
    xing[36..40].copy_from_slice(b"Xing");

    [id3, xing, expected_frames(fill)].concat()
}

/// Base URL on which nothing is listening
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to bind");
    let port = listener.local_addr().expect("Failed to get local addr").port();
    drop(listener);
    format!("http://127.0.0.1:{}/v1", port)
}
