use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Static capability record for a synthesis model
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ModelDescriptor {
    pub id: &'static str,
    pub description: &'static str,
    pub languages: &'static str,
    /// Whether previous/next text and previous request ids are honoured
    pub supports_stitching: bool,
    pub supports_style: bool,
    /// Mandatory pause after every successful call
    #[serde(serialize_with = "serialize_secs")]
    pub wait_time: Duration,
}

pub const DEFAULT_MODEL_ID: &str = "eleven_multilingual_v2";

pub const MODELS: &[ModelDescriptor] = &[
    ModelDescriptor {
        id: "eleven_multilingual_v2",
        description: "Most lifelike model with rich emotional expression",
        languages: "32",
        supports_stitching: true,
        supports_style: true,
        wait_time: Duration::from_millis(100),
    },
    ModelDescriptor {
        id: "eleven_flash_v2_5",
        description: "Ultra-fast model optimized for real-time use",
        languages: "32",
        supports_stitching: false,
        supports_style: false,
        wait_time: Duration::from_millis(100),
    },
    ModelDescriptor {
        id: "eleven_flash_v2",
        description: "Ultra-fast model optimized for real-time use",
        languages: "English",
        supports_stitching: false,
        supports_style: false,
        wait_time: Duration::from_millis(100),
    },
];

/// Look up a model by identifier
pub fn find_model(model_id: &str) -> Option<&'static ModelDescriptor> {
    MODELS.iter().find(|model| model.id == model_id)
}

/// Comma separated list of known model ids, for error messages
pub fn known_model_ids() -> String {
    MODELS
        .iter()
        .map(|model| model.id)
        .collect::<Vec<_>>()
        .join(", ")
}

fn serialize_secs<S: serde::Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(value.as_secs_f64())
}

/// Voice tuning sent with every synthesis request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoiceSettings {
    pub stability: f32,
    pub similarity_boost: f32,
    pub style: f32,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            stability: 0.5,
            similarity_boost: 0.75,
            style: 0.1,
        }
    }
}

/// One labeled text fragment of a script
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptPart {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

impl ScriptPart {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_voice(mut self, voice_id: impl Into<String>) -> Self {
        self.voice_id = Some(voice_id.into());
        self
    }

    /// Voice override, treating an empty string as absent
    pub fn voice_override(&self) -> Option<&str> {
        self.voice_id.as_deref().filter(|voice| !voice.is_empty())
    }
}

impl std::fmt::Display for ScriptPart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{text: {:?}", self.text)?;
        if let Some(voice_id) = &self.voice_id {
            write!(f, ", voice_id: {:?}", voice_id)?;
        }
        if let Some(actor) = &self.actor {
            write!(f, ", actor: {:?}", actor)?;
        }
        write!(f, "}}")
    }
}
