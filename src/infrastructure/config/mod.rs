use crate::domain::audio::model::{find_model, known_model_ids, VoiceSettings, DEFAULT_MODEL_ID};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io/v1";
pub const DEFAULT_VOICE_ID: &str = "iEw1wkYocsNy7I7pteSN";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_format: LogFormat,
    pub output_dir: PathBuf,
    // ElevenLabs
    pub elevenlabs_api_key: String,
    pub elevenlabs_base_url: String,
    pub default_voice_id: String,
    pub model_id: String,
    pub voice_settings: VoiceSettings,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
    #[error("{name} must be between 0.0 and 1.0, got {value}")]
    OutOfRange { name: &'static str, value: f32 },
    #[error("invalid model_id: {0}. Must be one of [{1}]")]
    UnknownModel(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let model_id = var_or("ELEVENLABS_MODEL_ID", DEFAULT_MODEL_ID);
        if find_model(&model_id).is_none() {
            return Err(ConfigError::UnknownModel(model_id, known_model_ids()));
        }

        let defaults = VoiceSettings::default();

        let config = Config {
            host: var_or("HOST", "0.0.0.0"),
            port: parse_var("PORT", 8080)?,
            log_format: match var_or("LOG_FORMAT", "pretty").as_str() {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            output_dir: PathBuf::from(var_or("OUTPUT_DIR", "output")),
            elevenlabs_api_key: env::var("ELEVENLABS_API_KEY")
                .map_err(|_| ConfigError::Missing("ELEVENLABS_API_KEY"))?,
            elevenlabs_base_url: var_or("ELEVENLABS_BASE_URL", DEFAULT_BASE_URL),
            default_voice_id: var_or("ELEVENLABS_VOICE_ID", DEFAULT_VOICE_ID),
            model_id,
            voice_settings: VoiceSettings {
                stability: unit_var("ELEVENLABS_STABILITY", defaults.stability)?,
                similarity_boost: unit_var("ELEVENLABS_SIMILARITY_BOOST", defaults.similarity_boost)?,
                style: unit_var("ELEVENLABS_STYLE", defaults.style)?,
            },
        };

        Ok(config)
    }
}

/// Read a variable, treating unset and empty the same way
fn var_or(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        _ => Ok(default),
    }
}

/// Float setting bounded to [0.0, 1.0]
fn unit_var(name: &'static str, default: f32) -> Result<f32, ConfigError> {
    let value: f32 = parse_var(name, default)?;
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::OutOfRange { name, value });
    }
    Ok(value)
}
