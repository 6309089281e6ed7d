use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use ecoaware_core::{EcoError, Mode};
use ecoaware_inference::huggingface::{
    HuggingFaceSettings, DEFAULT_API_URL, DEFAULT_CHAT_MODEL, DEFAULT_IMAGE_MODEL,
};

/// Default upload cap: 16 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// EcoAware runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Which inference backend serves requests
    pub mode: Mode,
    /// Log level
    pub log_level: String,
    /// Directory for rolling JSON logs; console only when unset
    pub log_dir: Option<PathBuf>,
    /// JSON/YAML reference tables; built-in tables when unset
    pub tables_path: Option<PathBuf>,
    /// Seed for the mock engine's generator; entropy when unset
    pub seed: Option<u64>,
    /// Largest accepted request body
    pub max_upload_bytes: usize,

    // Hugging Face
    pub hf_api_url: String,
    pub hf_api_token: Option<String>,
    pub hf_image_model: String,
    pub hf_chat_model: String,
    pub hf_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 5001,
            mode: Mode::Real,
            log_level: "info".to_string(),
            log_dir: None,
            tables_path: None,
            seed: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            hf_api_url: DEFAULT_API_URL.to_string(),
            hf_api_token: None,
            hf_image_model: DEFAULT_IMAGE_MODEL.to_string(),
            hf_chat_model: DEFAULT_CHAT_MODEL.to_string(),
            hf_timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self, EcoError> {
        Self::from_vars(&std::env::vars().collect())
    }

    /// Load configuration from a provided map (useful for testing).
    pub fn from_vars(env: &HashMap<String, String>) -> Result<Self, EcoError> {
        let defaults = Self::default();
        let var = |key: &str| env.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let mode = match var("MODE") {
            Some(m) => m.parse()?,
            None => defaults.mode,
        };
        let seed = var("ECOAWARE_SEED")
            .map(|s| {
                s.parse::<u64>()
                    .map_err(|_| EcoError::ConfigError(format!("ECOAWARE_SEED '{s}' is not a u64")))
            })
            .transpose()?;

        Ok(Self {
            bind_address: var("ECOAWARE_BIND")
                .map(String::from)
                .unwrap_or(defaults.bind_address),
            port: var("ECOAWARE_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            mode,
            log_level: var("RUST_LOG")
                .map(String::from)
                .unwrap_or(defaults.log_level),
            log_dir: var("ECOAWARE_LOG_DIR").map(PathBuf::from),
            tables_path: var("ECOAWARE_TABLES").map(PathBuf::from),
            seed,
            max_upload_bytes: var("ECOAWARE_MAX_UPLOAD_BYTES")
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
            hf_api_url: var("HF_API_URL")
                .map(String::from)
                .unwrap_or(defaults.hf_api_url),
            hf_api_token: var("HF_API_TOKEN").map(String::from),
            hf_image_model: var("HF_MODEL_NAME")
                .map(String::from)
                .unwrap_or(defaults.hf_image_model),
            hf_chat_model: var("HF_CHAT_MODEL")
                .map(String::from)
                .unwrap_or(defaults.hf_chat_model),
            hf_timeout_secs: var("HF_TIMEOUT_SECS")
                .and_then(|n| n.parse().ok())
                .unwrap_or(defaults.hf_timeout_secs),
        })
    }

    pub fn huggingface(&self) -> HuggingFaceSettings {
        HuggingFaceSettings {
            api_url: self.hf_api_url.clone(),
            api_token: self.hf_api_token.clone(),
            image_model: self.hf_image_model.clone(),
            chat_model: self.hf_chat_model.clone(),
            timeout: Duration::from_secs(self.hf_timeout_secs),
        }
    }
}
