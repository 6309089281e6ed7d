//! Hugging Face Inference API client.
//!
//! Serves as the external collaborator behind the model-backed strategies:
//! image classification for analysis/segregation and text generation for chat.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::info;

use ecoaware_core::{EcoError, ImageClassifier, Prediction, TextGenerator};

pub const DEFAULT_API_URL: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_IMAGE_MODEL: &str = "microsoft/resnet-50";
pub const DEFAULT_CHAT_MODEL: &str = "facebook/blenderbot_small-90M";

/// Connection settings for the inference API.
#[derive(Debug, Clone)]
pub struct HuggingFaceSettings {
    pub api_url: String,
    pub api_token: Option<String>,
    pub image_model: String,
    pub chat_model: String,
    pub timeout: Duration,
}

impl Default for HuggingFaceSettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Clone)]
pub struct HuggingFaceClient {
    client: reqwest::Client,
    settings: HuggingFaceSettings,
}

impl HuggingFaceClient {
    pub fn new(settings: HuggingFaceSettings) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(settings.timeout).build()?;
        info!(
            image_model = %settings.image_model,
            chat_model = %settings.chat_model,
            "Hugging Face client ready"
        );
        Ok(Self { client, settings })
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/{}", self.settings.api_url.trim_end_matches('/'), model)
    }

    fn request(&self, model: &str) -> reqwest::RequestBuilder {
        let req = self.client.post(self.model_url(model));
        match &self.settings.api_token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(&self, model: &str, req: reqwest::RequestBuilder) -> Result<Value> {
        let resp = req.send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(EcoError::Upstream {
                model: model.to_string(),
                message: format!("HTTP {status}: {body}"),
            }
            .into());
        }
        Ok(resp.json().await?)
    }

    /// Image-classification view of this client.
    pub fn image_classifier(&self) -> HuggingFaceImageModel {
        HuggingFaceImageModel(self.clone())
    }

    /// Text-generation view of this client.
    pub fn text_generator(&self) -> HuggingFaceChatModel {
        HuggingFaceChatModel(self.clone())
    }
}

pub struct HuggingFaceImageModel(HuggingFaceClient);

#[async_trait]
impl ImageClassifier for HuggingFaceImageModel {
    fn model_name(&self) -> &str {
        &self.0.settings.image_model
    }

    async fn classify_image(&self, image: &[u8]) -> Result<Vec<Prediction>> {
        let model = self.model_name();
        let req = self
            .0
            .request(model)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image.to_vec());
        let body = self.0.send(model, req).await?;
        parse_predictions(body)
    }
}

pub struct HuggingFaceChatModel(HuggingFaceClient);

#[async_trait]
impl TextGenerator for HuggingFaceChatModel {
    fn model_name(&self) -> &str {
        &self.0.settings.chat_model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let model = self.model_name();
        let req = self.0.request(model).json(&json!({
            "inputs": prompt,
            "parameters": {
                "max_length": 100,
                "num_beams": 2,
                "early_stopping": true
            }
        }));
        let body = self.0.send(model, req).await?;
        Ok(parse_generated_text(&body))
    }
}

/// Predictions sorted best first.
fn parse_predictions(body: Value) -> Result<Vec<Prediction>> {
    let mut predictions: Vec<Prediction> = serde_json::from_value(body)?;
    predictions.sort_by(|a, b| b.score.total_cmp(&a.score));
    Ok(predictions)
}

/// Accepts either `[{"generated_text": ..}]` or `{"generated_text": ..}`.
fn parse_generated_text(body: &Value) -> String {
    let entry = match body {
        Value::Array(items) => items.first(),
        other => Some(other),
    };
    entry
        .and_then(|e| e["generated_text"].as_str())
        .unwrap_or("")
        .trim()
        .to_string()
}
