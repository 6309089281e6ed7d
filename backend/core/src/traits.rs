use anyhow::Result;
use async_trait::async_trait;

use crate::types::{AnalysisResult, Prediction, SegregationReport};

/// Sustainability classifier strategy.
///
/// Mock and model-backed implementations satisfy the same contract, so
/// request handlers never need to know which one is active. Implementations
/// never fail: problems degrade to a sentinel result.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Strategy name used in logs.
    fn name(&self) -> &str;

    /// Analyse an uploaded product image identified by its filename.
    async fn classify(&self, filename: &str, image: Option<&[u8]>) -> AnalysisResult;
}

/// Waste segregation checker strategy.
#[async_trait]
pub trait SegregationChecker: Send + Sync {
    fn name(&self) -> &str;

    /// Judge whether the waste pictured in the upload is correctly separated.
    async fn check(&self, filename: &str, image: Option<&[u8]>) -> SegregationReport;
}

/// Eco-advice chat assistant.
#[async_trait]
pub trait Assistant: Send + Sync {
    fn name(&self) -> &str;

    /// Answer a user message in the requested language (`en`, `hi`, ...).
    async fn reply(&self, message: &str, language: &str) -> String;
}

/// External image-classification model. Returns predictions best first.
#[async_trait]
pub trait ImageClassifier: Send + Sync {
    fn model_name(&self) -> &str;

    async fn classify_image(&self, image: &[u8]) -> Result<Vec<Prediction>>;
}

/// External conversational text-generation model.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    fn model_name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String>;
}
