//! Waste segregation checker strategies.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use ecoaware_core::{
    round_to, AnalysisMethod, ImageClassifier, ModelSegregation, SegregationChecker,
    SegregationReport, SegregationResult, WasteCategory,
};

use crate::rng::RngSource;

pub const REASON_HAZARDOUS: &str = "Hazardous waste detected";
pub const REASON_CORRECT: &str = "Proper segregation detected";
pub const REASON_MIXED: &str = "Mixed waste found";

/// Probability that an unrecognised filename is judged correctly segregated.
const DEFAULT_CORRECT_PROBABILITY: f64 = 0.8;

/// Judge segregation from the filename with an ordered rule cascade.
///
/// The first matching rule wins. Mixed/unsorted is checked before hazard
/// keywords, so `mixed_battery.jpg` is reported as plain mixed waste.
pub fn check_filename<R: Rng + ?Sized>(filename: &str, rng: &mut R) -> SegregationResult {
    let name = filename.to_lowercase();
    let has_any = |keys: &[&str]| keys.iter().any(|k| name.contains(k));

    let confidence = rng.gen_range(0.7..=0.95);
    let mut alert = false;

    let (is_correct, waste_types, recommendations) = if has_any(&["mixed", "unsorted"]) {
        (
            false,
            vec![WasteCategory::Plastic, WasteCategory::Organic, WasteCategory::Paper],
            vec!["Separate plastic", "Remove organic", "Sort paper"],
        )
    } else if has_any(&["hazard", "battery", "chemical"]) {
        alert = true;
        (
            false,
            vec![WasteCategory::Hazardous],
            vec!["Contact hazardous team", "Do not handle directly", "Use PPE"],
        )
    } else if has_any(&["plastic"]) {
        (true, vec![WasteCategory::Plastic], vec!["Good separation"])
    } else if has_any(&["organic", "food"]) {
        (true, vec![WasteCategory::Organic], vec!["Compostable"])
    } else {
        let category = *WasteCategory::SORTABLE
            .choose(rng)
            .unwrap_or(&WasteCategory::Plastic);
        (rng.gen_bool(DEFAULT_CORRECT_PROBABILITY), vec![category], vec![])
    };

    let reason = if alert {
        REASON_HAZARDOUS
    } else if is_correct {
        REASON_CORRECT
    } else {
        REASON_MIXED
    };

    SegregationResult {
        is_correct,
        confidence: round_to(confidence, 2),
        reason: reason.to_string(),
        waste_types,
        recommendations: recommendations.into_iter().map(String::from).collect(),
        alert,
        timestamp: Utc::now(),
        analysis_method: AnalysisMethod::Mock,
    }
}

/// Rule-based segregation checker keyed on filename substrings.
pub struct MockSegregationChecker {
    rng: RngSource,
}

impl MockSegregationChecker {
    pub fn new(rng: RngSource) -> Self {
        Self { rng }
    }
}

#[async_trait]
impl SegregationChecker for MockSegregationChecker {
    fn name(&self) -> &str {
        "mock"
    }

    async fn check(&self, filename: &str, _image: Option<&[u8]>) -> SegregationReport {
        let result = self.rng.with(|rng| check_filename(filename, rng));
        debug!(filename, correct = result.is_correct, alert = result.alert, "Mock segregation check complete");
        SegregationReport::Rule(result)
    }
}

/// Segregation checker reporting the raw top label of an image model.
///
/// Never fails: a missing model, empty output or model error yields a
/// sentinel report carrying a note.
pub struct ModelBackedSegregationChecker {
    model: Option<Arc<dyn ImageClassifier>>,
}

impl ModelBackedSegregationChecker {
    pub fn new(model: Option<Arc<dyn ImageClassifier>>) -> Self {
        Self { model }
    }

    fn report(
        filename: &str,
        category: &str,
        confidence: f64,
        method: AnalysisMethod,
        note: String,
    ) -> SegregationReport {
        SegregationReport::Model(ModelSegregation {
            filename: filename.to_string(),
            category: category.to_string(),
            confidence,
            analysis_method: method,
            note,
        })
    }
}

#[async_trait]
impl SegregationChecker for ModelBackedSegregationChecker {
    fn name(&self) -> &str {
        "model"
    }

    async fn check(&self, filename: &str, image: Option<&[u8]>) -> SegregationReport {
        let (Some(model), Some(image)) = (&self.model, image) else {
            return Self::report(
                filename,
                "unknown",
                0.0,
                AnalysisMethod::HuggingfaceFallback,
                "Image model not available, fallback triggered".into(),
            );
        };

        match model.classify_image(image).await {
            Ok(predictions) => match predictions.first() {
                Some(top) => Self::report(
                    filename,
                    &top.label,
                    top.score,
                    AnalysisMethod::HuggingfaceReal,
                    format!("Classified using {}", model.model_name()),
                ),
                None => Self::report(
                    filename,
                    "unknown",
                    0.0,
                    AnalysisMethod::HuggingfaceEmpty,
                    "No classification result returned".into(),
                ),
            },
            Err(e) => {
                warn!(filename, model = model.model_name(), error = %e, "Segregation classification failed");
                Self::report(
                    filename,
                    "error",
                    0.0,
                    AnalysisMethod::HuggingfaceError,
                    format!("Error: {e}"),
                )
            }
        }
    }
}
