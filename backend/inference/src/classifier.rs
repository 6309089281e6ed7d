//! Sustainability classifier strategies.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use ecoaware_core::{
    round_to, AnalysisMethod, AnalysisResult, Classifier, DisposalMethod, ImageClassifier,
    ReferenceTables, ALTERNATIVES_PER_RESULT,
};

use crate::rng::RngSource;

/// Simulate a sustainability analysis from nothing but the filename.
///
/// Every catalog material whose name occurs in the filename is detected, in
/// catalog order; the first one drives score, disposal and carbon estimate.
/// Filenames naming no material get one material picked uniformly at random
/// so the scoring path is always exercised.
pub fn analyze_filename<R: Rng + ?Sized>(
    tables: &ReferenceTables,
    filename: &str,
    rng: &mut R,
) -> AnalysisResult {
    let lowered = filename.to_lowercase();

    let mut detected = tables.materials.detect(&lowered);
    if detected.is_empty() {
        if let Some(entry) = tables.materials.entries().choose(rng) {
            detected.push(entry);
        }
    }
    let Some(primary) = detected.first().copied() else {
        return AnalysisResult::sentinel(AnalysisMethod::Mock, "material catalog is empty");
    };

    let score = (primary.base_score + rng.gen_range(-0.5..=0.5)).clamp(0.0, 10.0);
    let disposal = primary.disposal_or_default();
    let carbon_kg = tables.carbon_rates.rate_for(disposal) * rng.gen_range(0.5..=1.5);
    let alert = disposal == DisposalMethod::Hazardous || lowered.contains("hazard");

    let mut alt_products: Vec<_> = tables
        .alternatives
        .choose_multiple(rng, ALTERNATIVES_PER_RESULT)
        .cloned()
        .collect();
    alt_products.shuffle(rng);

    let confidence = rng.gen_range(0.7..=0.95);

    AnalysisResult {
        score: round_to(score, 1),
        disposal,
        carbon_kg: round_to(carbon_kg, 2),
        alt_products,
        detected_materials: detected.iter().map(|e| e.name.clone()).collect(),
        alert,
        confidence: round_to(confidence, 2),
        analysis_method: AnalysisMethod::Mock,
        timestamp: Utc::now(),
        note: None,
    }
}

/// Rule-based classifier keyed on filename substrings.
pub struct MockClassifier {
    tables: Arc<ReferenceTables>,
    rng: RngSource,
}

impl MockClassifier {
    pub fn new(tables: Arc<ReferenceTables>, rng: RngSource) -> Self {
        Self { tables, rng }
    }
}

#[async_trait]
impl Classifier for MockClassifier {
    fn name(&self) -> &str {
        "mock"
    }

    async fn classify(&self, filename: &str, _image: Option<&[u8]>) -> AnalysisResult {
        let result = self
            .rng
            .with(|rng| analyze_filename(&self.tables, filename, rng));
        debug!(
            filename,
            materials = ?result.detected_materials,
            disposal = %result.disposal,
            "Mock analysis complete"
        );
        result
    }
}

/// Classifier delegating to an external image-classification model.
///
/// A missing model, missing image, empty prediction list or model error all
/// degrade to a sentinel result with a diagnostic note.
pub struct ModelBackedClassifier {
    tables: Arc<ReferenceTables>,
    model: Option<Arc<dyn ImageClassifier>>,
}

impl ModelBackedClassifier {
    pub fn new(tables: Arc<ReferenceTables>, model: Option<Arc<dyn ImageClassifier>>) -> Self {
        Self { tables, model }
    }

    fn from_label(&self, label: &str, probability: f64) -> AnalysisResult {
        let disposal = self
            .tables
            .materials
            .detect(label)
            .first()
            .map(|e| e.disposal_or_default())
            .unwrap_or(DisposalMethod::Landfill);
        let probability = probability.clamp(0.0, 1.0);

        AnalysisResult {
            score: round_to(probability * 10.0, 1),
            disposal,
            carbon_kg: round_to(self.tables.carbon_rates.rate_for(disposal), 2),
            alt_products: self.tables.top_alternatives(ALTERNATIVES_PER_RESULT),
            detected_materials: vec![label.to_string()],
            alert: disposal == DisposalMethod::Hazardous,
            confidence: round_to(probability, 2),
            analysis_method: AnalysisMethod::RealHf,
            timestamp: Utc::now(),
            note: None,
        }
    }
}

#[async_trait]
impl Classifier for ModelBackedClassifier {
    fn name(&self) -> &str {
        "model"
    }

    async fn classify(&self, filename: &str, image: Option<&[u8]>) -> AnalysisResult {
        let Some(model) = &self.model else {
            return AnalysisResult::sentinel(
                AnalysisMethod::RealHfUnavailable,
                "Image model not available, fallback triggered",
            );
        };
        let Some(image) = image else {
            return AnalysisResult::sentinel(
                AnalysisMethod::RealHfUnavailable,
                "No image data supplied",
            );
        };

        match model.classify_image(image).await {
            Ok(predictions) => match predictions.first() {
                Some(top) => {
                    debug!(filename, label = %top.label, score = top.score, "Model analysis complete");
                    self.from_label(&top.label, top.score)
                }
                None => AnalysisResult::sentinel(
                    AnalysisMethod::RealHfEmpty,
                    "No classification result returned",
                ),
            },
            Err(e) => {
                warn!(filename, model = model.model_name(), error = %e, "Image classification failed");
                AnalysisResult::sentinel(AnalysisMethod::RealHfError, format!("Error: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    use anyhow::{bail, Result};
    use ecoaware_core::Prediction;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn tables() -> ReferenceTables {
        ReferenceTables::builtin()
    }

    #[test]
    fn test_named_material_drives_disposal() {
        let tables = tables();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..50 {
            let result = analyze_filename(&tables, "bamboo_bottle.jpg", &mut rng);
            assert_eq!(result.detected_materials, vec!["bamboo"]);
            assert_eq!(result.disposal, DisposalMethod::Compost);
            assert!((9.0..=10.0).contains(&result.score));
            assert!(!result.alert);
        }
    }

    #[test]
    fn test_ranges_hold_for_any_filename() {
        let tables = tables();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let names = ["random123.jpg", "PLASTIC PVC pipe.png", "x", "hazard.gif", "wood.jpg"];
        for _ in 0..200 {
            for name in names {
                let result = analyze_filename(&tables, name, &mut rng);
                assert!((0.0..=10.0).contains(&result.score));
                assert!(result.carbon_kg >= 0.0);
                assert!((0.7..=0.95).contains(&result.confidence));
                assert!(!result.detected_materials.is_empty());
                assert_eq!(result.analysis_method, AnalysisMethod::Mock);

                assert_eq!(result.alt_products.len(), 3);
                let ids: HashSet<u32> = result.alt_products.iter().map(|p| p.id).collect();
                assert_eq!(ids.len(), 3);
                assert!(ids.iter().all(|id| (1..=8).contains(id)));
            }
        }
    }

    #[test]
    fn test_carbon_scales_with_disposal_rate() {
        let tables = tables();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..100 {
            // plastic_pvc is hazardous: 5.0 kg base, noise in [0.5, 1.5]
            let result = analyze_filename(&tables, "plasticpvc_tube.jpg", &mut rng);
            assert_eq!(result.disposal, DisposalMethod::Hazardous);
            assert!(result.alert);
            assert!((2.5..=7.5).contains(&result.carbon_kg));
        }
    }

    #[test]
    fn test_hazard_keyword_raises_alert() {
        let tables = tables();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let result = analyze_filename(&tables, "glass_HAZARD.jpg", &mut rng);
        assert_eq!(result.disposal, DisposalMethod::Recycle);
        assert!(result.alert);
    }

    #[test]
    fn test_unmapped_material_uses_landfill() {
        let tables = tables();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let result = analyze_filename(&tables, "jute_sack.jpg", &mut rng);
        assert_eq!(result.detected_materials, vec!["jute"]);
        assert_eq!(result.disposal, DisposalMethod::Landfill);
    }

    #[test]
    fn test_multiple_materials_keep_catalog_order() {
        let tables = tables();
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        let result = analyze_filename(&tables, "paper_cup_with_glass_lid.jpg", &mut rng);
        assert_eq!(result.detected_materials, vec!["glass", "paper"]);
        assert_eq!(result.disposal, DisposalMethod::Recycle);
    }

    #[test]
    fn test_unlabelled_filename_picks_material_uniformly() {
        let tables = tables();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let trials = 16_000;
        let mut counts: HashMap<String, usize> = HashMap::new();
        for _ in 0..trials {
            let result = analyze_filename(&tables, "random123.jpg", &mut rng);
            assert_eq!(result.detected_materials.len(), 1);
            *counts.entry(result.detected_materials[0].clone()).or_default() += 1;
        }

        assert_eq!(counts.len(), tables.materials.len());
        let expected = trials / tables.materials.len();
        for (name, count) in counts {
            assert!(
                count > expected * 7 / 10 && count < expected * 13 / 10,
                "{name} picked {count} times, expected about {expected}"
            );
        }
    }

    #[test]
    fn test_seeded_source_reproduces_results() {
        let tables = tables();
        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);
        let ra = analyze_filename(&tables, "random123.jpg", &mut a);
        let rb = analyze_filename(&tables, "random123.jpg", &mut b);
        assert_eq!(ra.score, rb.score);
        assert_eq!(ra.detected_materials, rb.detected_materials);
        assert_eq!(ra.alt_products, rb.alt_products);
        assert_eq!(ra.confidence, rb.confidence);
    }

    struct StubModel {
        predictions: Option<Vec<Prediction>>,
    }

    #[async_trait]
    impl ImageClassifier for StubModel {
        fn model_name(&self) -> &str {
            "stub/model"
        }

        async fn classify_image(&self, _image: &[u8]) -> Result<Vec<Prediction>> {
            match &self.predictions {
                Some(p) => Ok(p.clone()),
                None => bail!("model exploded"),
            }
        }
    }

    fn model_backed(predictions: Option<Vec<Prediction>>) -> ModelBackedClassifier {
        ModelBackedClassifier::new(
            Arc::new(tables()),
            Some(Arc::new(StubModel { predictions })),
        )
    }

    #[tokio::test]
    async fn test_mock_strategy_through_trait() {
        let classifier: Box<dyn Classifier> = Box::new(MockClassifier::new(
            Arc::new(tables()),
            RngSource::seeded(11),
        ));
        let result = classifier.classify("aluminum_can.png", None).await;
        assert_eq!(classifier.name(), "mock");
        assert_eq!(result.detected_materials, vec!["aluminum"]);
        assert_eq!(result.disposal, DisposalMethod::Recycle);
    }

    #[tokio::test]
    async fn test_model_backed_maps_top_prediction() {
        let classifier = model_backed(Some(vec![
            Prediction { label: "glass bottle".into(), score: 0.8734 },
            Prediction { label: "cup".into(), score: 0.05 },
        ]));
        let result = classifier.classify("photo.jpg", Some(b"bytes")).await;
        assert_eq!(result.analysis_method, AnalysisMethod::RealHf);
        assert_eq!(result.detected_materials, vec!["glass bottle"]);
        assert_eq!(result.disposal, DisposalMethod::Recycle);
        assert_eq!(result.score, 8.7);
        assert_eq!(result.confidence, 0.87);
        assert_eq!(result.carbon_kg, 0.5);
        assert_eq!(result.alt_products.len(), 3);
    }

    #[tokio::test]
    async fn test_model_backed_unknown_label_goes_to_landfill() {
        let classifier = model_backed(Some(vec![Prediction { label: "tabby cat".into(), score: 0.4 }]));
        let result = classifier.classify("photo.jpg", Some(b"bytes")).await;
        assert_eq!(result.disposal, DisposalMethod::Landfill);
        assert_eq!(result.carbon_kg, 2.0);
        assert!(!result.alert);
    }

    #[tokio::test]
    async fn test_model_backed_degrades_to_sentinels() {
        let empty = model_backed(Some(vec![])).classify("a.jpg", Some(b"x")).await;
        assert_eq!(empty.analysis_method, AnalysisMethod::RealHfEmpty);
        assert_eq!(empty.detected_materials, vec!["unknown"]);

        let failed = model_backed(None).classify("a.jpg", Some(b"x")).await;
        assert_eq!(failed.analysis_method, AnalysisMethod::RealHfError);
        assert!(failed.note.unwrap().contains("model exploded"));

        let no_image = model_backed(Some(vec![])).classify("a.jpg", None).await;
        assert_eq!(no_image.analysis_method, AnalysisMethod::RealHfUnavailable);

        let unloaded = ModelBackedClassifier::new(Arc::new(tables()), None)
            .classify("a.jpg", Some(b"x"))
            .await;
        assert_eq!(unloaded.analysis_method, AnalysisMethod::RealHfUnavailable);
        assert_eq!(unloaded.confidence, 0.0);
    }
}
